//! # Parser Configuration
//!
//! Tunables and rule tables for [`QuoteParser`](crate::parser::QuoteParser).
//!
//! Every field has a serde default, so a settings file only lists what it
//! changes:
//!
//! ```toml
//! default_probe_length = 12.0
//!
//! [pricing]
//! bend_price = 6000
//!
//! [[rules]]
//! name = "ceramic-peek"
//! trigger = { material = "C" }
//! effects = [ { set_insulator = "PEEK" } ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::builtin;
use crate::compatibility::CompatibilityRules;
use crate::modifiers::HousingToken;
use crate::pricing::PricingConfig;
use crate::rules::MaterialRule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Probe length used when the length field does not parse, inches.
    #[serde(default = "default_probe_length")]
    pub default_probe_length: f64,

    /// Max temperature when the insulator carries no rating, °F.
    #[serde(default = "default_max_temperature")]
    pub default_max_temperature: u32,

    /// Literal modifiers that override the housing.
    #[serde(default = "default_housing_tokens")]
    pub housing_tokens: Vec<HousingToken>,

    /// Cross-field material rules, applied in order.
    #[serde(default = "builtin::material_rules")]
    pub rules: Vec<MaterialRule>,

    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default = "builtin::compatibility_rules")]
    pub compatibility: CompatibilityRules,

    /// Max pressure (PSI) by connection override size.
    #[serde(default = "default_pressure_by_connection_size")]
    pub pressure_by_connection_size: BTreeMap<String, u32>,

    /// Probe diameter shown when the diameter option is present.
    #[serde(default = "default_wide_probe_diameter")]
    pub wide_probe_diameter: String,
}

fn default_probe_length() -> f64 {
    10.0
}

fn default_max_temperature() -> u32 {
    180
}

fn default_housing_tokens() -> Vec<HousingToken> {
    vec![HousingToken::stainless()]
}

fn default_pressure_by_connection_size() -> BTreeMap<String, u32> {
    [("3/4\"", 300), ("1\"", 300), ("2\"", 150)]
        .into_iter()
        .map(|(size, psi)| (size.to_string(), psi))
        .collect()
}

fn default_wide_probe_diameter() -> String {
    "¾\"".to_string()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_probe_length: default_probe_length(),
            default_max_temperature: default_max_temperature(),
            housing_tokens: default_housing_tokens(),
            rules: builtin::material_rules(),
            pricing: PricingConfig::default(),
            compatibility: builtin::compatibility_rules(),
            pressure_by_connection_size: default_pressure_by_connection_size(),
            wide_probe_diameter: default_wide_probe_diameter(),
        }
    }
}

impl ParserConfig {
    /// Checks values a settings file could get wrong.
    ///
    /// Returns one message per problem; empty when the config is usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !(self.default_probe_length.is_finite() && self.default_probe_length > 0.0) {
            problems.push(format!(
                "default_probe_length must be positive, got {}",
                self.default_probe_length
            ));
        }
        if self.pricing.bend_price.is_negative() {
            problems.push("pricing.bend_price must not be negative".to_string());
        }
        if self.pricing.diameter_base_fee.is_negative()
            || self.pricing.diameter_adder_per_foot.is_negative()
        {
            problems.push("pricing diameter fees must not be negative".to_string());
        }
        if !self.pricing.nonstandard_length_threshold.is_finite() {
            problems.push("pricing.nonstandard_length_threshold must be finite".to_string());
        }

        let c = &self.compatibility;
        if c.min_probe_length > c.max_probe_length {
            problems.push(format!(
                "compatibility.min_probe_length ({}) exceeds max_probe_length ({})",
                c.min_probe_length, c.max_probe_length
            ));
        }

        for token in &self.housing_tokens {
            if token.token.is_empty() || token.option_code.is_empty() {
                problems.push("housing tokens need a token and an option code".to_string());
            }
        }

        for rule in &self.rules {
            if rule.effects.is_empty() {
                problems.push(format!("rule '{}' has no effects", rule.name));
            }
        }

        problems
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.default_probe_length, 10.0);
        assert_eq!(config.default_max_temperature, 180);
        assert_eq!(config.pressure_by_connection_size.get("2\""), Some(&150));
        assert_eq!(config.pricing.bend_price, Money::from_dollars(50));
        assert_eq!(config.rules.len(), 1);
        assert!(config.problems().is_empty());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ParserConfig = serde_json::from_str(
            r#"{ "default_probe_length": 12.0, "pricing": { "bend_price": 6000 } }"#,
        )
        .unwrap();

        assert_eq!(config.default_probe_length, 12.0);
        assert_eq!(config.pricing.bend_price, Money::from_dollars(60));
        assert_eq!(config.pricing.diameter_base_fee, Money::from_dollars(175));
        assert_eq!(config.housing_tokens, vec![HousingToken::stainless()]);
        assert_eq!(config.compatibility, builtin::compatibility_rules());
    }

    #[test]
    fn test_problems_reported() {
        let mut config = ParserConfig::default();
        config.default_probe_length = 0.0;
        config.pricing.bend_price = Money::from_cents(-1);
        config.compatibility.min_probe_length = 200.0;

        let problems = config.problems();
        assert_eq!(problems.len(), 3);
        assert!(problems[0].contains("default_probe_length"));
    }
}
