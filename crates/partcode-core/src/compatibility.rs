//! # Compatibility Validator
//!
//! Checks a resolved configuration against static compatibility tables.
//!
//! ```text
//! ┌──────────────────────────────────┬──────────────────────────────┐
//! │  check                           │  outcome                     │
//! ├──────────────────────────────────┼──────────────────────────────┤
//! │  model × material                │  error                       │
//! │  model × voltage                 │  error                       │
//! │  option × model                  │  error                       │
//! │  option × option (CP + bend)     │  error                       │
//! │  probe length outside 1"..120"   │  error                       │
//! │  material over its length ceiling│  warning                     │
//! └──────────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Models missing from the tables skip the per-model checks; the resolver
//! has already warned about them. Errors never stop pricing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{CompatibilityError, CompatibilityWarning};
use crate::types::QuoteOption;

// =============================================================================
// Rule Tables
// =============================================================================

/// An option restricted to certain models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionScope {
    pub option: String,
    pub models: Vec<String>,
}

/// Options that cannot be ordered together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusivePair {
    pub option: String,
    /// Excludes every bent probe option.
    #[serde(default)]
    pub excludes_bend: bool,
    #[serde(default)]
    pub excludes: Vec<String>,
}

/// Soft length limit for a probe material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthCeiling {
    pub material: String,
    pub max_length: f64,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityRules {
    /// Allowed materials per model.
    #[serde(default)]
    pub model_materials: BTreeMap<String, Vec<String>>,
    /// Allowed voltages per model.
    #[serde(default)]
    pub model_voltages: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub option_models: Vec<OptionScope>,
    #[serde(default)]
    pub exclusive_options: Vec<ExclusivePair>,
    #[serde(default)]
    pub length_ceilings: Vec<LengthCeiling>,
    #[serde(default = "default_min_probe_length")]
    pub min_probe_length: f64,
    #[serde(default = "default_max_probe_length")]
    pub max_probe_length: f64,
}

fn default_min_probe_length() -> f64 {
    1.0
}

fn default_max_probe_length() -> f64 {
    120.0
}

impl Default for CompatibilityRules {
    fn default() -> Self {
        Self {
            model_materials: BTreeMap::new(),
            model_voltages: BTreeMap::new(),
            option_models: Vec::new(),
            exclusive_options: Vec::new(),
            length_ceilings: Vec::new(),
            min_probe_length: default_min_probe_length(),
            max_probe_length: default_max_probe_length(),
        }
    }
}

// =============================================================================
// Validator
// =============================================================================

/// What the validator inspects.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityInput<'a> {
    pub model: &'a str,
    pub voltage: &'a str,
    pub material: &'a str,
    pub material_name: &'a str,
    pub probe_length: f64,
    pub options: &'a [QuoteOption],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompatibilityReport {
    pub errors: Vec<CompatibilityError>,
    pub warnings: Vec<CompatibilityWarning>,
}

impl CompatibilityReport {
    pub fn is_compatible(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct CompatibilityValidator<'a> {
    rules: &'a CompatibilityRules,
}

impl<'a> CompatibilityValidator<'a> {
    pub fn new(rules: &'a CompatibilityRules) -> Self {
        Self { rules }
    }

    pub fn validate(&self, input: CompatibilityInput<'_>) -> CompatibilityReport {
        let mut report = CompatibilityReport::default();

        self.check_model_tables(&input, &mut report);
        self.check_option_scope(&input, &mut report);
        self.check_exclusive_options(&input, &mut report);

        let (min, max) = (self.rules.min_probe_length, self.rules.max_probe_length);
        if input.probe_length < min || input.probe_length > max {
            report.errors.push(CompatibilityError::LengthOutOfRange {
                length: input.probe_length,
                min,
                max,
            });
        }

        for ceiling in self
            .rules
            .length_ceilings
            .iter()
            .filter(|c| c.material == input.material && input.probe_length > c.max_length)
        {
            report.warnings.push(CompatibilityWarning::LengthLimit {
                material_name: input.material_name.to_string(),
                length: input.probe_length,
                max: ceiling.max_length,
                suggestion: ceiling.suggestion.clone(),
            });
        }

        debug!(
            model = %input.model,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Validated compatibility"
        );
        report
    }

    fn check_model_tables(&self, input: &CompatibilityInput<'_>, report: &mut CompatibilityReport) {
        if let Some(allowed) = self.rules.model_materials.get(input.model) {
            if !allowed.iter().any(|m| m == input.material) {
                report.errors.push(CompatibilityError::MaterialNotAllowed {
                    model: input.model.to_string(),
                    material: input.material.to_string(),
                });
            }
        }

        if let Some(allowed) = self.rules.model_voltages.get(input.model) {
            if !allowed.iter().any(|v| v == input.voltage) {
                report.errors.push(CompatibilityError::VoltageNotAllowed {
                    model: input.model.to_string(),
                    voltage: input.voltage.to_string(),
                });
            }
        }
    }

    fn check_option_scope(&self, input: &CompatibilityInput<'_>, report: &mut CompatibilityReport) {
        if !self.is_known_model(input.model) {
            return;
        }

        for option in input.options {
            let restricted = self
                .rules
                .option_models
                .iter()
                .find(|scope| scope.option == option.code);
            if let Some(scope) = restricted {
                if !scope.models.iter().any(|m| m == input.model) {
                    report.errors.push(CompatibilityError::OptionNotAvailable {
                        model: input.model.to_string(),
                        option: option.code.clone(),
                    });
                }
            }
        }
    }

    fn check_exclusive_options(
        &self,
        input: &CompatibilityInput<'_>,
        report: &mut CompatibilityReport,
    ) {
        for pair in &self.rules.exclusive_options {
            if !input.options.iter().any(|o| o.code == pair.option) {
                continue;
            }
            for other in input.options.iter().filter(|o| o.code != pair.option) {
                let excluded = (pair.excludes_bend && other.is_bend())
                    || pair.excludes.iter().any(|code| *code == other.code);
                if excluded {
                    report.errors.push(CompatibilityError::OptionsExclusive {
                        first: pair.option.clone(),
                        second: other.code.clone(),
                    });
                }
            }
        }
    }

    fn is_known_model(&self, model: &str) -> bool {
        self.rules.model_materials.contains_key(model)
            || self.rules.model_voltages.contains_key(model)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    fn input<'a>(material: &'a str, length: f64, options: &'a [QuoteOption]) -> CompatibilityInput<'a> {
        CompatibilityInput {
            model: "LS2000",
            voltage: "115VAC",
            material,
            material_name: "Halar Coated",
            probe_length: length,
            options,
        }
    }

    #[test]
    fn test_clean_configuration() {
        let rules = builtin::compatibility_rules();
        let report = CompatibilityValidator::new(&rules).validate(input("S", 10.0, &[]));
        assert!(report.is_compatible());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_material_and_voltage_errors() {
        let rules = builtin::compatibility_rules();
        let mut check = input("CPVC", 10.0, &[]);
        check.voltage = "230VAC";
        let report = CompatibilityValidator::new(&rules).validate(check);

        assert_eq!(report.errors.len(), 2);
        assert_eq!(
            report.errors[0].to_string(),
            "Material CPVC is not compatible with model LS2000"
        );
        assert_eq!(
            report.errors[1].to_string(),
            "Voltage 230VAC is not available for model LS2000"
        );
    }

    #[test]
    fn test_option_scope() {
        let rules = builtin::compatibility_rules();
        let options = [QuoteOption::new("XSP", "Extra Static Protection")];
        let mut check = input("S", 10.0, &options);
        assert!(CompatibilityValidator::new(&rules).validate(check).is_compatible());

        check.model = "LS6000";
        let report = CompatibilityValidator::new(&rules).validate(check);
        assert_eq!(
            report.errors,
            vec![CompatibilityError::OptionNotAvailable {
                model: "LS6000".to_string(),
                option: "XSP".to_string(),
            }]
        );
    }

    #[test]
    fn test_cable_probe_excludes_bend() {
        let rules = builtin::compatibility_rules();
        let options = [QuoteOption::new("CP", "Cable Probe"), QuoteOption::bend(45)];
        let report = CompatibilityValidator::new(&rules).validate(input("S", 10.0, &options));

        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].to_string(),
            "Option CP cannot be combined with 45DEG"
        );
    }

    #[test]
    fn test_length_range() {
        let rules = builtin::compatibility_rules();
        let report = CompatibilityValidator::new(&rules).validate(input("S", 130.0, &[]));
        assert!(matches!(
            report.errors[0],
            CompatibilityError::LengthOutOfRange { .. }
        ));
    }

    #[test]
    fn test_halar_length_ceiling_is_a_warning() {
        let rules = builtin::compatibility_rules();
        let report = CompatibilityValidator::new(&rules).validate(input("H", 80.0, &[]));

        assert!(report.is_compatible());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].to_string().contains("Teflon Sleeve"));

        let report = CompatibilityValidator::new(&rules).validate(input("H", 72.0, &[]));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_unknown_model_skips_model_checks() {
        let rules = builtin::compatibility_rules();
        let options = [QuoteOption::new("XSP", "Extra Static Protection")];
        let mut check = input("ZZ", 10.0, &options);
        check.model = "LS";
        let report = CompatibilityValidator::new(&rules).validate(check);
        assert!(report.is_compatible());
    }

    #[test]
    fn test_rules_from_partial_json() {
        let rules: CompatibilityRules = serde_json::from_str(
            r#"{ "model_materials": { "LS2000": ["S"] } }"#,
        )
        .unwrap();
        assert_eq!(rules.max_probe_length, 120.0);
        let report = CompatibilityValidator::new(&rules).validate(input("H", 10.0, &[]));
        assert_eq!(report.errors.len(), 1);
    }
}
