//! # Catalog
//!
//! Read-only reference data consumed by the pipeline.
//!
//! ## Providers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         trait Catalog                                   │
//! │                                                                         │
//! │   CatalogSnapshot          in-memory tables (serde, file-loadable)      │
//! │   builtin::catalog()       compiled-in snapshot                         │
//! │   LayeredCatalog<P, F>     primary first, fallback second               │
//! │                                                                         │
//! │   QuoteParser<C: Catalog>  receives one of these at construction        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookups take canonical, upper-case codes. Alias resolution is the
//! resolver's job; the catalog only answers `alias(section, text)`.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{ConnectionKind, DefaultConnection, Section};

// =============================================================================
// Records
// =============================================================================

/// Voltage surcharge for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageAdder {
    pub voltage: String,
    pub adder: Money,
}

/// Per-model defaults and base pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefaults {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    pub base_price: Money,
    /// Probe length included in the base price, inches.
    pub base_length: f64,
    #[serde(default)]
    pub connection: Option<DefaultConnection>,
    #[serde(default)]
    pub insulator: Option<String>,
    #[serde(default)]
    pub housing: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub probe_diameter: Option<String>,
    #[serde(default)]
    pub max_pressure: Option<u32>,
    #[serde(default)]
    pub max_temperature: Option<u32>,
    #[serde(default)]
    pub voltage_adders: Vec<VoltageAdder>,
}

impl ModelDefaults {
    pub fn voltage_adder(&self, voltage: &str) -> Money {
        self.voltage_adders
            .iter()
            .find(|v| v.voltage == voltage)
            .map(|v| v.adder)
            .unwrap_or_default()
    }
}

/// A supply voltage code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageInfo {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// How a material prices probe length beyond the base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LengthPricing {
    /// Length is included in the base price.
    #[default]
    None,
    /// Stepped foot adders from the model's base length.
    PerFoot { rate: Money },
    /// Continuous per-inch rate past the material's own base length.
    PerInch { rate: Money, base_length: f64 },
}

/// Probe material pricing curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialInfo {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub base_price_adder: Money,
    #[serde(default)]
    pub length_pricing: LengthPricing,
    #[serde(default)]
    pub nonstandard_length_surcharge: Money,
    /// Lengths sold without the surcharge. When empty the surcharge applies
    /// only past the configured nonstandard threshold.
    #[serde(default)]
    pub standard_lengths: Vec<f64>,
}

impl MaterialInfo {
    /// Whether a pricing length draws the nonstandard length surcharge.
    pub fn is_nonstandard_length(&self, length: f64, threshold: f64) -> bool {
        if self.standard_lengths.is_empty() {
            length > threshold
        } else {
            !self.standard_lengths.contains(&length)
        }
    }
}

/// One step of a tiered option price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Pricing length (inches) from which this tier applies.
    pub min_length: f64,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionPricing {
    Fixed { price: Money },
    Tiered { tiers: Vec<PriceTier> },
}

impl OptionPricing {
    /// Price for a pricing length: the fixed price, or the highest tier
    /// whose `min_length` the length reaches (zero below the first tier).
    pub fn price_for(&self, length: f64) -> Money {
        match self {
            OptionPricing::Fixed { price } => *price,
            OptionPricing::Tiered { tiers } => tiers
                .iter()
                .filter(|t| length >= t.min_length)
                .max_by(|a, b| a.min_length.total_cmp(&b.min_length))
                .map(|t| t.price)
                .unwrap_or_default(),
        }
    }
}

/// An orderable option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionInfo {
    pub code: String,
    pub name: String,
    pub pricing: OptionPricing,
}

/// Insulator length adder schedule.
///
/// ```text
/// length ≤ 4"        $0
/// (4", 7")           $150
/// [7", 9")           $200
/// ...                +$50 per 2" bracket
/// capped at          $500
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketSchedule {
    #[serde(default = "default_free_up_to")]
    pub free_up_to: f64,
    #[serde(default = "default_bracket_width")]
    pub width: f64,
    #[serde(default = "default_first_adder")]
    pub first_adder: Money,
    #[serde(default = "default_bracket_step")]
    pub step: Money,
    #[serde(default = "default_bracket_cap")]
    pub cap: Money,
}

fn default_free_up_to() -> f64 {
    4.0
}

fn default_bracket_width() -> f64 {
    2.0
}

fn default_first_adder() -> Money {
    Money::from_dollars(150)
}

fn default_bracket_step() -> Money {
    Money::from_dollars(50)
}

fn default_bracket_cap() -> Money {
    Money::from_dollars(500)
}

impl Default for BracketSchedule {
    fn default() -> Self {
        Self {
            free_up_to: default_free_up_to(),
            width: default_bracket_width(),
            first_adder: default_first_adder(),
            step: default_bracket_step(),
            cap: default_bracket_cap(),
        }
    }
}

impl BracketSchedule {
    /// 1-based bracket index for a length, 0 when within the free length.
    pub fn bracket(&self, length: f64) -> u32 {
        if length <= self.free_up_to || self.width <= 0.0 {
            return 0;
        }
        // Brackets start one inch past the free length; truncation keeps
        // (free, free + 1) in the first bracket.
        let offset = (length - (self.free_up_to + 1.0)) / self.width;
        (offset.trunc().max(0.0) as u32).saturating_add(1)
    }

    pub fn adder_for(&self, length: f64) -> Money {
        match self.bracket(length) {
            0 => Money::zero(),
            n => {
                let stepped = self
                    .step
                    .checked_mul(i64::from(n - 1))
                    .and_then(|s| s.checked_add(self.first_adder))
                    .unwrap_or(self.cap);
                stepped.min(self.cap)
            }
        }
    }
}

/// Insulator material pricing and rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsulatorInfo {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub price_adder: Money,
    #[serde(default)]
    pub max_temperature: Option<u32>,
    #[serde(default)]
    pub brackets: BracketSchedule,
}

/// A priced process connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub kind: ConnectionKind,
    pub size: String,
    pub material: String,
    #[serde(default)]
    pub rating: Option<String>,
    pub price: Money,
}

impl ConnectionInfo {
    /// Quote display, e.g. `2" 150# RF Flange (316SS)`.
    pub fn display(&self) -> String {
        format_connection(self.kind, &self.size, self.rating.as_deref(), &self.material)
    }
}

/// Quote display for a connection, priced or not.
pub fn format_connection(
    kind: ConnectionKind,
    size: &str,
    rating: Option<&str>,
    material: &str,
) -> String {
    match kind {
        ConnectionKind::Threaded => format!("{size}NPT ({material})"),
        ConnectionKind::Flanged => match rating {
            Some(r) => format!("{size} {r} RF Flange ({material})"),
            None => format!("{size} RF Flange ({material})"),
        },
        ConnectionKind::TriClamp => format!("{size} Tri-Clamp ({material})"),
        ConnectionKind::Unknown => format!("{size} ({material})"),
    }
}

/// Shorthand for a canonical code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub section: Section,
    pub alias: String,
    pub code: String,
}

// =============================================================================
// Catalog Trait
// =============================================================================

/// Read-only catalog lookups.
///
/// Implementations must be pure: the same query always yields the same
/// answer for the lifetime of the value.
pub trait Catalog {
    fn model_defaults(&self, code: &str) -> Option<&ModelDefaults>;

    fn material_info(&self, code: &str) -> Option<&MaterialInfo>;

    fn option_info(&self, code: &str) -> Option<&OptionInfo>;

    fn insulator_info(&self, code: &str) -> Option<&InsulatorInfo>;

    fn connection_info(
        &self,
        kind: ConnectionKind,
        size: &str,
        material: &str,
        rating: Option<&str>,
    ) -> Option<&ConnectionInfo>;

    /// Canonical code for an alias within a section.
    fn alias(&self, section: Section, alias: &str) -> Option<&str>;

    /// Canonical codes of a section, in catalog order.
    fn codes(&self, section: Section) -> Vec<&str>;

    fn connection_cost(
        &self,
        kind: ConnectionKind,
        size: &str,
        material: &str,
        rating: Option<&str>,
    ) -> Option<Money> {
        self.connection_info(kind, size, material, rating)
            .map(|c| c.price)
    }

    fn contains(&self, section: Section, code: &str) -> bool {
        self.codes(section).contains(&code)
    }
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn model_defaults(&self, code: &str) -> Option<&ModelDefaults> {
        (**self).model_defaults(code)
    }

    fn material_info(&self, code: &str) -> Option<&MaterialInfo> {
        (**self).material_info(code)
    }

    fn option_info(&self, code: &str) -> Option<&OptionInfo> {
        (**self).option_info(code)
    }

    fn insulator_info(&self, code: &str) -> Option<&InsulatorInfo> {
        (**self).insulator_info(code)
    }

    fn connection_info(
        &self,
        kind: ConnectionKind,
        size: &str,
        material: &str,
        rating: Option<&str>,
    ) -> Option<&ConnectionInfo> {
        (**self).connection_info(kind, size, material, rating)
    }

    fn alias(&self, section: Section, alias: &str) -> Option<&str> {
        (**self).alias(section, alias)
    }

    fn codes(&self, section: Section) -> Vec<&str> {
        (**self).codes(section)
    }
}

// =============================================================================
// Catalog Snapshot
// =============================================================================

/// In-memory catalog tables.
///
/// This is the shape of a catalog file. Every table is optional so a file
/// can carry only the entries it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub models: Vec<ModelDefaults>,
    #[serde(default)]
    pub voltages: Vec<VoltageInfo>,
    #[serde(default)]
    pub materials: Vec<MaterialInfo>,
    #[serde(default)]
    pub options: Vec<OptionInfo>,
    #[serde(default)]
    pub insulators: Vec<InsulatorInfo>,
    #[serde(default)]
    pub connections: Vec<ConnectionInfo>,
    #[serde(default)]
    pub aliases: Vec<AliasEntry>,
}

impl CatalogSnapshot {
    /// Parses a snapshot from JSON text.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// True when no table has any entry.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
            && self.voltages.is_empty()
            && self.materials.is_empty()
            && self.options.is_empty()
            && self.insulators.is_empty()
            && self.connections.is_empty()
            && self.aliases.is_empty()
    }
}

impl Catalog for CatalogSnapshot {
    fn model_defaults(&self, code: &str) -> Option<&ModelDefaults> {
        self.models.iter().find(|m| m.code == code)
    }

    fn material_info(&self, code: &str) -> Option<&MaterialInfo> {
        self.materials.iter().find(|m| m.code == code)
    }

    fn option_info(&self, code: &str) -> Option<&OptionInfo> {
        self.options.iter().find(|o| o.code == code)
    }

    fn insulator_info(&self, code: &str) -> Option<&InsulatorInfo> {
        self.insulators.iter().find(|i| i.code == code)
    }

    fn connection_info(
        &self,
        kind: ConnectionKind,
        size: &str,
        material: &str,
        rating: Option<&str>,
    ) -> Option<&ConnectionInfo> {
        self.connections.iter().find(|c| {
            c.kind == kind
                && c.size == size
                && c.material == material
                && c.rating.as_deref() == rating
        })
    }

    fn alias(&self, section: Section, alias: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|a| a.section == section && a.alias == alias)
            .map(|a| a.code.as_str())
    }

    fn codes(&self, section: Section) -> Vec<&str> {
        match section {
            Section::Model => self.models.iter().map(|m| m.code.as_str()).collect(),
            Section::Voltage => self.voltages.iter().map(|v| v.code.as_str()).collect(),
            Section::Material => self.materials.iter().map(|m| m.code.as_str()).collect(),
            Section::Option => self.options.iter().map(|o| o.code.as_str()).collect(),
        }
    }
}

// =============================================================================
// Layered Catalog
// =============================================================================

/// Two-tier provider: every lookup asks `primary` first, then `fallback`.
///
/// ## Usage
/// ```rust
/// use partcode_core::builtin;
/// use partcode_core::catalog::{Catalog, CatalogSnapshot, LayeredCatalog};
///
/// let catalog = LayeredCatalog::new(CatalogSnapshot::default(), builtin::catalog());
/// assert!(catalog.model_defaults("LS2000").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct LayeredCatalog<P, F> {
    primary: P,
    fallback: F,
}

impl<P: Catalog, F: Catalog> LayeredCatalog<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P: Catalog, F: Catalog> Catalog for LayeredCatalog<P, F> {
    fn model_defaults(&self, code: &str) -> Option<&ModelDefaults> {
        self.primary
            .model_defaults(code)
            .or_else(|| self.fallback.model_defaults(code))
    }

    fn material_info(&self, code: &str) -> Option<&MaterialInfo> {
        self.primary
            .material_info(code)
            .or_else(|| self.fallback.material_info(code))
    }

    fn option_info(&self, code: &str) -> Option<&OptionInfo> {
        self.primary
            .option_info(code)
            .or_else(|| self.fallback.option_info(code))
    }

    fn insulator_info(&self, code: &str) -> Option<&InsulatorInfo> {
        self.primary
            .insulator_info(code)
            .or_else(|| self.fallback.insulator_info(code))
    }

    fn connection_info(
        &self,
        kind: ConnectionKind,
        size: &str,
        material: &str,
        rating: Option<&str>,
    ) -> Option<&ConnectionInfo> {
        self.primary
            .connection_info(kind, size, material, rating)
            .or_else(|| self.fallback.connection_info(kind, size, material, rating))
    }

    fn alias(&self, section: Section, alias: &str) -> Option<&str> {
        self.primary
            .alias(section, alias)
            .or_else(|| self.fallback.alias(section, alias))
    }

    fn codes(&self, section: Section) -> Vec<&str> {
        let mut codes = self.primary.codes(section);
        for code in self.fallback.codes(section) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        codes
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn one_model(code: &str, price: i64) -> CatalogSnapshot {
        CatalogSnapshot {
            models: vec![ModelDefaults {
                code: code.to_string(),
                name: None,
                base_price: Money::from_dollars(price),
                base_length: 10.0,
                connection: None,
                insulator: None,
                housing: None,
                output: None,
                probe_diameter: None,
                max_pressure: None,
                max_temperature: None,
                voltage_adders: vec![],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_bracket_schedule() {
        let schedule = BracketSchedule::default();
        assert_eq!(schedule.adder_for(4.0), Money::zero());
        assert_eq!(schedule.adder_for(4.5), Money::from_dollars(150));
        assert_eq!(schedule.adder_for(5.0), Money::from_dollars(150));
        assert_eq!(schedule.adder_for(6.0), Money::from_dollars(150));
        assert_eq!(schedule.adder_for(7.0), Money::from_dollars(200));
        assert_eq!(schedule.adder_for(8.0), Money::from_dollars(200));
        assert_eq!(schedule.adder_for(10.0), Money::from_dollars(250));
        assert_eq!(schedule.adder_for(20.0), Money::from_dollars(500));
        assert_eq!(schedule.adder_for(40.0), Money::from_dollars(500));
    }

    #[test]
    fn test_bracket_schedule_steps_at_boundaries() {
        let schedule = BracketSchedule::default();
        let adder = |length: f64| schedule.adder_for(length);

        // Flat inside (4, 7) and [7, 9)
        for length in [4.1, 5.0, 6.0, 6.9] {
            assert_eq!(adder(length), adder(4.1), "{length}");
        }
        for length in [7.0, 7.5, 8.0, 8.9] {
            assert_eq!(adder(length), adder(7.0), "{length}");
        }

        // Strictly up at each boundary below the cap
        assert!(adder(4.1) > adder(4.0));
        assert!(adder(7.0) > adder(6.9));
        assert!(adder(9.0) > adder(8.9));
        for boundary in [11.0, 13.0, 15.0] {
            assert!(adder(boundary) > adder(boundary - 0.1), "{boundary}");
        }

        let mut previous = Money::zero();
        for tenth in 0..400 {
            let current = adder(f64::from(tenth) / 10.0);
            assert!(current >= previous);
            assert!(current <= schedule.cap);
            previous = current;
        }
        assert_eq!(adder(1e20), schedule.cap);
    }

    #[test]
    fn test_tiered_price() {
        let pricing = OptionPricing::Tiered {
            tiers: vec![
                PriceTier {
                    min_length: 0.0,
                    price: Money::from_dollars(100),
                },
                PriceTier {
                    min_length: 48.0,
                    price: Money::from_dollars(180),
                },
            ],
        };
        assert_eq!(pricing.price_for(10.0), Money::from_dollars(100));
        assert_eq!(pricing.price_for(48.0), Money::from_dollars(180));
        assert_eq!(pricing.price_for(100.0), Money::from_dollars(180));
    }

    #[test]
    fn test_layered_lookup_prefers_primary() {
        let catalog = LayeredCatalog::new(one_model("LS2000", 500), one_model("LS2000", 455));
        let model = catalog.model_defaults("LS2000").unwrap();
        assert_eq!(model.base_price, Money::from_dollars(500));
    }

    #[test]
    fn test_layered_codes_are_deduplicated() {
        let catalog = LayeredCatalog::new(one_model("LS9999", 1), one_model("LS2000", 455));
        let mut both = one_model("LS2000", 1);
        both.models.extend(one_model("LS9999", 1).models);
        let catalog2 = LayeredCatalog::new(both, one_model("LS2000", 455));

        assert_eq!(catalog.codes(Section::Model), vec!["LS9999", "LS2000"]);
        assert_eq!(catalog2.codes(Section::Model), vec!["LS2000", "LS9999"]);
    }

    #[test]
    fn test_connection_display() {
        let conn = ConnectionInfo {
            kind: ConnectionKind::Flanged,
            size: "2\"".to_string(),
            material: "316SS".to_string(),
            rating: Some("150#".to_string()),
            price: Money::from_dollars(250),
        };
        assert_eq!(conn.display(), "2\" 150# RF Flange (316SS)");
        assert_eq!(
            format_connection(ConnectionKind::Threaded, "1\"", None, "316SS"),
            "1\"NPT (316SS)"
        );
        assert_eq!(
            format_connection(ConnectionKind::TriClamp, "2\"", None, "316SS"),
            "2\" Tri-Clamp (316SS)"
        );
    }

    #[test]
    fn test_snapshot_from_json() {
        let snapshot = CatalogSnapshot::from_json_str(
            r#"{
                "materials": [
                    { "code": "S", "name": "316 Stainless Steel",
                      "length_pricing": { "kind": "per_foot", "rate": 4500 } }
                ],
                "aliases": [ { "section": "material", "alias": "SS", "code": "S" } ]
            }"#,
        )
        .unwrap();

        let material = snapshot.material_info("S").unwrap();
        assert_eq!(
            material.length_pricing,
            LengthPricing::PerFoot {
                rate: Money::from_dollars(45)
            }
        );
        assert_eq!(snapshot.alias(Section::Material, "SS"), Some("S"));
        assert!(!snapshot.is_empty());
    }
}
