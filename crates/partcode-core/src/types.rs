//! # Domain Types
//!
//! Types produced by the part-code pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ParsedConfiguration                                │
//! │                                                                         │
//! │  raw_code ── fields[4] ── model / voltage / material / probe_length     │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  QuoteOption[]  │   │  InsulatorSpec? │   │ConnectionOverride?      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code, name     │   │  length         │   │  kind, size     │       │
//! │  │  parameter      │   │  material       │   │  rating         │       │
//! │  │  price, kind    │   │  length_only    │   │  display        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ MergedDefaults  │   │  ComputedSpecs  │   │ PriceBreakdown  │       │
//! │  │  connection     │   │  max temp/psi   │   │  six components │       │
//! │  │  housing/output │   │  diameter       │   │  total + lines  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  warnings[]  errors[]                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every output type derives `Serialize` and `TS` so the quote renderer can
//! consume the same shapes without hand-maintained copies.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Sections & Fields
// =============================================================================

/// A namespace of canonical codes and aliases in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Section {
    Model,
    Voltage,
    Material,
    Option,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Model => "model",
            Section::Voltage => "voltage",
            Section::Material => "material",
            Section::Option => "option",
        };
        f.write_str(name)
    }
}

/// Position of a field within the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FieldKind {
    Model,
    Voltage,
    Material,
    Length,
    Modifier,
}

/// How a positional field reached its canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Resolution {
    Exact,
    Alias,
    Prefix,
    Unresolved,
}

/// One hyphen-delimited field of the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Field {
    pub kind: FieldKind,
    /// Text as it appeared after trimming and upper-casing.
    pub raw: String,
    /// Canonical value, `None` when the field did not resolve.
    pub canonical: Option<String>,
    pub resolution: Resolution,
}

// =============================================================================
// Options
// =============================================================================

/// How an option's price was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PriceKind {
    Fixed,
    Tiered,
    SteppedFoot,
}

/// A modifier that resolved to an orderable option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteOption {
    /// Canonical code, e.g. `XSP` or `90DEG`.
    pub code: String,
    pub name: String,
    /// Bend angle in degrees for bent-probe options.
    pub parameter: Option<u32>,
    /// The alias text the option was written as, if not the canonical code.
    pub alias_of: Option<String>,

    // Filled by the PricingEngine
    pub price: Money,
    pub price_kind: Option<PriceKind>,
    pub base_cost: Option<Money>,
    pub per_foot_cost: Option<Money>,
    pub foot_adders: Option<u32>,
}

impl QuoteOption {
    /// Creates an unpriced option.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            parameter: None,
            alias_of: None,
            price: Money::zero(),
            price_kind: None,
            base_cost: None,
            per_foot_cost: None,
            foot_adders: None,
        }
    }

    /// Bent probe option for a validated angle.
    pub fn bend(degrees: u32) -> Self {
        Self {
            parameter: Some(degrees),
            ..Self::new(format!("{degrees}DEG"), format!("Bent Probe ({degrees}°)"))
        }
    }

    pub fn is_bend(&self) -> bool {
        self.parameter.is_some() && self.code.ends_with("DEG")
    }
}

// =============================================================================
// Insulator
// =============================================================================

/// An explicit insulator request such as `8"TEFINS` or `6"INS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InsulatorSpec {
    /// Requested insulator length in inches.
    pub length: f64,
    /// Insulator material code; `None` until the default merge for `6"INS`.
    pub material: Option<String>,
    pub material_name: Option<String>,
    /// Base insulator length for the probe length bracket.
    pub base_length: f64,
    /// Material was omitted and comes from the model default.
    pub length_only: bool,
}

// =============================================================================
// Connections
// =============================================================================

/// Process connection family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ConnectionKind {
    Threaded,
    Flanged,
    TriClamp,
    Unknown,
}

impl ConnectionKind {
    /// Marker used in the code form (`NPT`, `RF`, `TC`).
    pub fn marker(&self) -> &'static str {
        match self {
            ConnectionKind::Threaded => "NPT",
            ConnectionKind::Flanged => "RF",
            ConnectionKind::TriClamp => "TC",
            ConnectionKind::Unknown => "",
        }
    }
}

/// A connection override token such as `1"NPT`, `2"150#RF` or `2"TC`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConnectionOverride {
    pub kind: ConnectionKind,
    /// Size including the inch mark, e.g. `3/4"`.
    pub size: String,
    /// Pressure rating including the `#`, flanges only.
    pub rating: Option<String>,
    /// Code form, or the raw token for `Unknown`.
    pub display: String,
}

/// A model's default process connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DefaultConnection {
    pub kind: ConnectionKind,
    pub size: String,
    pub material: String,
}

/// Model defaults carried onto the configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MergedDefaults {
    pub connection: Option<DefaultConnection>,
    /// Default insulator code after material rules ran.
    pub insulator: Option<String>,
    pub housing: Option<String>,
    pub output: Option<String>,
}

// =============================================================================
// Computed Specs
// =============================================================================

/// Derived specification values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComputedSpecs {
    /// Degrees Fahrenheit.
    pub max_temperature: u32,
    /// PSI, `None` when the model is unknown and no override sets it.
    pub max_pressure: Option<u32>,
    pub base_insulator_length: f64,
    pub probe_diameter: Option<String>,
    /// Effective insulator material (explicit or default).
    pub insulator_material: Option<String>,
    pub insulator_material_name: Option<String>,
    pub insulator_length: f64,
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Per-option pricing detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OptionCharge {
    pub code: String,
    pub amount: Money,
    pub kind: PriceKind,
}

/// Itemized price.
///
/// `total_price` always equals the sum of the six components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceBreakdown {
    pub base_price: Money,
    pub length_price: Money,
    pub length_surcharge: Money,
    pub option_price: Money,
    pub option_details: Vec<OptionCharge>,
    pub insulator_price: Money,
    pub connection_price: Money,
    pub total_price: Money,
    pub line_items: Vec<String>,
    pub notes: Vec<String>,
    pub original_length: f64,
    /// Probe length rounded up to a whole inch.
    pub pricing_length: f64,
}

impl PriceBreakdown {
    /// Sum of the six components.
    pub fn component_sum(&self) -> Money {
        [
            self.base_price,
            self.length_price,
            self.length_surcharge,
            self.option_price,
            self.insulator_price,
            self.connection_price,
        ]
        .into_iter()
        .sum()
    }

    /// Line items followed by notes, one per line.
    pub fn summary(&self) -> String {
        let mut lines = self.line_items.clone();
        if !self.notes.is_empty() {
            lines.push(String::new());
            lines.extend(self.notes.iter().map(|n| format!("Note: {n}")));
        }
        lines.join("\n")
    }
}

// =============================================================================
// Parsed Configuration
// =============================================================================

/// The aggregate result of parsing one code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParsedConfiguration {
    /// Input exactly as supplied.
    pub raw_code: String,
    /// The four positional fields.
    pub fields: Vec<Field>,
    pub model: String,
    pub voltage: String,
    pub material: String,
    pub material_name: String,
    pub probe_length: f64,
    pub options: Vec<QuoteOption>,
    pub insulator: Option<InsulatorSpec>,
    pub connection: Option<ConnectionOverride>,
    pub defaults: MergedDefaults,
    pub specs: ComputedSpecs,
    pub pricing: PriceBreakdown,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ParsedConfiguration {
    /// True when compatibility checks found no blocking error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_option(&self, code: &str) -> bool {
        self.options.iter().any(|o| o.code == code)
    }

    /// Canonical code reconstructed from the parsed components.
    ///
    /// Re-parsing the result yields the same canonical fields.
    ///
    /// ## Example
    /// ```text
    /// "ls2-115-s-10.0\"-xsp"  ──►  "LS2000-115VAC-S-10\"-XSP"
    /// ```
    pub fn expanded_code(&self) -> String {
        let mut parts = vec![
            self.model.clone(),
            self.voltage.clone(),
            self.material.clone(),
            format!("{}\"", format_inches(self.probe_length)),
        ];

        parts.extend(self.options.iter().map(|o| o.code.clone()));

        if let Some(ins) = &self.insulator {
            let material = if ins.length_only {
                ""
            } else {
                ins.material.as_deref().unwrap_or("")
            };
            parts.push(format!("{}\"{}INS", format_inches(ins.length), material));
        }

        if let Some(conn) = &self.connection {
            if conn.kind != ConnectionKind::Unknown {
                parts.push(conn.display.clone());
            }
        }

        parts.join("-")
    }

    /// Process connection as shown on a quote: the override, else the
    /// model default (`3/4"NPT`).
    pub fn connection_display(&self) -> String {
        if let Some(conn) = &self.connection {
            return conn.display.clone();
        }
        match &self.defaults.connection {
            Some(c) => format!("{}{}", c.size, c.kind.marker()),
            None => String::new(),
        }
    }

    /// Insulator as shown on a quote, e.g. `8.0" Teflon (Base: 4.0")`.
    pub fn insulator_display(&self) -> String {
        let base = self.specs.base_insulator_length;
        let (length, name) = match &self.insulator {
            Some(ins) => (
                ins.length,
                ins.material_name
                    .clone()
                    .or_else(|| ins.material.clone())
                    .unwrap_or_default(),
            ),
            None => (
                self.specs.insulator_length,
                self.specs
                    .insulator_material_name
                    .clone()
                    .or_else(|| self.specs.insulator_material.clone())
                    .unwrap_or_default(),
            ),
        };

        if (length - base).abs() > f64::EPSILON {
            format!("{length:.1}\" {name} (Base: {base:.1}\")")
        } else {
            format!("{length:.1}\" {name}")
        }
    }

    /// `CODE: Name` per option, in input order.
    pub fn option_displays(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|o| format!("{}: {}", o.code, o.name))
            .collect()
    }
}

/// Whole inches without a decimal, fractional lengths as written.
///
/// `f64`'s `Display` already drops the `.0` and prints every digit of large
/// values, so the text parses back to the same number.
pub(crate) fn format_inches(value: f64) -> String {
    format!("{value}")
}

// =============================================================================
// Unit Tests
// =============================================================================
