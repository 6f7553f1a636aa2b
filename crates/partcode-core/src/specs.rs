//! # Spec Calculator
//!
//! Derived specification values shown on a quote.
//!
//! ```text
//! effective insulator ──► max temperature   (insulator rating, else 180°F)
//! connection override ──► max pressure      (size table, else model default)
//! probe length        ──► base insulator    (≥8" → 4", ≥5" → 2", else 1")
//! options             ──► probe diameter    (3/4"OD widens it)
//! ```
//!
//! A length-only insulator (`6"INS`) takes its material here, from the
//! default insulator as left by the material rules.

use tracing::debug;

use crate::catalog::{Catalog, ModelDefaults};
use crate::config::ParserConfig;
use crate::types::{ComputedSpecs, ConnectionOverride, InsulatorSpec, QuoteOption};

/// Base insulator length for a probe length.
///
/// ## Example
/// ```rust
/// use partcode_core::specs::base_insulator_length;
///
/// assert_eq!(base_insulator_length(10.0), 4.0);
/// assert_eq!(base_insulator_length(6.0), 2.0);
/// assert_eq!(base_insulator_length(4.0), 1.0);
/// ```
pub fn base_insulator_length(probe_length: f64) -> f64 {
    if probe_length >= 8.0 {
        4.0
    } else if probe_length >= 5.0 {
        2.0
    } else {
        1.0
    }
}

/// Inputs the calculator reads.
#[derive(Debug, Clone, Copy)]
pub struct SpecInput<'a> {
    pub material: &'a str,
    pub probe_length: f64,
    pub options: &'a [QuoteOption],
    pub connection: Option<&'a ConnectionOverride>,
    pub model: Option<&'a ModelDefaults>,
    /// Default insulator after material rules.
    pub default_insulator: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecOutput {
    pub specs: ComputedSpecs,
    pub material_name: String,
    pub warnings: Vec<String>,
}

pub struct SpecCalculator<'a, C: ?Sized> {
    catalog: &'a C,
    config: &'a ParserConfig,
}

impl<'a, C: Catalog + ?Sized> SpecCalculator<'a, C> {
    pub fn new(catalog: &'a C, config: &'a ParserConfig) -> Self {
        Self { catalog, config }
    }

    /// Computes the derived specs and completes `insulator` in place
    /// (base length, length-only material).
    pub fn calculate(&self, input: SpecInput<'_>, insulator: Option<&mut InsulatorSpec>) -> SpecOutput {
        let mut warnings = Vec::new();
        let base_length = base_insulator_length(input.probe_length);

        let (insulator_material, insulator_length) = match insulator {
            Some(ins) => {
                ins.base_length = base_length;
                if ins.length_only {
                    match input.default_insulator {
                        Some(code) => {
                            ins.material = Some(code.to_string());
                            ins.material_name = Some(self.insulator_name(code));
                        }
                        None => warnings.push(format!(
                            "Insulator material for {}\"INS could not be determined",
                            crate::types::format_inches(ins.length)
                        )),
                    }
                }
                (ins.material.clone(), ins.length)
            }
            None => (input.default_insulator.map(str::to_string), base_length),
        };

        let max_temperature = insulator_material
            .as_deref()
            .and_then(|code| self.catalog.insulator_info(code))
            .and_then(|info| info.max_temperature)
            .unwrap_or(self.config.default_max_temperature);

        let max_pressure = input
            .connection
            .and_then(|conn| self.config.pressure_by_connection_size.get(&conn.size).copied())
            .or_else(|| input.model.and_then(|m| m.max_pressure));

        let wide = input
            .options
            .iter()
            .any(|o| o.code == self.config.pricing.diameter_option_code);
        let probe_diameter = if wide {
            Some(self.config.wide_probe_diameter.clone())
        } else {
            input.model.and_then(|m| m.probe_diameter.clone())
        };

        let material_name = self
            .catalog
            .material_info(input.material)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| format!("Unknown ({})", input.material));

        let specs = ComputedSpecs {
            max_temperature,
            max_pressure,
            base_insulator_length: base_length,
            probe_diameter,
            insulator_material_name: insulator_material
                .as_deref()
                .map(|code| self.insulator_name(code)),
            insulator_material,
            insulator_length,
        };

        debug!(
            max_temperature = specs.max_temperature,
            max_pressure = ?specs.max_pressure,
            base_insulator_length = specs.base_insulator_length,
            insulator = ?specs.insulator_material,
            "Computed specs"
        );

        SpecOutput {
            specs,
            material_name,
            warnings,
        }
    }

    fn insulator_name(&self, code: &str) -> String {
        self.catalog
            .insulator_info(code)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| format!("Unknown ({code})"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
