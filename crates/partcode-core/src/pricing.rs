//! # Pricing Engine
//!
//! Itemized pricing for a parsed configuration.
//!
//! ## Components
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Base Price         model base + material adder + voltage adder        │
//! │  Length Cost        stepped foot adders, or per inch past the material │
//! │                     base length                                         │
//! │  Length Surcharge   off stock lengths, or past 96"                     │
//! │  Options            bend (fixed), 3/4"OD (fee + stepped foot),         │
//! │                     catalog fixed/tiered                                │
//! │  Insulator          base adder (with exemptions) + length bracket      │
//! │  Process Connection override only, catalog (kind, size, 316SS, rating) │
//! │  ─────────────────────────────────────────────────────────────────     │
//! │  TOTAL              exact sum of the six                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stepped Foot Thresholds
//! ```text
//! base 10":  11  24  36  48  60 ...
//! base  6":   7  18  30  42  54 ...
//! other B:  B+1 B+12 B+24 ...
//! ```
//! One adder per threshold the pricing length meets or exceeds.
//!
//! ## Failure Handling
//! Every sub-step returns `PricingResult`. The [`PricingAccumulator`] turns a
//! failure into a zero contribution, a calculation note and a
//! `Pricing calculation failed: ...` warning, then carries on with the
//! remaining sub-steps.

use serde::{Deserialize, Serialize};
use std::iter;
use tracing::{debug, warn};

use crate::catalog::{Catalog, LengthPricing, ModelDefaults};
use crate::error::{PricingError, PricingResult};
use crate::money::Money;
use crate::types::{
    format_inches, ConnectionKind, ConnectionOverride, OptionCharge, PriceBreakdown, PriceKind,
    QuoteOption,
};

// =============================================================================
// Configuration
// =============================================================================

/// Which insulator base adders are waived.
///
/// Exemptions waive the base adder only. The length bracket adder always
/// applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsulatorExemptions {
    /// Coated probe material whose matching insulator is free.
    #[serde(default = "default_coated_material")]
    pub coated_material: String,
    /// Insulator that is free on the coated material.
    #[serde(default = "default_fluoropolymer")]
    pub fluoropolymer: String,
    /// Waive the base adder when the insulator is the model's own default.
    #[serde(default = "default_true")]
    pub model_default: bool,
}

fn default_coated_material() -> String {
    "H".to_string()
}

fn default_fluoropolymer() -> String {
    "TEF".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for InsulatorExemptions {
    fn default() -> Self {
        Self {
            coated_material: default_coated_material(),
            fluoropolymer: default_fluoropolymer(),
            model_default: default_true(),
        }
    }
}

/// Pricing constants that are not catalog rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Fixed price of any bent probe option.
    #[serde(default = "default_bend_price")]
    pub bend_price: Money,

    /// Option priced as fee plus stepped foot adders.
    #[serde(default = "default_diameter_option_code")]
    pub diameter_option_code: String,

    #[serde(default = "default_diameter_fee")]
    pub diameter_base_fee: Money,

    #[serde(default = "default_diameter_fee")]
    pub diameter_adder_per_foot: Money,

    /// Pricing length (inches) past which a material's surcharge applies.
    #[serde(default = "default_nonstandard_threshold")]
    pub nonstandard_length_threshold: f64,

    /// Material used for connection override lookups.
    #[serde(default = "default_connection_material")]
    pub connection_material: String,

    #[serde(default)]
    pub exemptions: InsulatorExemptions,
}

fn default_bend_price() -> Money {
    Money::from_dollars(50)
}

fn default_diameter_option_code() -> String {
    "3/4\"OD".to_string()
}

fn default_diameter_fee() -> Money {
    Money::from_dollars(175)
}

fn default_nonstandard_threshold() -> f64 {
    96.0
}

fn default_connection_material() -> String {
    crate::builtin::CONNECTION_MATERIAL.to_string()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            bend_price: default_bend_price(),
            diameter_option_code: default_diameter_option_code(),
            diameter_base_fee: default_diameter_fee(),
            diameter_adder_per_foot: default_diameter_fee(),
            nonstandard_length_threshold: default_nonstandard_threshold(),
            connection_material: default_connection_material(),
            exemptions: InsulatorExemptions::default(),
        }
    }
}

// =============================================================================
// Stepped Foot Pricing
// =============================================================================

/// Foot adder thresholds for a model base length, ascending, unbounded.
pub fn foot_thresholds(base_length: f64) -> impl Iterator<Item = f64> {
    let second = second_threshold(base_length);
    iter::once(base_length + 1.0).chain(iter::successors(Some(second), |t| Some(t + 12.0)))
}

fn second_threshold(base_length: f64) -> f64 {
    if base_length == 10.0 {
        24.0
    } else {
        base_length + 12.0
    }
}

/// Number of [`foot_thresholds`] that `length` meets or exceeds.
///
/// Closed form, so any finite length answers in constant time. `None` when
/// the count does not fit a `u64`.
///
/// ## Example
/// ```rust
/// use partcode_core::pricing::count_foot_adders;
///
/// assert_eq!(count_foot_adders(10.0, 10.0), Some(0));
/// assert_eq!(count_foot_adders(10.0, 11.0), Some(1));
/// assert_eq!(count_foot_adders(10.0, 23.0), Some(1));
/// assert_eq!(count_foot_adders(10.0, 24.0), Some(2));
/// assert_eq!(count_foot_adders(6.0, 18.0), Some(2));
/// ```
pub fn count_foot_adders(base_length: f64, length: f64) -> Option<u64> {
    if !length.is_finite() {
        return None;
    }
    if length < base_length + 1.0 {
        return Some(0);
    }
    let second = second_threshold(base_length);
    if length < second {
        return Some(1);
    }
    let steps = ((length - second) / 12.0).floor();
    whole_count(steps).and_then(|steps| steps.checked_add(2))
}

/// Non-negative whole `f64` as `u64`, `None` when out of range.
fn whole_count(value: f64) -> Option<u64> {
    // u64::MAX as f64 rounds up to 2^64, itself out of range
    if value.is_finite() && value >= 0.0 && value < u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

/// Stepped foot cost: adders × `adder_per_foot`.
pub fn stepped_foot_cost(
    base_length: f64,
    length: f64,
    adder_per_foot: Money,
) -> PricingResult<(Money, u32)> {
    let overflow = || PricingError::Overflow {
        what: "foot adders".to_string(),
    };
    let count = count_foot_adders(base_length, length)
        .and_then(|count| u32::try_from(count).ok())
        .ok_or_else(overflow)?;
    let cost = adder_per_foot
        .checked_mul(i64::from(count))
        .ok_or_else(overflow)?;
    Ok((cost, count))
}

/// Per-inch cost for `inches` whole inches.
fn per_inch_cost(rate: Money, inches: f64) -> PricingResult<Money> {
    whole_count(inches)
        .and_then(|inches| i64::try_from(inches).ok())
        .and_then(|inches| rate.checked_mul(inches))
        .ok_or_else(|| PricingError::Overflow {
            what: "length cost".to_string(),
        })
}

fn non_negative(what: impl Into<String>, amount: Money) -> PricingResult<Money> {
    if amount.is_negative() {
        Err(PricingError::NegativeAmount { what: what.into() })
    } else {
        Ok(amount)
    }
}

// =============================================================================
// Accumulator
// =============================================================================

/// The six breakdown components, in line-item order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Base,
    Length,
    Surcharge,
    Options,
    Insulator,
    Connection,
}

impl Component {
    pub const ALL: [Component; 6] = [
        Component::Base,
        Component::Length,
        Component::Surcharge,
        Component::Options,
        Component::Insulator,
        Component::Connection,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Component::Base => "Base Price",
            Component::Length => "Length Cost",
            Component::Surcharge => "Length Surcharge",
            Component::Options => "Options",
            Component::Insulator => "Insulator",
            Component::Connection => "Process Connection",
        }
    }
}

/// Collects component amounts and sub-step failures into a breakdown.
#[derive(Debug, Default)]
pub struct PricingAccumulator {
    breakdown: PriceBreakdown,
    warnings: Vec<String>,
}

impl PricingAccumulator {
    pub fn new(original_length: f64, pricing_length: f64) -> Self {
        Self {
            breakdown: PriceBreakdown {
                original_length,
                pricing_length,
                ..Default::default()
            },
            warnings: Vec::new(),
        }
    }

    fn slot(&mut self, component: Component) -> &mut Money {
        match component {
            Component::Base => &mut self.breakdown.base_price,
            Component::Length => &mut self.breakdown.length_price,
            Component::Surcharge => &mut self.breakdown.length_surcharge,
            Component::Options => &mut self.breakdown.option_price,
            Component::Insulator => &mut self.breakdown.insulator_price,
            Component::Connection => &mut self.breakdown.connection_price,
        }
    }

    pub fn amount(&self, component: Component) -> Money {
        match component {
            Component::Base => self.breakdown.base_price,
            Component::Length => self.breakdown.length_price,
            Component::Surcharge => self.breakdown.length_surcharge,
            Component::Options => self.breakdown.option_price,
            Component::Insulator => self.breakdown.insulator_price,
            Component::Connection => self.breakdown.connection_price,
        }
    }

    /// Adds a sub-step result to a component. Returns the amount added,
    /// zero on failure.
    pub fn add(&mut self, component: Component, result: PricingResult<Money>) -> Money {
        let amount = result
            .and_then(|amount| non_negative(component.label(), amount))
            .and_then(|amount| {
                let slot = self.amount(component);
                slot.checked_add(amount)
                    .map(|total| (amount, total))
                    .ok_or_else(|| PricingError::Overflow {
                        what: component.label().to_string(),
                    })
            });

        match amount {
            Ok((amount, total)) => {
                *self.slot(component) = total;
                amount
            }
            Err(err) => {
                self.fail(component, err);
                Money::zero()
            }
        }
    }

    /// Records a failed sub-step without touching any amount.
    pub fn fail(&mut self, component: Component, err: PricingError) {
        warn!(component = component.label(), error = %err, "Pricing sub-step failed");
        self.breakdown
            .notes
            .push(format!("{} calculation failed: {err}", component.label()));
        self.warnings.push(format!("Pricing calculation failed: {err}"));
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.breakdown.notes.push(note.into());
    }

    pub fn option_charge(&mut self, charge: OptionCharge) {
        self.breakdown.option_details.push(charge);
    }

    /// Totals the components and emits line items.
    pub fn finish(mut self) -> (PriceBreakdown, Vec<String>) {
        let total = Component::ALL
            .iter()
            .try_fold(Money::zero(), |acc, c| acc.checked_add(self.amount(*c)));

        match total {
            Some(total) => self.breakdown.total_price = total,
            None => {
                let err = PricingError::Overflow {
                    what: "total".to_string(),
                };
                self.warnings.push(format!("Pricing calculation failed: {err}"));
                self.breakdown.notes.push(format!("TOTAL calculation failed: {err}"));
                for component in Component::ALL {
                    *self.slot(component) = Money::zero();
                }
                self.breakdown.option_details.clear();
                self.breakdown.total_price = Money::zero();
            }
        }

        let mut lines: Vec<String> = Component::ALL
            .iter()
            .filter(|c| !self.amount(**c).is_zero())
            .map(|c| format!("{}: {}", c.label(), self.amount(*c)))
            .collect();
        lines.push(format!("TOTAL: {}", self.breakdown.total_price));
        self.breakdown.line_items = lines;

        (self.breakdown, self.warnings)
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Effective insulator to price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsulatorRequest<'a> {
    pub code: &'a str,
    pub length: f64,
}

/// Everything the engine prices, besides the options.
#[derive(Debug, Clone, Copy)]
pub struct PricingRequest<'a> {
    pub model: &'a str,
    pub voltage: &'a str,
    pub material: &'a str,
    pub probe_length: f64,
    pub insulator: Option<InsulatorRequest<'a>>,
    pub connection: Option<&'a ConnectionOverride>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingOutcome {
    pub breakdown: PriceBreakdown,
    pub warnings: Vec<String>,
}

pub struct PricingEngine<'a, C: ?Sized> {
    catalog: &'a C,
    config: &'a PricingConfig,
}

impl<'a, C: Catalog + ?Sized> PricingEngine<'a, C> {
    pub fn new(catalog: &'a C, config: &'a PricingConfig) -> Self {
        Self { catalog, config }
    }

    /// Prices a configuration. Fills the pricing fields of `options` in
    /// place. Never fails: sub-step failures become warnings.
    pub fn price(&self, req: PricingRequest<'_>, options: &mut [QuoteOption]) -> PricingOutcome {
        let pricing_length = pricing_length(req.probe_length);
        let mut acc = PricingAccumulator::new(req.probe_length, pricing_length);

        if pricing_length != req.probe_length {
            acc.note(format!(
                "Probe length {}\" rounded up to {}\" for pricing",
                format_inches(req.probe_length),
                format_inches(pricing_length)
            ));
        }

        let model = self.catalog.model_defaults(req.model);
        match model {
            Some(model) => {
                acc.note(format!("Base Model ({}): {}", model.code, model.base_price));
                acc.add(
                    Component::Base,
                    non_negative(format!("model {}", model.code), model.base_price),
                );
                let voltage_adder = model.voltage_adder(req.voltage);
                if !voltage_adder.is_zero() {
                    acc.note(format!("Voltage Adder ({}): {voltage_adder}", req.voltage));
                }
                acc.add(
                    Component::Base,
                    non_negative(format!("voltage {}", req.voltage), voltage_adder),
                );
            }
            None => acc.fail(
                Component::Base,
                PricingError::ModelNotFound(req.model.to_string()),
            ),
        }

        self.price_material(&mut acc, model, req.material, pricing_length);
        self.price_options(&mut acc, model, req.model, options, pricing_length);

        if let Some(insulator) = req.insulator {
            let result = self.insulator_cost(&mut acc, model, req.material, insulator);
            acc.add(Component::Insulator, result);
        }

        if let Some(conn) = req.connection.filter(|c| c.kind != ConnectionKind::Unknown) {
            let result = self.connection_cost(&mut acc, conn);
            acc.add(Component::Connection, result);
        }

        let (breakdown, warnings) = acc.finish();
        debug!(
            model = %req.model,
            total = %breakdown.total_price,
            failures = warnings.len(),
            "Priced configuration"
        );
        PricingOutcome {
            breakdown,
            warnings,
        }
    }

    fn price_material(
        &self,
        acc: &mut PricingAccumulator,
        model: Option<&ModelDefaults>,
        material: &str,
        length: f64,
    ) {
        // Model unknown: base already failed, nothing to build on.
        let Some(model) = model else {
            return;
        };
        let Some(info) = self.catalog.material_info(material) else {
            acc.fail(
                Component::Base,
                PricingError::MaterialNotFound(material.to_string()),
            );
            return;
        };

        if !info.base_price_adder.is_zero() {
            acc.note(format!(
                "Material Adder ({}): {}",
                info.code, info.base_price_adder
            ));
        }
        acc.add(
            Component::Base,
            non_negative(format!("material {}", info.code), info.base_price_adder),
        );

        match &info.length_pricing {
            LengthPricing::None => {}
            LengthPricing::PerFoot { rate } => {
                let result = non_negative(format!("material {} rate", info.code), *rate)
                    .and_then(|rate| stepped_foot_cost(model.base_length, length, rate));
                if let Ok((cost, count)) = &result {
                    if *count > 0 {
                        acc.note(format!(
                            "Length Cost ({count} foot adders @ {rate}/ft): {cost}"
                        ));
                    }
                }
                acc.add(Component::Length, result.map(|(cost, _)| cost));
            }
            LengthPricing::PerInch { rate, base_length } => {
                let extra = (length - base_length).max(0.0).ceil();
                let result = non_negative(format!("material {} rate", info.code), *rate)
                    .and_then(|rate| per_inch_cost(rate, extra));
                if let Ok(cost) = &result {
                    if !cost.is_zero() {
                        acc.note(format!(
                            "Length Cost ({}\" extra @ {rate}/in): {cost}",
                            format_inches(extra)
                        ));
                    }
                }
                acc.add(Component::Length, result);
            }
        }

        let threshold = self.config.nonstandard_length_threshold;
        if info.is_nonstandard_length(length, threshold)
            && !info.nonstandard_length_surcharge.is_zero()
        {
            let surcharge = info.nonstandard_length_surcharge;
            let reason = if info.standard_lengths.is_empty() {
                format!(">{}\"", format_inches(threshold))
            } else {
                format!("{}\" is not a stock length", format_inches(length))
            };
            acc.note(format!("Nonstandard Length Surcharge ({reason}): {surcharge}"));
            acc.add(
                Component::Surcharge,
                non_negative(format!("material {} surcharge", info.code), surcharge),
            );
        }
    }

    fn price_options(
        &self,
        acc: &mut PricingAccumulator,
        model: Option<&ModelDefaults>,
        model_code: &str,
        options: &mut [QuoteOption],
        length: f64,
    ) {
        for option in options.iter_mut() {
            let result = self.option_price(model, model_code, option, length);
            let added = acc.add(Component::Options, result);
            option.price = added;
            if let Some(kind) = option.price_kind {
                acc.option_charge(OptionCharge {
                    code: option.code.clone(),
                    amount: added,
                    kind,
                });
                debug!(option = %option.code, price = %added, kind = ?kind, "Priced option");
            }
        }
    }

    fn option_price(
        &self,
        model: Option<&ModelDefaults>,
        model_code: &str,
        option: &mut QuoteOption,
        length: f64,
    ) -> PricingResult<Money> {
        if option.is_bend() {
            option.price_kind = Some(PriceKind::Fixed);
            return Ok(self.config.bend_price);
        }

        if option.code == self.config.diameter_option_code {
            let model = model.ok_or_else(|| PricingError::ModelNotFound(model_code.to_string()))?;
            let (extra, count) =
                stepped_foot_cost(model.base_length, length, self.config.diameter_adder_per_foot)?;
            option.price_kind = Some(PriceKind::SteppedFoot);
            option.base_cost = Some(self.config.diameter_base_fee);
            option.per_foot_cost = Some(self.config.diameter_adder_per_foot);
            option.foot_adders = Some(count);
            return self
                .config
                .diameter_base_fee
                .checked_add(extra)
                .ok_or_else(|| PricingError::Overflow {
                    what: option.code.clone(),
                });
        }

        let info = self
            .catalog
            .option_info(&option.code)
            .ok_or_else(|| PricingError::OptionNotFound(option.code.clone()))?;
        let kind = match info.pricing {
            crate::catalog::OptionPricing::Fixed { .. } => PriceKind::Fixed,
            crate::catalog::OptionPricing::Tiered { .. } => PriceKind::Tiered,
        };
        option.price_kind = Some(kind);
        non_negative(format!("option {}", option.code), info.pricing.price_for(length))
    }

    fn insulator_cost(
        &self,
        acc: &mut PricingAccumulator,
        model: Option<&ModelDefaults>,
        material: &str,
        insulator: InsulatorRequest<'_>,
    ) -> PricingResult<Money> {
        let info = self
            .catalog
            .insulator_info(insulator.code)
            .ok_or_else(|| PricingError::InsulatorNotFound(insulator.code.to_string()))?;
        let exemptions = &self.config.exemptions;

        let base_adder = non_negative(format!("insulator {}", info.code), info.price_adder)?;
        let waived = if material == exemptions.coated_material
            && insulator.code == exemptions.fluoropolymer
        {
            Some(format!("probe material {material}"))
        } else if exemptions.model_default
            && model.and_then(|m| m.insulator.as_deref()) == Some(insulator.code)
        {
            Some("model default insulator".to_string())
        } else {
            None
        };

        let base = match waived {
            Some(reason) => {
                if !base_adder.is_zero() {
                    acc.note(format!(
                        "Insulator ({}): base adder {base_adder} waived ({reason})",
                        info.name
                    ));
                }
                Money::zero()
            }
            None => base_adder,
        };

        let bracket = non_negative(
            format!("insulator {} bracket", info.code),
            info.brackets.adder_for(insulator.length),
        )?;
        if !bracket.is_zero() {
            acc.note(format!(
                "Insulator Length Adder ({}\" {}): {bracket}",
                format_inches(insulator.length),
                info.name
            ));
        }

        base.checked_add(bracket)
            .ok_or_else(|| PricingError::Overflow {
                what: "insulator".to_string(),
            })
    }

    fn connection_cost(
        &self,
        acc: &mut PricingAccumulator,
        conn: &ConnectionOverride,
    ) -> PricingResult<Money> {
        let material = &self.config.connection_material;
        let info = self
            .catalog
            .connection_info(conn.kind, &conn.size, material, conn.rating.as_deref())
            .ok_or_else(|| PricingError::ConnectionNotFound {
                display: conn.display.clone(),
                material: material.clone(),
            })?;
        acc.note(format!("Process Connection ({}): {}", info.display(), info.price));
        Ok(info.price)
    }
}

/// Probe length rounded up to a whole inch.
pub fn pricing_length(probe_length: f64) -> f64 {
    probe_length.ceil()
}

// =============================================================================
// Unit Tests
// =============================================================================
