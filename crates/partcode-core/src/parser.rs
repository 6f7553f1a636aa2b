//! # Quote Parser
//!
//! Runs the whole pipeline for one part code.
//!
//! ```text
//! raw code
//!    │
//!    ▼
//! split ─────────► CoreError (fewer than 4 fields: the only Err)
//!    │
//!    ▼
//! resolve model / voltage / material, parse length
//!    │
//!    ▼
//! merge model defaults ──► material rules ──► classify modifiers
//!    │
//!    ▼
//! derive specs ──► price ──► check compatibility
//!    │
//!    ▼
//! ParsedConfiguration { warnings, errors }
//! ```
//!
//! Everything after the split degrades into `warnings` / `errors` on the
//! result. A parser holds only its catalog and config, so `parse` takes
//! `&self` and can run concurrently against a shared catalog.

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::compatibility::{CompatibilityInput, CompatibilityValidator};
use crate::config::ParserConfig;
use crate::error::CoreResult;
use crate::modifiers::{parse_insulator, Modifier, ModifierClassifier};
use crate::pricing::{InsulatorRequest, PricingEngine, PricingRequest};
use crate::resolver::{parse_length, Resolved, ShorthandResolver};
use crate::rules::RuleApplier;
use crate::specs::{SpecCalculator, SpecInput};
use crate::splitter::split;
use crate::types::{
    format_inches, ConnectionOverride, Field, FieldKind, InsulatorSpec, MergedDefaults,
    ParsedConfiguration, QuoteOption, Resolution, Section,
};

/// Part-code parser bound to a catalog.
///
/// ## Usage
/// ```rust
/// use partcode_core::builtin;
/// use partcode_core::parser::QuoteParser;
///
/// let parser = QuoteParser::new(builtin::catalog());
/// let parsed = parser.parse("LS2000-115VAC-S-10\"-XSP").unwrap();
///
/// assert_eq!(parsed.model, "LS2000");
/// assert_eq!(parsed.pricing.total_price.to_string(), "$485.00");
/// ```
#[derive(Debug, Clone)]
pub struct QuoteParser<C> {
    catalog: C,
    config: ParserConfig,
}

/// Modifier outcome accumulated while classifying tokens.
#[derive(Default)]
struct ModifierState {
    options: Vec<QuoteOption>,
    insulator: Option<InsulatorSpec>,
    connection: Option<ConnectionOverride>,
    housing: Option<String>,
    fields: Vec<Field>,
    warnings: Vec<String>,
}

impl<C: Catalog> QuoteParser<C> {
    /// Parser with the default configuration.
    pub fn new(catalog: C) -> Self {
        Self::with_config(catalog, ParserConfig::default())
    }

    pub fn with_config(catalog: C, config: ParserConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses and prices one part code.
    ///
    /// ## Errors
    /// Only when the code is empty or has fewer than four fields. Any other
    /// problem is reported in the result's `warnings` or `errors`.
    pub fn parse(&self, raw: &str) -> CoreResult<ParsedConfiguration> {
        let parts = split(raw)?;
        let mut warnings = Vec::new();

        // Positional fields
        let resolver = ShorthandResolver::new(&self.catalog);
        let model = resolver.resolve(Section::Model, &parts.model);
        let voltage = resolver.resolve(Section::Voltage, &parts.voltage);
        let material = resolver.resolve(Section::Material, &parts.material);

        for (section, resolved) in [
            (Section::Model, &model),
            (Section::Voltage, &voltage),
            (Section::Material, &material),
        ] {
            if let Some(unresolved) = resolved.unresolved(section) {
                warnings.push(unresolved.to_string());
            }
        }

        let parsed_length = parse_length(&parts.length);
        let probe_length = parsed_length.unwrap_or_else(|| {
            warnings.push(format!(
                "Invalid probe length '{}', using default {}\"",
                parts.length,
                format_inches(self.config.default_probe_length)
            ));
            self.config.default_probe_length
        });

        let mut fields = vec![
            positional(FieldKind::Model, &parts.model, &model),
            positional(FieldKind::Voltage, &parts.voltage, &voltage),
            positional(FieldKind::Material, &parts.material, &material),
            Field {
                kind: FieldKind::Length,
                raw: parts.length.clone(),
                canonical: parsed_length.map(format_inches),
                resolution: if parsed_length.is_some() {
                    Resolution::Exact
                } else {
                    Resolution::Unresolved
                },
            },
        ];

        // Model defaults
        let model_defaults = self.catalog.model_defaults(&model.code);
        let mut defaults = model_defaults
            .map(|m| MergedDefaults {
                connection: m.connection.clone(),
                insulator: m.insulator.clone(),
                housing: m.housing.clone(),
                output: m.output.clone(),
            })
            .unwrap_or_default();
        if model_defaults.is_none() {
            debug!(model = %model.code, "No model defaults, continuing with empty defaults");
        }

        // Material rules see whether the surviving insulator token names
        // its material.
        let explicit_insulator = parts
            .modifiers
            .iter()
            .filter_map(|token| parse_insulator(token))
            .last()
            .map(|token| token.material.is_some())
            .unwrap_or(false);
        let outcome = RuleApplier::new(&self.config.rules).apply(&material.code, explicit_insulator);
        if let Some(insulator) = outcome.insulator {
            defaults.insulator = Some(insulator);
        }
        warnings.extend(outcome.warnings);

        // Modifiers
        let mut state = self.classify_modifiers(&parts.modifiers);
        if let Some(housing) = state.housing.take() {
            defaults.housing = Some(housing);
        }
        fields.append(&mut state.fields);
        warnings.append(&mut state.warnings);

        // Specs
        let spec_output = SpecCalculator::new(&self.catalog, &self.config).calculate(
            SpecInput {
                material: &material.code,
                probe_length,
                options: &state.options,
                connection: state.connection.as_ref(),
                model: model_defaults,
                default_insulator: defaults.insulator.as_deref(),
            },
            state.insulator.as_mut(),
        );
        warnings.extend(spec_output.warnings);
        let specs = spec_output.specs;

        // Pricing. An unknown insulator material was already reported by the
        // classifier.
        let insulator = specs
            .insulator_material
            .as_deref()
            .filter(|code| self.catalog.insulator_info(code).is_some())
            .map(|code| InsulatorRequest {
                code,
                length: specs.insulator_length,
            });
        let pricing = PricingEngine::new(&self.catalog, &self.config.pricing).price(
            PricingRequest {
                model: &model.code,
                voltage: &voltage.code,
                material: &material.code,
                probe_length,
                insulator,
                connection: state.connection.as_ref(),
            },
            &mut state.options,
        );
        warnings.extend(pricing.warnings);

        // Compatibility
        let report = CompatibilityValidator::new(&self.config.compatibility).validate(
            CompatibilityInput {
                model: &model.code,
                voltage: &voltage.code,
                material: &material.code,
                material_name: &spec_output.material_name,
                probe_length,
                options: &state.options,
            },
        );
        warnings.extend(report.warnings.iter().map(ToString::to_string));
        let errors: Vec<String> = report.errors.iter().map(ToString::to_string).collect();

        info!(
            code = %parts.normalized,
            model = %model.code,
            total = %pricing.breakdown.total_price,
            warnings = warnings.len(),
            errors = errors.len(),
            "Parsed part code"
        );

        Ok(ParsedConfiguration {
            raw_code: raw.to_string(),
            fields,
            model: model.code,
            voltage: voltage.code,
            material: material.code,
            material_name: spec_output.material_name,
            probe_length,
            options: state.options,
            insulator: state.insulator,
            connection: state.connection,
            defaults,
            specs,
            pricing: pricing.breakdown,
            warnings,
            errors,
        })
    }

    fn classify_modifiers(&self, tokens: &[String]) -> ModifierState {
        let classifier = ModifierClassifier::new(&self.catalog, &self.config.housing_tokens);
        let mut state = ModifierState::default();

        for token in tokens {
            let modifier = classifier.classify(token);
            if let Some(warning) = modifier.warning() {
                state.warnings.push(warning);
            }
            state.fields.push(modifier_field(token, &modifier));

            match modifier {
                Modifier::Insulator { spec, .. } => {
                    if state.insulator.is_some() {
                        state.warnings.push(format!(
                            "Multiple insulator specifications, using {token}"
                        ));
                    }
                    state.insulator = Some(spec);
                }
                Modifier::Bend(option) | Modifier::Option(option) => {
                    push_option(&mut state, option);
                }
                Modifier::Housing { housing, option } => {
                    state.housing = Some(housing);
                    push_option(&mut state, option);
                }
                Modifier::Connection(conn) => {
                    if state.connection.is_some() {
                        state.warnings.push(format!(
                            "Multiple process connections, using {token}"
                        ));
                    }
                    state.connection = Some(conn);
                }
                Modifier::MalformedInsulator(_)
                | Modifier::InvalidBend(_)
                | Modifier::MalformedConnection(_)
                | Modifier::Unknown(_) => {}
            }
        }

        state
    }
}

fn push_option(state: &mut ModifierState, option: QuoteOption) {
    if state.options.iter().any(|o| o.code == option.code) {
        state
            .warnings
            .push(format!("Duplicate option ignored: {}", option.code));
        return;
    }
    state.options.push(option);
}

fn positional(kind: FieldKind, raw: &str, resolved: &Resolved) -> Field {
    Field {
        kind,
        raw: raw.to_string(),
        canonical: resolved.is_resolved().then(|| resolved.code.clone()),
        resolution: resolved.resolution,
    }
}

fn modifier_field(token: &str, modifier: &Modifier) -> Field {
    let (canonical, resolution) = match modifier {
        Modifier::Option(option) | Modifier::Housing { option, .. } => (
            Some(option.code.clone()),
            if option.alias_of.is_some() {
                Resolution::Alias
            } else {
                Resolution::Exact
            },
        ),
        Modifier::Bend(option) => (Some(option.code.clone()), Resolution::Exact),
        Modifier::Connection(conn) => (Some(conn.display.clone()), Resolution::Exact),
        Modifier::Insulator { known: true, .. } => (Some(token.to_string()), Resolution::Exact),
        _ => (None, Resolution::Unresolved),
    };
    Field {
        kind: FieldKind::Modifier,
        raw: token.to_string(),
        canonical,
        resolution,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use crate::catalog::CatalogSnapshot;
    use crate::error::CoreError;
    use crate::money::Money;

    fn parser() -> QuoteParser<CatalogSnapshot> {
        QuoteParser::new(builtin::catalog())
    }

    #[test]
    fn test_scenario_a_base_configuration() {
        let parsed = parser().parse("LS2000-115VAC-S-10\"").unwrap();

        assert_eq!(parsed.model, "LS2000");
        assert_eq!(parsed.voltage, "115VAC");
        assert_eq!(parsed.material, "S");
        assert_eq!(parsed.probe_length, 10.0);
        assert!(parsed.options.is_empty());
        assert!(parsed.insulator.is_none());
        assert_eq!(parsed.specs.insulator_material.as_deref(), Some("U"));
        assert_eq!(parsed.specs.base_insulator_length, 4.0);
        assert_eq!(parsed.pricing.total_price, parsed.pricing.base_price);
        assert_eq!(parsed.pricing.total_price, Money::from_dollars(455));
        assert!(parsed.warnings.is_empty());
        assert!(parsed.is_valid());
    }

    #[test]
    fn test_scenario_b_halar_forces_teflon() {
        let parsed = parser().parse("LS2000-115VAC-H-80\"").unwrap();

        assert_eq!(parsed.defaults.insulator.as_deref(), Some("TEF"));
        assert_eq!(parsed.specs.insulator_material.as_deref(), Some("TEF"));
        assert_eq!(parsed.specs.max_temperature, 450);
        assert_eq!(parsed.warnings.len(), 2);
        assert!(parsed.warnings[0].contains("automatically changed to Teflon"));
        assert!(parsed.warnings[1].contains("72\""));
        assert!(parsed.is_valid());
        // Teflon on Halar: base adder waived, 4" base length is free
        assert!(parsed.pricing.insulator_price.is_zero());
        // 80" is not a stock Halar length
        assert_eq!(parsed.pricing.length_surcharge, Money::from_dollars(300));
    }

    #[test]
    fn test_scenario_c_bend_option() {
        let parsed = parser().parse("LS2000-115VAC-S-10\"-90DEG").unwrap();

        assert_eq!(parsed.options.len(), 1);
        assert_eq!(parsed.options[0].parameter, Some(90));
        assert_eq!(parsed.options[0].price, Money::from_dollars(50));
        assert_eq!(parsed.pricing.option_price, Money::from_dollars(50));
        assert_eq!(parsed.pricing.total_price, Money::from_dollars(505));
    }

    #[test]
    fn test_scenario_d_unknown_modifier() {
        let parsed = parser().parse("LS2000-115VAC-S-10\"-INVALIDXYZ").unwrap();

        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("INVALIDXYZ"));
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.pricing.total_price, Money::from_dollars(455));
    }

    #[test]
    fn test_scenario_e_ambiguous_model() {
        let parsed = parser().parse("LS-115VAC-S-10\"").unwrap();

        assert_eq!(parsed.model, "LS");
        assert_eq!(parsed.defaults, MergedDefaults::default());
        assert!(parsed.pricing.total_price.is_zero());
        assert!(parsed.warnings[0].starts_with("Unrecognized model 'LS'"));
        assert_eq!(parsed.fields[0].canonical, None);
    }

    #[test]
    fn test_unknown_model_ignores_material_pricing() {
        for code in ["LS-115VAC-H-10\"", "LS-115VAC-H-11\"", "LS-115VAC-U-40\""] {
            let parsed = parser().parse(code).unwrap();
            assert!(parsed.pricing.base_price.is_zero(), "{code}");
            assert!(parsed.pricing.length_surcharge.is_zero(), "{code}");
            assert!(parsed.pricing.total_price.is_zero(), "{code}");
        }
    }

    #[test]
    fn test_huge_length_terminates() {
        let parser = parser();
        for code in ["LS2000-115VAC-S-1E20\"", "LS2000-115VAC-S-1E20\"-3/4\"OD"] {
            let parsed = parser.parse(code).unwrap();
            assert_eq!(parsed.probe_length, 1e20, "{code}");
            assert!(!parsed.is_valid(), "{code}");
            assert!(parsed.pricing.length_price.is_zero(), "{code}");
            assert!(parsed.pricing.option_price.is_zero(), "{code}");
            assert!(parsed
                .warnings
                .iter()
                .any(|w| w.contains("Pricing calculation failed")));

            let reparsed = parser.parse(&parsed.expanded_code()).unwrap();
            assert_eq!(reparsed.probe_length, 1e20, "{code}");
            assert_eq!(reparsed.expanded_code(), parsed.expanded_code());
        }
    }

    #[test]
    fn test_full_code() {
        let parsed = parser()
            .parse("LS2000-115VAC-S-10\"-XSP-VR-8\"TEFINS")
            .unwrap();

        assert_eq!(parsed.option_displays().len(), 2);
        let insulator = parsed.insulator.as_ref().unwrap();
        assert_eq!(insulator.material.as_deref(), Some("TEF"));
        assert_eq!(insulator.base_length, 4.0);
        // 455 + 30 + 50 + (40 + 200)
        assert_eq!(parsed.pricing.total_price, Money::from_dollars(775));
        assert_eq!(parsed.insulator_display(), "8.0\" Teflon (Base: 4.0\")");
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.fields.len(), 7);
    }

    #[test]
    fn test_shorthand_expansion() {
        let parsed = parser().parse("ls2-115-s-24\"").unwrap();
        assert_eq!(parsed.model, "LS2000");
        assert_eq!(parsed.voltage, "115VAC");
        assert_eq!(parsed.fields[0].resolution, Resolution::Alias);
        assert_eq!(parsed.pricing.length_price, Money::from_dollars(90));
    }

    #[test]
    fn test_explicit_insulator_suppresses_halar_rule() {
        let parsed = parser().parse("LS2000-115VAC-H-10\"-8\"UINS").unwrap();
        assert_eq!(parsed.specs.insulator_material.as_deref(), Some("U"));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_length_only_insulator_follows_rules() {
        let parsed = parser().parse("LS2000-115VAC-H-10\"-6\"INS").unwrap();
        let insulator = parsed.insulator.as_ref().unwrap();
        assert_eq!(insulator.material.as_deref(), Some("TEF"));
        assert!(insulator.length_only);
        assert_eq!(parsed.warnings.len(), 1);
        // Base waived on Halar, 6" bracket applies
        assert_eq!(parsed.pricing.insulator_price, Money::from_dollars(150));
    }

    #[test]
    fn test_last_insulator_and_connection_win() {
        let parsed = parser()
            .parse("LS2000-115VAC-S-10\"-6\"TEFINS-8\"UINS-1\"NPT-2\"150#RF")
            .unwrap();

        assert_eq!(
            parsed.insulator.as_ref().unwrap().material.as_deref(),
            Some("U")
        );
        assert_eq!(parsed.connection.as_ref().unwrap().display, "2\"150#RF");
        assert_eq!(parsed.connection_display(), "2\"150#RF");
        assert_eq!(parsed.specs.max_pressure, Some(150));
        assert_eq!(parsed.warnings.len(), 2);
    }

    #[test]
    fn test_housing_token() {
        let parsed = parser().parse("LS7000-115VAC-S-10\"-SS").unwrap();
        assert_eq!(
            parsed.defaults.housing.as_deref(),
            Some("Stainless Steel, NEMA 4X")
        );
        assert!(parsed.has_option("SSHOUSING"));
        assert!(parsed.is_valid());
    }

    #[test]
    fn test_incompatibility_does_not_block_pricing() {
        let parsed = parser().parse("LS2000-230VAC-CPVC-10\"-CP-45DEG").unwrap();
        assert_eq!(parsed.errors.len(), 3);
        assert!(!parsed.is_valid());
        assert!(parsed.pricing.total_price > Money::zero());
    }

    #[test]
    fn test_invalid_length_uses_default() {
        let parsed = parser().parse("LS2000-115VAC-S-ABC").unwrap();
        assert_eq!(parsed.probe_length, 10.0);
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("ABC"));
    }

    #[test]
    fn test_bad_modifiers_warn_once_each() {
        let parsed = parser()
            .parse("LS2000-115VAC-S-10\"-200DEG-X\"INS-5\"ZZINS-9\"XNPT")
            .unwrap();
        assert_eq!(parsed.warnings.len(), 4);
        assert!(parsed.errors.is_empty());
        assert!(parsed.options.is_empty());
    }

    #[test]
    fn test_too_few_fields_is_fatal() {
        let err = parser().parse("LS2000-115VAC-S").unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { found: 3, .. }));
    }

    #[test]
    fn test_expanded_code_round_trip() {
        let parser = parser();
        for code in [
            "LS2000-115VAC-S-10\"",
            "ls2-115-h-24.5\"-xsp-vr-6\"ins-1\"npt",
            "LS7000-24-S-36\"-SS-3/4\"ROD-45DEG-8\"TEFINS-2\"TC",
            "LS-115VAC-S-10\"-INVALIDXYZ",
        ] {
            let first = parser.parse(code).unwrap();
            let second = parser.parse(&first.expanded_code()).unwrap();

            assert_eq!(first.model, second.model, "{code}");
            assert_eq!(first.voltage, second.voltage, "{code}");
            assert_eq!(first.material, second.material, "{code}");
            assert_eq!(first.probe_length, second.probe_length, "{code}");
            let priced = |p: &ParsedConfiguration| -> Vec<(String, Money)> {
                p.options.iter().map(|o| (o.code.clone(), o.price)).collect()
            };
            assert_eq!(priced(&first), priced(&second), "{code}");
            assert_eq!(first.insulator, second.insulator, "{code}");
            assert_eq!(first.connection, second.connection, "{code}");
            assert_eq!(first.expanded_code(), second.expanded_code(), "{code}");
        }
    }

    #[test]
    fn test_parser_is_shareable() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<QuoteParser<CatalogSnapshot>>();
    }
}
