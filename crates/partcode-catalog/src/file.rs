//! # Catalog Files
//!
//! Loads a [`CatalogSnapshot`] from disk.
//!
//! ## Load Steps
//! ```text
//! catalog.toml / catalog.json
//!        │
//!        ▼
//!   deserialize ──► normalize (trim, upper-case codes) ──► validate
//!                                                            │
//!                              problems? ──yes──► CatalogError::InvalidCatalog
//!                                 │ no
//!                                 ▼
//!                           CatalogSnapshot
//! ```
//!
//! ## File Format
//! ```toml
//! [[models]]
//! code = "LS2000"
//! base_price = 47500        # cents
//! base_length = 10.0
//! insulator = "U"
//!
//! [[options]]
//! code = "XSP"
//! name = "Extra Static Protection"
//! pricing = { kind = "fixed", price = 3500 }
//!
//! [[aliases]]
//! section = "model"
//! alias = "LS2K"
//! code = "LS2000"
//! ```
//!
//! A file only needs the rows it adds or overrides; the builtin catalog
//! answers everything else.

use std::path::Path;
use tracing::{debug, info};

use partcode_core::catalog::{CatalogSnapshot, LengthPricing, OptionPricing};
use partcode_core::Money;

use crate::error::{CatalogError, CatalogResult};

/// Reads, normalizes and validates a catalog file.
///
/// `.json` files are read as JSON, anything else as TOML.
pub fn load_catalog(path: &Path) -> CatalogResult<CatalogSnapshot> {
    let text = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let mut snapshot: CatalogSnapshot = if is_json {
        serde_json::from_str(&text).map_err(|source| CatalogError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        toml::from_str(&text).map_err(|source| CatalogError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    };

    normalize(&mut snapshot);

    let problems = problems(&snapshot);
    if !problems.is_empty() {
        return Err(CatalogError::InvalidCatalog {
            path: path.to_path_buf(),
            problems,
        });
    }

    info!(
        ?path,
        models = snapshot.models.len(),
        materials = snapshot.materials.len(),
        options = snapshot.options.len(),
        aliases = snapshot.aliases.len(),
        "Loaded catalog file"
    );
    Ok(snapshot)
}

fn canonical(code: &mut String) {
    *code = code.trim().to_uppercase();
}

/// Trims and upper-cases every code so lookups match split fields.
pub fn normalize(snapshot: &mut CatalogSnapshot) {
    for model in &mut snapshot.models {
        canonical(&mut model.code);
        if let Some(insulator) = model.insulator.as_mut() {
            canonical(insulator);
        }
        for adder in &mut model.voltage_adders {
            canonical(&mut adder.voltage);
        }
    }
    for voltage in &mut snapshot.voltages {
        canonical(&mut voltage.code);
    }
    for material in &mut snapshot.materials {
        canonical(&mut material.code);
    }
    for option in &mut snapshot.options {
        canonical(&mut option.code);
    }
    for insulator in &mut snapshot.insulators {
        canonical(&mut insulator.code);
    }
    for connection in &mut snapshot.connections {
        canonical(&mut connection.size);
        canonical(&mut connection.material);
        if let Some(rating) = connection.rating.as_mut() {
            canonical(rating);
        }
    }
    for alias in &mut snapshot.aliases {
        canonical(&mut alias.alias);
        canonical(&mut alias.code);
    }
    debug!("Normalized catalog codes");
}

/// Everything wrong with a snapshot, one message per problem.
pub fn problems(snapshot: &CatalogSnapshot) -> Vec<String> {
    let mut problems = Vec::new();
    let mut amount = |what: String, value: Money| {
        if value.is_negative() {
            problems.push(format!("{what} is negative ({value})"));
        }
    };

    for model in &snapshot.models {
        amount(format!("model {} base_price", model.code), model.base_price);
        for adder in &model.voltage_adders {
            amount(
                format!("model {} voltage adder {}", model.code, adder.voltage),
                adder.adder,
            );
        }
    }
    for material in &snapshot.materials {
        amount(
            format!("material {} base_price_adder", material.code),
            material.base_price_adder,
        );
        amount(
            format!("material {} surcharge", material.code),
            material.nonstandard_length_surcharge,
        );
        match &material.length_pricing {
            LengthPricing::None => {}
            LengthPricing::PerFoot { rate } | LengthPricing::PerInch { rate, .. } => {
                amount(format!("material {} rate", material.code), *rate)
            }
        }
    }
    for option in &snapshot.options {
        match &option.pricing {
            OptionPricing::Fixed { price } => amount(format!("option {} price", option.code), *price),
            OptionPricing::Tiered { tiers } => {
                for tier in tiers {
                    amount(
                        format!("option {} tier at {}\"", option.code, tier.min_length),
                        tier.price,
                    );
                }
            }
        }
    }
    for insulator in &snapshot.insulators {
        amount(
            format!("insulator {} price_adder", insulator.code),
            insulator.price_adder,
        );
        amount(
            format!("insulator {} bracket adder", insulator.code),
            insulator.brackets.first_adder,
        );
        amount(
            format!("insulator {} bracket step", insulator.code),
            insulator.brackets.step,
        );
    }
    for connection in &snapshot.connections {
        amount(
            format!("connection {} price", connection.display()),
            connection.price,
        );
    }

    let codes = snapshot
        .models
        .iter()
        .map(|m| ("model", m.code.as_str()))
        .chain(snapshot.voltages.iter().map(|v| ("voltage", v.code.as_str())))
        .chain(snapshot.materials.iter().map(|m| ("material", m.code.as_str())))
        .chain(snapshot.options.iter().map(|o| ("option", o.code.as_str())))
        .chain(snapshot.insulators.iter().map(|i| ("insulator", i.code.as_str())))
        .chain(snapshot.aliases.iter().map(|a| ("alias", a.alias.as_str())))
        .chain(snapshot.aliases.iter().map(|a| ("alias target", a.code.as_str())));
    for (index, (kind, code)) in codes.enumerate() {
        if code.is_empty() {
            problems.push(format!("{kind} entry #{} has an empty code", index + 1));
        }
    }

    for material in &snapshot.materials {
        for length in &material.standard_lengths {
            if !(length.is_finite() && *length > 0.0) {
                problems.push(format!(
                    "material {} standard length must be positive, got {}",
                    material.code, length
                ));
            }
        }
    }

    for model in &snapshot.models {
        if !(model.base_length.is_finite() && model.base_length > 0.0) {
            problems.push(format!(
                "model {} base_length must be positive, got {}",
                model.code, model.base_length
            ));
        }
    }

    problems
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use partcode_core::catalog::Catalog;
    use std::path::PathBuf;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("partcode-file-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_toml_catalog() {
        let path = scratch_file(
            "catalog.toml",
            r#"
            [[models]]
            code = "ls2000"
            base_price = 47500
            base_length = 10.0
            insulator = "u"

            [[options]]
            code = "xsp"
            name = "Extra Static Protection"
            pricing = { kind = "fixed", price = 3500 }

            [[aliases]]
            section = "model"
            alias = "ls2k"
            code = "ls2000"
            "#,
        );

        let snapshot = load_catalog(&path).unwrap();
        let model = snapshot.model_defaults("LS2000").unwrap();
        assert_eq!(model.base_price, Money::from_dollars(475));
        assert_eq!(model.insulator.as_deref(), Some("U"));
        assert!(snapshot.option_info("XSP").is_some());
        assert_eq!(
            snapshot.alias(partcode_core::Section::Model, "LS2K"),
            Some("LS2000")
        );
    }

    #[test]
    fn test_load_json_catalog() {
        let path = scratch_file(
            "catalog.json",
            r#"{ "materials": [ { "code": "s", "name": "316 Stainless Steel" } ] }"#,
        );
        let snapshot = load_catalog(&path).unwrap();
        assert_eq!(snapshot.materials[0].code, "S");
        assert_eq!(snapshot.materials[0].length_pricing, LengthPricing::None);
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let path = scratch_file(
            "negative.toml",
            r#"
            [[options]]
            code = "VR"
            name = "Vibration Resistance"
            pricing = { kind = "fixed", price = -100 }
            "#,
        );
        match load_catalog(&path) {
            Err(CatalogError::InvalidCatalog { problems, .. }) => {
                assert_eq!(problems.len(), 1);
                assert!(problems[0].contains("option VR price"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_code_rejected() {
        let mut snapshot = CatalogSnapshot::default();
        snapshot.aliases.push(partcode_core::catalog::AliasEntry {
            section: partcode_core::Section::Voltage,
            alias: " ".to_string(),
            code: "115VAC".to_string(),
        });
        normalize(&mut snapshot);
        let problems = problems(&snapshot);
        assert_eq!(problems, vec!["alias entry #1 has an empty code"]);
    }

    #[test]
    fn test_standard_lengths_load_and_validate() {
        let path = scratch_file(
            "stock.toml",
            r#"
            [[materials]]
            code = "H"
            name = "Halar Coated"
            nonstandard_length_surcharge = 30000
            standard_lengths = [10.0, 12.0, -6.0]
            "#,
        );
        match load_catalog(&path) {
            Err(CatalogError::InvalidCatalog { problems, .. }) => {
                assert_eq!(
                    problems,
                    vec!["material H standard length must be positive, got -6"]
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_builtin_catalog_has_no_problems() {
        assert!(problems(&partcode_core::builtin::catalog()).is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_catalog(Path::new("/nonexistent/partcode/catalog.toml")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let path = scratch_file("broken.toml", "[[models]\ncode = ");
        assert!(matches!(
            load_catalog(&path).unwrap_err(),
            CatalogError::Toml { .. }
        ));
    }
}
