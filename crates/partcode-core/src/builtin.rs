//! # Built-in Catalog
//!
//! Compiled-in reference data. Used as the fallback tier of a
//! [`LayeredCatalog`](crate::catalog::LayeredCatalog) so a parser works with
//! no catalog file at all, and as the default rule tables of
//! [`ParserConfig`](crate::config::ParserConfig).

use crate::catalog::{
    AliasEntry, BracketSchedule, CatalogSnapshot, ConnectionInfo, InsulatorInfo, LengthPricing,
    MaterialInfo, ModelDefaults, OptionInfo, OptionPricing, PriceTier, VoltageAdder, VoltageInfo,
};
use crate::compatibility::{CompatibilityRules, ExclusivePair, LengthCeiling, OptionScope};
use crate::money::Money;
use crate::rules::{MaterialRule, RuleEffect, RuleTrigger};
use crate::types::{ConnectionKind, DefaultConnection, Section};

/// Material of every built-in process connection.
pub const CONNECTION_MATERIAL: &str = "316SS";

const HOUSING_ALUMINUM_NEMA7_9: &str = "Cast Aluminum, NEMA 7, C, D; NEMA 9, E, F, & G";
const HOUSING_EXPLOSION_PROOF: &str = "Cast Aluminum, Explosion Proof";
const HOUSING_ALUMINUM_NEMA7: &str = "Cast Aluminum, NEMA 7, D";

/// Halar probe lengths that carry no nonstandard length surcharge, inches.
pub const HALAR_STANDARD_LENGTHS: [f64; 10] =
    [10.0, 12.0, 18.0, 24.0, 36.0, 48.0, 60.0, 72.0, 84.0, 96.0];

// =============================================================================
// Catalog
// =============================================================================

/// The compiled-in catalog snapshot.
pub fn catalog() -> CatalogSnapshot {
    CatalogSnapshot {
        models: models(),
        voltages: ["115VAC", "24VDC", "230VAC", "240VAC", "12VDC"]
            .into_iter()
            .map(|code| VoltageInfo {
                code: code.to_string(),
                name: None,
            })
            .collect(),
        materials: materials(),
        options: options(),
        insulators: insulators(),
        connections: connections(),
        aliases: aliases(),
    }
}

#[allow(clippy::too_many_arguments)]
fn model(
    code: &str,
    base_price: i64,
    base_length: f64,
    connection_size: &str,
    insulator: &str,
    housing: &str,
    output: &str,
    max_pressure: u32,
    max_temperature: u32,
) -> ModelDefaults {
    ModelDefaults {
        code: code.to_string(),
        name: None,
        base_price: Money::from_dollars(base_price),
        base_length,
        connection: Some(DefaultConnection {
            kind: ConnectionKind::Threaded,
            size: connection_size.to_string(),
            material: CONNECTION_MATERIAL.to_string(),
        }),
        insulator: Some(insulator.to_string()),
        housing: Some(housing.to_string()),
        output: Some(output.to_string()),
        probe_diameter: Some("½\"".to_string()),
        max_pressure: Some(max_pressure),
        max_temperature: Some(max_temperature),
        voltage_adders: Vec::new(),
    }
}

fn models() -> Vec<ModelDefaults> {
    let relay_dpdt = "2 Form C contacts 5 Amp DPDT";
    let mut ls6000 = model(
        "LS6000",
        625,
        10.0,
        "1\"",
        "DEL",
        HOUSING_EXPLOSION_PROOF,
        "5 Amp DPDT Relay",
        1500,
        250,
    );
    ls6000.voltage_adders.push(VoltageAdder {
        voltage: "240VAC".to_string(),
        adder: Money::from_dollars(25),
    });

    vec![
        model(
            "LS2000",
            455,
            10.0,
            "3/4\"",
            "U",
            HOUSING_ALUMINUM_NEMA7_9,
            "10 Amp SPDT Relay",
            300,
            180,
        ),
        model(
            "LS2100",
            555,
            10.0,
            "3/4\"",
            "TEF",
            HOUSING_ALUMINUM_NEMA7_9,
            "8mA-16mA Loop",
            300,
            450,
        ),
        ls6000,
        model("LS7000", 750, 10.0, "1\"", "TEF", HOUSING_ALUMINUM_NEMA7, relay_dpdt, 1500, 450),
        model("LS7000/2", 850, 10.0, "1\"", "TEF", HOUSING_ALUMINUM_NEMA7, relay_dpdt, 1500, 450),
        model("LS8000", 950, 10.0, "1\"", "TEF", HOUSING_ALUMINUM_NEMA7, relay_dpdt, 1500, 450),
        model("LS8000/2", 1050, 10.0, "1\"", "TEF", HOUSING_ALUMINUM_NEMA7, relay_dpdt, 1500, 450),
        model("LT9000", 1250, 10.0, "1\"", "TEF", HOUSING_ALUMINUM_NEMA7, "4-20mA Loop", 1500, 450),
        model("FS10000", 1400, 6.0, "3/4\"", "U", HOUSING_EXPLOSION_PROOF, "4-20mA Loop", 300, 180),
        model("LS7500FR", 900, 10.0, "1\"", "TEF", HOUSING_ALUMINUM_NEMA7, relay_dpdt, 1500, 450),
        model("LS8500FR", 1100, 10.0, "1\"", "TEF", HOUSING_ALUMINUM_NEMA7, relay_dpdt, 1500, 450),
    ]
}

fn materials() -> Vec<MaterialInfo> {
    let per_foot = |rate| LengthPricing::PerFoot {
        rate: Money::from_dollars(rate),
    };
    let per_inch = |rate| LengthPricing::PerInch {
        rate: Money::from_dollars(rate),
        base_length: 4.0,
    };
    let material = |code: &str, name: &str, adder, length_pricing, surcharge| MaterialInfo {
        code: code.to_string(),
        name: name.to_string(),
        base_price_adder: Money::from_dollars(adder),
        length_pricing,
        nonstandard_length_surcharge: Money::from_dollars(surcharge),
        standard_lengths: Vec::new(),
    };

    // Halar is coated in stock lengths; anything else is a custom run.
    let mut halar = material("H", "Halar Coated", 110, per_foot(110), 300);
    halar.standard_lengths = HALAR_STANDARD_LENGTHS.to_vec();

    vec![
        material("S", "316 Stainless Steel", 0, per_foot(45), 0),
        halar,
        material("TS", "Teflon Sleeve", 110, per_foot(110), 300),
        material("U", "UHMWPE Blind End", 20, per_inch(40), 0),
        material("T", "Teflon Blind End", 40, per_inch(50), 0),
        material("C", "Ceramic", 0, LengthPricing::None, 0),
        material("CPVC", "CPVC Blind End", 400, per_inch(50), 0),
    ]
}

fn options() -> Vec<OptionInfo> {
    let fixed = |code: &str, name: &str, price| OptionInfo {
        code: code.to_string(),
        name: name.to_string(),
        pricing: OptionPricing::Fixed {
            price: Money::from_dollars(price),
        },
    };
    let tier = |min_length, price| PriceTier {
        min_length,
        price: Money::from_dollars(price),
    };

    vec![
        fixed("XSP", "Extra Static Protection", 30),
        fixed("VR", "Vibration Resistance", 50),
        OptionInfo {
            code: "CP".to_string(),
            name: "Cable Probe".to_string(),
            pricing: OptionPricing::Tiered {
                tiers: vec![tier(0.0, 150), tier(48.0, 225), tier(96.0, 300)],
            },
        },
        fixed("SSTAG", "Stainless Steel Tag", 35),
        fixed("SSHOUSING", "Stainless Steel Housing", 285),
        fixed("VRHOUSING", "Epoxy Housing", 285),
        // Priced by the diameter rule, this entry only supplies the name.
        fixed("3/4\"OD", "3/4\" Diameter Probe", 175),
    ]
}

fn insulators() -> Vec<InsulatorInfo> {
    let insulator = |code: &str, name: &str, adder, max_temperature| InsulatorInfo {
        code: code.to_string(),
        name: name.to_string(),
        price_adder: Money::from_dollars(adder),
        max_temperature: Some(max_temperature),
        brackets: BracketSchedule::default(),
    };

    vec![
        insulator("TEF", "Teflon", 40, 450),
        insulator("U", "UHMWPE", 0, 180),
        insulator("UHMWPE", "UHMWPE", 0, 180),
        insulator("DEL", "Delrin", 0, 250),
        insulator("PEEK", "PEEK", 120, 550),
        insulator("CER", "Ceramic", 200, 800),
    ]
}

fn connections() -> Vec<ConnectionInfo> {
    let conn = |kind, size: &str, rating: Option<&str>, price| ConnectionInfo {
        kind,
        size: size.to_string(),
        material: CONNECTION_MATERIAL.to_string(),
        rating: rating.map(str::to_string),
        price: Money::from_dollars(price),
    };

    vec![
        conn(ConnectionKind::Threaded, "1/2\"", None, 25),
        conn(ConnectionKind::Threaded, "3/4\"", None, 0),
        conn(ConnectionKind::Threaded, "1\"", None, 0),
        conn(ConnectionKind::Threaded, "2\"", None, 75),
        conn(ConnectionKind::Flanged, "1\"", Some("150#"), 200),
        conn(ConnectionKind::Flanged, "2\"", Some("150#"), 250),
        conn(ConnectionKind::Flanged, "3\"", Some("150#"), 350),
        conn(ConnectionKind::Flanged, "2\"", Some("300#"), 325),
        conn(ConnectionKind::TriClamp, "2\"", None, 125),
        conn(ConnectionKind::TriClamp, "3\"", None, 175),
    ]
}

fn aliases() -> Vec<AliasEntry> {
    let table: &[(Section, &[(&str, &str)])] = &[
        (
            Section::Model,
            &[
                ("LS2", "LS2000"),
                ("LS21", "LS2100"),
                ("LS6", "LS6000"),
                ("LS7", "LS7000"),
                ("LS72", "LS7000/2"),
                ("LS8", "LS8000"),
                ("LS82", "LS8000/2"),
                ("LS75", "LS7500FR"),
                ("LS85", "LS8500FR"),
                ("LT9", "LT9000"),
                ("FS10", "FS10000"),
                ("FS1", "FS10000"),
            ],
        ),
        (
            Section::Voltage,
            &[
                ("115", "115VAC"),
                ("24", "24VDC"),
                ("230", "230VAC"),
                ("240", "240VAC"),
                ("12", "12VDC"),
                ("112", "115VAC"),
                ("110", "115VAC"),
            ],
        ),
        (
            Section::Material,
            &[
                ("STAINLESS", "S"),
                ("STEEL", "S"),
                ("2", "S"),
                ("1", "S"),
                ("HALAR", "H"),
                ("TEFLON", "T"),
                ("UHMW", "U"),
                ("UHMWPE", "U"),
                ("CERAMIC", "C"),
            ],
        ),
        (
            Section::Option,
            &[
                ("3/4\"ROD", "3/4\"OD"),
                ("SSHSE", "SSHOUSING"),
                ("VRHSE", "VRHOUSING"),
            ],
        ),
    ];

    table
        .iter()
        .flat_map(|(section, pairs)| {
            pairs.iter().map(move |(alias, code)| AliasEntry {
                section: *section,
                alias: alias.to_string(),
                code: code.to_string(),
            })
        })
        .collect()
}

// =============================================================================
// Rule Tables
// =============================================================================

/// Default cross-field material rules.
pub fn material_rules() -> Vec<MaterialRule> {
    vec![MaterialRule {
        name: "halar-forces-teflon".to_string(),
        trigger: RuleTrigger {
            material: "H".to_string(),
            unless_explicit_insulator: true,
        },
        effects: vec![
            RuleEffect::SetInsulator("TEF".to_string()),
            RuleEffect::Warn("Halar coating: Insulator automatically changed to Teflon".to_string()),
        ],
    }]
}

/// Default compatibility tables.
pub fn compatibility_rules() -> CompatibilityRules {
    let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let four_voltages = ["115VAC", "12VDC", "24VDC", "240VAC"];

    let materials: &[(&str, &[&str])] = &[
        ("LS2000", &["S", "H", "U", "T", "TS"]),
        ("LS2100", &["S", "H", "TS"]),
        ("LS6000", &["S", "H", "TS", "CPVC"]),
        ("LS7000", &["S", "H", "TS", "CPVC"]),
        ("LS7000/2", &["H", "TS"]),
        ("LS8000", &["S", "H", "TS"]),
        ("LS8000/2", &["H", "S", "TS"]),
        ("LT9000", &["H", "TS"]),
        ("FS10000", &["S"]),
    ];
    let voltages: &[(&str, &[&str])] = &[
        ("LS2000", &["115VAC", "24VDC"]),
        ("LS2100", &["24VDC"]),
        ("LS6000", &four_voltages),
        ("LS7000", &four_voltages),
        ("LS7000/2", &four_voltages),
        ("LS8000", &four_voltages),
        ("LS8000/2", &four_voltages),
        ("LT9000", &["115VAC", "24VDC", "230VAC"]),
        ("FS10000", &four_voltages),
    ];

    CompatibilityRules {
        model_materials: materials
            .iter()
            .map(|(m, allowed)| (m.to_string(), set(allowed)))
            .collect(),
        model_voltages: voltages
            .iter()
            .map(|(m, allowed)| (m.to_string(), set(allowed)))
            .collect(),
        option_models: vec![
            OptionScope {
                option: "XSP".to_string(),
                models: set(&["LS2000"]),
            },
            OptionScope {
                option: "SSHOUSING".to_string(),
                models: set(&["LS7000"]),
            },
        ],
        exclusive_options: vec![ExclusivePair {
            option: "CP".to_string(),
            excludes_bend: true,
            excludes: Vec::new(),
        }],
        length_ceilings: vec![LengthCeiling {
            material: "H".to_string(),
            max_length: 72.0,
            suggestion: Some("Teflon Sleeve (TS)".to_string()),
        }],
        min_probe_length: 1.0,
        max_probe_length: 120.0,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
