//! # Material Rules
//!
//! Cross-field business rules as data.
//!
//! ```text
//! MaterialRule
//! ├── trigger: material == "H" && no explicit insulator material
//! └── effects: [SetInsulator("TEF"), Warn("Halar coating: ...")]
//! ```
//!
//! Rules live in `ParserConfig::rules`, so a settings file can add one
//! without touching the pipeline. They run once, after the positional fields
//! are resolved and model defaults merged, and before a length-only
//! insulator (`6"INS`) takes its material from the default insulator.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// When a rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTrigger {
    /// Canonical probe material code.
    pub material: String,
    /// Skip the rule when the code names an insulator material explicitly
    /// (`8"TEFINS`). A length-only `6"INS` does not count.
    #[serde(default)]
    pub unless_explicit_insulator: bool,
}

/// What a fired rule does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEffect {
    /// Replace the default insulator material.
    SetInsulator(String),
    /// Append a warning.
    Warn(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRule {
    pub name: String,
    pub trigger: RuleTrigger,
    pub effects: Vec<RuleEffect>,
}

impl MaterialRule {
    pub fn matches(&self, material: &str, explicit_insulator: bool) -> bool {
        self.trigger.material == material
            && !(self.trigger.unless_explicit_insulator && explicit_insulator)
    }
}

/// Result of applying the rule table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    /// New default insulator, when a rule set one. Last one wins.
    pub insulator: Option<String>,
    pub warnings: Vec<String>,
    /// Names of the rules that fired, in table order.
    pub fired: Vec<String>,
}

/// Applies a rule table.
pub struct RuleApplier<'a> {
    rules: &'a [MaterialRule],
}

impl<'a> RuleApplier<'a> {
    pub fn new(rules: &'a [MaterialRule]) -> Self {
        Self { rules }
    }

    pub fn apply(&self, material: &str, explicit_insulator: bool) -> RuleOutcome {
        let mut outcome = RuleOutcome::default();

        for rule in self
            .rules
            .iter()
            .filter(|r| r.matches(material, explicit_insulator))
        {
            debug!(rule = %rule.name, material = %material, "Material rule fired");
            for effect in &rule.effects {
                match effect {
                    RuleEffect::SetInsulator(code) => outcome.insulator = Some(code.clone()),
                    RuleEffect::Warn(message) => outcome.warnings.push(message.clone()),
                }
            }
            outcome.fired.push(rule.name.clone());
        }

        outcome
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
