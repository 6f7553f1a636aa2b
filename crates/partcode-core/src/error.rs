//! # Error Types
//!
//! Domain-specific error types for partcode-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  partcode-core errors (this file)                                      │
//! │  ├── CoreError            - Fatal: the code cannot be parsed at all    │
//! │  ├── UnresolvedReference  - Shorthand passthrough → warning            │
//! │  ├── PricingError         - Zeroed component + note + warning          │
//! │  ├── CompatibilityError   - Blocking → errors                          │
//! │  └── CompatibilityWarning - Advisory → warnings                        │
//! │                                                                         │
//! │  partcode-catalog errors (separate crate)                              │
//! │  └── CatalogError         - Catalog/settings file failures             │
//! │                                                                         │
//! │  Only CoreError ever leaves QuoteParser::parse as an Err.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending code or token in the message
//! 3. Non-fatal errors are rendered with `to_string()` into the result's
//!    `warnings` / `errors` sequences

use thiserror::Error;

use crate::types::Section;

// =============================================================================
// Core Error
// =============================================================================

/// Fatal parse errors.
///
/// ## When This Occurs
/// ```text
/// "LS2000-115VAC-S"  ──► split ──► 3 fields ──► InvalidFormat { found: 3 }
/// "   "              ──► trim  ──► empty    ──► EmptyCode
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The input was empty after trimming.
    #[error("Part number is empty")]
    EmptyCode,

    /// Fewer than the four positional fields were present.
    #[error("Invalid part number format '{code}': expected at least 4 fields, found {found}")]
    InvalidFormat { code: String, found: usize },
}

// =============================================================================
// Unresolved Reference
// =============================================================================

/// A positional field that matched no canonical code, alias or unique prefix.
///
/// The literal input is kept; this only feeds a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized {section} '{input}'{}", candidates_suffix(.candidates))]
pub struct UnresolvedReference {
    pub section: Section,
    pub input: String,
    /// Prefix candidates when the match was ambiguous.
    pub candidates: Vec<String>,
}

fn candidates_suffix(candidates: &[String]) -> String {
    if candidates.is_empty() {
        String::new()
    } else {
        format!(" (ambiguous: {})", candidates.join(", "))
    }
}

// =============================================================================
// Pricing Error
// =============================================================================

/// Failure of a single pricing sub-step.
///
/// The accumulator zeroes the failing component and continues with the rest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("model '{0}' not found in catalog")]
    ModelNotFound(String),

    #[error("material '{0}' not found in catalog")]
    MaterialNotFound(String),

    #[error("option '{0}' has no catalog price")]
    OptionNotFound(String),

    #[error("insulator '{0}' not found in catalog")]
    InsulatorNotFound(String),

    #[error("no {material} connection priced for {display}")]
    ConnectionNotFound { display: String, material: String },

    #[error("negative catalog amount for {what}")]
    NegativeAmount { what: String },

    #[error("arithmetic overflow while pricing {what}")]
    Overflow { what: String },
}

// =============================================================================
// Compatibility
// =============================================================================

/// Blocking compatibility violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompatibilityError {
    #[error("Material {material} is not compatible with model {model}")]
    MaterialNotAllowed { model: String, material: String },

    #[error("Voltage {voltage} is not available for model {model}")]
    VoltageNotAllowed { model: String, voltage: String },

    #[error("Option {option} is not available for model {model}")]
    OptionNotAvailable { model: String, option: String },

    #[error("Option {first} cannot be combined with {second}")]
    OptionsExclusive { first: String, second: String },

    #[error("Probe length {length}\" is outside the allowed range {min}\" to {max}\"")]
    LengthOutOfRange { length: f64, min: f64, max: f64 },
}

/// Advisory compatibility findings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompatibilityWarning {
    /// A material used beyond its recommended length.
    #[error("{material_name} probes over {max}\" are not recommended ({length}\" requested){}", suggestion_suffix(.suggestion))]
    LengthLimit {
        material_name: String,
        length: f64,
        max: f64,
        suggestion: Option<String>,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(", consider {s}"),
        None => String::new(),
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result of a single pricing sub-step.
pub type PricingResult<T> = Result<T, PricingError>;

// =============================================================================
// Unit Tests
// =============================================================================
