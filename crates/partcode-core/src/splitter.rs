//! # Field Splitter
//!
//! Breaks a code into its four positional fields and the trailing modifiers.
//!
//! ```text
//! LS2000-115VAC-S-10"-XSP-VR-8"TEFINS
//! └─┬──┘ └─┬──┘ │ └┬┘ └──────┬──────┘
//!  model voltage│ length   modifiers (unordered)
//!            material
//! ```
//!
//! This is the only stage that can fail the whole parse.

use crate::error::{CoreError, CoreResult};

/// Field delimiter.
pub const FIELD_SEPARATOR: char = '-';

/// Number of positional fields every code starts with.
pub const POSITIONAL_FIELDS: usize = 4;

/// A code split into fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitCode {
    /// Trimmed, upper-cased working copy.
    pub normalized: String,
    pub model: String,
    pub voltage: String,
    pub material: String,
    pub length: String,
    /// Remaining fields in input order, empty ones dropped.
    pub modifiers: Vec<String>,
}

/// Splits `raw` on [`FIELD_SEPARATOR`].
///
/// ## Example
/// ```rust
/// use partcode_core::splitter::split;
///
/// let parts = split(" ls2000-115vac-s-10\"-xsp ").unwrap();
/// assert_eq!(parts.model, "LS2000");
/// assert_eq!(parts.modifiers, vec!["XSP"]);
///
/// assert!(split("LS2000-115VAC-S").is_err());
/// ```
pub fn split(raw: &str) -> CoreResult<SplitCode> {
    let normalized = raw.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(CoreError::EmptyCode);
    }

    let fields: Vec<&str> = normalized.split(FIELD_SEPARATOR).map(str::trim).collect();
    if fields.len() < POSITIONAL_FIELDS {
        return Err(CoreError::InvalidFormat {
            code: normalized.clone(),
            found: fields.len(),
        });
    }

    let modifiers = fields[POSITIONAL_FIELDS..]
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| f.to_string())
        .collect();

    Ok(SplitCode {
        model: fields[0].to_string(),
        voltage: fields[1].to_string(),
        material: fields[2].to_string(),
        length: fields[3].to_string(),
        modifiers,
        normalized,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
