//! # Shorthand Resolver
//!
//! Maps model, voltage and material text to canonical catalog codes.
//!
//! ## Resolution Order
//! ```text
//! input ──► exact code? ──yes──► Exact
//!             │ no
//!             ▼
//!           alias?      ──yes──► Alias
//!             │ no
//!             ▼
//!           prefix overlap, exactly one candidate? ──yes──► Prefix
//!             │ no (zero or several)
//!             ▼
//!           Unresolved: input kept verbatim, UnresolvedReference reported
//! ```
//!
//! Ambiguous prefixes never guess. `LS` overlaps every `LS*` model and
//! therefore stays `LS`.

use tracing::debug;

use crate::catalog::Catalog;
use crate::error::UnresolvedReference;
use crate::types::{Resolution, Section};

/// Outcome of resolving one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Canonical code, or the input itself when unresolved.
    pub code: String,
    pub resolution: Resolution,
    /// Prefix candidates seen for an ambiguous input.
    pub candidates: Vec<String>,
}

impl Resolved {
    pub fn is_resolved(&self) -> bool {
        self.resolution != Resolution::Unresolved
    }

    /// The warning payload for an unresolved field.
    pub fn unresolved(&self, section: Section) -> Option<UnresolvedReference> {
        (!self.is_resolved()).then(|| UnresolvedReference {
            section,
            input: self.code.clone(),
            candidates: self.candidates.clone(),
        })
    }
}

/// Resolves shorthand against a catalog.
pub struct ShorthandResolver<'a, C: ?Sized> {
    catalog: &'a C,
}

impl<'a, C: Catalog + ?Sized> ShorthandResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Resolves `input` within `section`. Never fails.
    pub fn resolve(&self, section: Section, input: &str) -> Resolved {
        let input = input.trim();
        let resolved = self.resolve_inner(section, input);
        debug!(
            section = %section,
            input = %input,
            code = %resolved.code,
            resolution = ?resolved.resolution,
            "Resolved field"
        );
        resolved
    }

    /// Exact code or alias only, no prefix heuristic.
    ///
    /// Used for option tokens, where a prefix guess would turn typos into
    /// priced options.
    pub fn resolve_strict(&self, section: Section, input: &str) -> Option<Resolved> {
        if self.catalog.contains(section, input) {
            return Some(Resolved {
                code: input.to_string(),
                resolution: Resolution::Exact,
                candidates: Vec::new(),
            });
        }
        self.catalog.alias(section, input).map(|code| Resolved {
            code: code.to_string(),
            resolution: Resolution::Alias,
            candidates: Vec::new(),
        })
    }

    fn resolve_inner(&self, section: Section, input: &str) -> Resolved {
        if input.is_empty() {
            return unresolved(input, Vec::new());
        }

        if let Some(resolved) = self.resolve_strict(section, input) {
            return resolved;
        }

        let candidates: Vec<String> = self
            .catalog
            .codes(section)
            .into_iter()
            .filter(|code| code.starts_with(input) || input.starts_with(code))
            .map(str::to_string)
            .collect();

        match candidates.as_slice() {
            [only] => Resolved {
                code: only.clone(),
                resolution: Resolution::Prefix,
                candidates: Vec::new(),
            },
            _ => unresolved(input, candidates),
        }
    }
}

fn unresolved(input: &str, candidates: Vec<String>) -> Resolved {
    Resolved {
        code: input.to_string(),
        resolution: Resolution::Unresolved,
        candidates,
    }
}

/// Parses a probe length such as `10"`, `12.5"` or `36'`.
///
/// Inch and foot marks are stripped, not interpreted. Returns `None` unless
/// the value is finite and positive.
pub fn parse_length(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '"' && *c != '\'').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    #[test]
    fn test_exact_match() {
        let catalog = builtin::catalog();
        let resolver = ShorthandResolver::new(&catalog);
        let r = resolver.resolve(Section::Model, "LS2000");
        assert_eq!(r.code, "LS2000");
        assert_eq!(r.resolution, Resolution::Exact);
    }

    #[test]
    fn test_alias_match() {
        let catalog = builtin::catalog();
        let resolver = ShorthandResolver::new(&catalog);

        let r = resolver.resolve(Section::Model, "LS2");
        assert_eq!(r.code, "LS2000");
        assert_eq!(r.resolution, Resolution::Alias);

        assert_eq!(resolver.resolve(Section::Voltage, "115").code, "115VAC");
        assert_eq!(resolver.resolve(Section::Voltage, "110").code, "115VAC");
        assert_eq!(resolver.resolve(Section::Material, "HALAR").code, "H");
        assert_eq!(resolver.resolve(Section::Material, "2").code, "S");
    }

    #[test]
    fn test_unique_prefix_match() {
        let catalog = builtin::catalog();
        let resolver = ShorthandResolver::new(&catalog);

        let r = resolver.resolve(Section::Voltage, "115V");
        assert_eq!(r.code, "115VAC");
        assert_eq!(r.resolution, Resolution::Prefix);

        let r = resolver.resolve(Section::Model, "LT");
        assert_eq!(r.code, "LT9000");
        assert_eq!(r.resolution, Resolution::Prefix);
    }

    #[test]
    fn test_ambiguous_prefix_stays_unresolved() {
        let catalog = builtin::catalog();
        let resolver = ShorthandResolver::new(&catalog);

        let r = resolver.resolve(Section::Model, "LS");
        assert_eq!(r.code, "LS");
        assert_eq!(r.resolution, Resolution::Unresolved);
        assert!(r.candidates.len() > 1);

        let warning = r.unresolved(Section::Model).unwrap();
        assert!(warning.to_string().contains("'LS'"));
    }

    #[test]
    fn test_unknown_passes_through() {
        let catalog = builtin::catalog();
        let resolver = ShorthandResolver::new(&catalog);

        let r = resolver.resolve(Section::Voltage, "999V");
        assert_eq!(r.code, "999V");
        assert!(!r.is_resolved());
        assert!(r.candidates.is_empty());

        let r = resolver.resolve(Section::Material, "");
        assert_eq!(r.code, "");
        assert!(!r.is_resolved());
    }

    #[test]
    fn test_strict_ignores_prefixes() {
        let catalog = builtin::catalog();
        let resolver = ShorthandResolver::new(&catalog);

        assert!(resolver.resolve_strict(Section::Option, "XS").is_none());
        let r = resolver.resolve_strict(Section::Option, "SSHSE").unwrap();
        assert_eq!(r.code, "SSHOUSING");
        assert_eq!(r.resolution, Resolution::Alias);
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("10\""), Some(10.0));
        assert_eq!(parse_length("12.5\""), Some(12.5));
        assert_eq!(parse_length("36'"), Some(36.0));
        assert_eq!(parse_length("36"), Some(36.0));
        assert_eq!(parse_length("ABC\""), None);
        assert_eq!(parse_length("0\""), None);
        assert_eq!(parse_length("-5\""), None);
        assert_eq!(parse_length("NAN"), None);
        assert_eq!(parse_length("INF"), None);
    }
}
