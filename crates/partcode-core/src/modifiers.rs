//! # Modifier Classifier
//!
//! Every field after the fourth is a modifier. Each one is tried against the
//! sub-grammars in a fixed order and the first match wins.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  token            grammar               result                       │
//! │  ──────────────   ───────────────────   ──────────────────────────   │
//! │  8"TEFINS         <dec>"<letters>INS    Insulator (material TEF)     │
//! │  6"INS            <dec>"INS             Insulator (length only)      │
//! │  90DEG            <int>DEG, 0..=180     Bend option                  │
//! │  XSP / SSHSE      option code or alias  Option                       │
//! │  1"NPT            <size>"NPT            Connection (threaded)        │
//! │  2"150#RF         <size>"<rating>#RF    Connection (flanged)         │
//! │  2"TC             <size>"TC             Connection (tri-clamp)       │
//! │  SS               housing literal       Housing + option             │
//! │  anything else                          Unknown (warning only)       │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The grammar functions are independent of the catalog and each other.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::resolver::ShorthandResolver;
use crate::types::{ConnectionKind, ConnectionOverride, InsulatorSpec, QuoteOption, Section};

static INSULATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\d+(?:\.\d+)?)"([A-Z]+)?INS$"#).unwrap());

static BEND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)DEG$").unwrap());

static NPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\d+(?:[./]\d+)?)"NPT$"#).unwrap());

static FLANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\d+(?:[./]\d+)?)"(\d+)#RF$"#).unwrap());

static TRI_CLAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\d+(?:[./]\d+)?)"TC$"#).unwrap());

/// Largest accepted bend angle in degrees.
pub const MAX_BEND_DEGREES: u32 = 180;

const INSULATOR_SUFFIX: &str = "INS";
const BEND_SUFFIX: &str = "DEG";
const CONNECTION_MARKERS: [&str; 3] = ["NPT", "RF", "TC"];

// =============================================================================
// Sub-grammars
// =============================================================================

/// Payload of an insulator token.
#[derive(Debug, Clone, PartialEq)]
pub struct InsulatorToken {
    pub length: f64,
    pub material: Option<String>,
}

/// `<decimal>"<letters?>INS`.
pub fn parse_insulator(token: &str) -> Option<InsulatorToken> {
    let caps = INSULATOR_RE.captures(token)?;
    let length: f64 = caps[1].parse().ok()?;
    Some(InsulatorToken {
        length,
        material: caps.get(2).map(|m| m.as_str().to_string()),
    })
}

/// `<int>DEG` within `0..=180`.
pub fn parse_bend_angle(token: &str) -> Option<u32> {
    let caps = BEND_RE.captures(token)?;
    caps[1]
        .parse::<u32>()
        .ok()
        .filter(|deg| *deg <= MAX_BEND_DEGREES)
}

/// `<size>"NPT`, `<size>"<rating>#RF` or `<size>"TC`.
pub fn parse_connection(token: &str) -> Option<ConnectionOverride> {
    if let Some(caps) = NPT_RE.captures(token) {
        let size = format!("{}\"", &caps[1]);
        return Some(ConnectionOverride {
            kind: ConnectionKind::Threaded,
            display: format!("{size}NPT"),
            size,
            rating: None,
        });
    }

    if let Some(caps) = FLANGE_RE.captures(token) {
        let size = format!("{}\"", &caps[1]);
        let rating = format!("{}#", &caps[2]);
        return Some(ConnectionOverride {
            kind: ConnectionKind::Flanged,
            display: format!("{size}{rating}RF"),
            size,
            rating: Some(rating),
        });
    }

    TRI_CLAMP_RE.captures(token).map(|caps| {
        let size = format!("{}\"", &caps[1]);
        ConnectionOverride {
            kind: ConnectionKind::TriClamp,
            display: format!("{size}TC"),
            size,
            rating: None,
        }
    })
}

fn looks_like_connection(token: &str) -> bool {
    CONNECTION_MARKERS.iter().any(|m| token.contains(m))
}

// =============================================================================
// Housing Tokens
// =============================================================================

/// A literal modifier that overrides the housing and adds an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousingToken {
    pub token: String,
    pub option_code: String,
    pub housing: String,
}

impl HousingToken {
    /// `SS`: stainless steel NEMA 4X housing.
    pub fn stainless() -> Self {
        Self {
            token: "SS".to_string(),
            option_code: "SSHOUSING".to_string(),
            housing: "Stainless Steel, NEMA 4X".to_string(),
        }
    }
}

// =============================================================================
// Classifier
// =============================================================================

/// Classification of one modifier token.
#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    /// Insulator spec; `known` is false when the material is not in the
    /// catalog (the code is kept).
    Insulator { spec: InsulatorSpec, known: bool },
    MalformedInsulator(String),
    Bend(QuoteOption),
    InvalidBend(String),
    Option(QuoteOption),
    Connection(ConnectionOverride),
    /// Connection marker present but no sub-form matched.
    MalformedConnection(ConnectionOverride),
    Housing { housing: String, option: QuoteOption },
    Unknown(String),
}

impl Modifier {
    /// The warning this classification contributes, if any.
    pub fn warning(&self) -> Option<String> {
        match self {
            Modifier::Insulator { spec, known: false } => Some(format!(
                "Unknown insulator material: {}",
                spec.material.as_deref().unwrap_or_default()
            )),
            Modifier::MalformedInsulator(token) => {
                Some(format!("Invalid insulator format: {token}"))
            }
            Modifier::InvalidBend(token) => Some(format!("Invalid bent probe format: {token}")),
            Modifier::MalformedConnection(conn) => {
                Some(format!("Unrecognized process connection: {}", conn.display))
            }
            Modifier::Unknown(token) => Some(format!("Unknown option or modifier: {token}")),
            _ => None,
        }
    }
}

/// Classifies modifier tokens against a catalog and the configured
/// housing literals.
pub struct ModifierClassifier<'a, C: ?Sized> {
    catalog: &'a C,
    housing_tokens: &'a [HousingToken],
}

impl<'a, C: Catalog + ?Sized> ModifierClassifier<'a, C> {
    pub fn new(catalog: &'a C, housing_tokens: &'a [HousingToken]) -> Self {
        Self {
            catalog,
            housing_tokens,
        }
    }

    pub fn classify(&self, token: &str) -> Modifier {
        let modifier = self.classify_inner(token);
        debug!(token = %token, modifier = ?modifier, "Classified modifier");
        modifier
    }

    fn classify_inner(&self, token: &str) -> Modifier {
        if token.ends_with(INSULATOR_SUFFIX) {
            return match parse_insulator(token) {
                Some(parsed) => self.insulator(parsed),
                None => Modifier::MalformedInsulator(token.to_string()),
            };
        }

        if token.ends_with(BEND_SUFFIX) {
            return match parse_bend_angle(token) {
                Some(degrees) => Modifier::Bend(QuoteOption::bend(degrees)),
                None => Modifier::InvalidBend(token.to_string()),
            };
        }

        let resolver = ShorthandResolver::new(self.catalog);
        if let Some(resolved) = resolver.resolve_strict(Section::Option, token) {
            let mut option = self.option(&resolved.code);
            if resolved.code != token {
                option.alias_of = Some(token.to_string());
            }
            if let Some(housing) = self
                .housing_tokens
                .iter()
                .find(|h| h.option_code == option.code)
            {
                return Modifier::Housing {
                    housing: housing.housing.clone(),
                    option,
                };
            }
            return Modifier::Option(option);
        }

        if looks_like_connection(token) {
            return match parse_connection(token) {
                Some(conn) => Modifier::Connection(conn),
                None => Modifier::MalformedConnection(ConnectionOverride {
                    kind: ConnectionKind::Unknown,
                    size: String::new(),
                    rating: None,
                    display: token.to_string(),
                }),
            };
        }

        if let Some(housing) = self.housing_tokens.iter().find(|h| h.token == token) {
            return Modifier::Housing {
                housing: housing.housing.clone(),
                option: self.option(&housing.option_code),
            };
        }

        Modifier::Unknown(token.to_string())
    }

    fn option(&self, code: &str) -> QuoteOption {
        let name = self
            .catalog
            .option_info(code)
            .map(|info| info.name.clone())
            .unwrap_or_else(|| code.to_string());
        QuoteOption::new(code, name)
    }

    fn insulator(&self, parsed: InsulatorToken) -> Modifier {
        let Some(material) = parsed.material else {
            return Modifier::Insulator {
                spec: InsulatorSpec {
                    length: parsed.length,
                    material: None,
                    material_name: None,
                    base_length: 0.0,
                    length_only: true,
                },
                known: true,
            };
        };

        let info = self.catalog.insulator_info(&material);
        let material_name = info
            .map(|i| i.name.clone())
            .unwrap_or_else(|| format!("Unknown ({material})"));
        Modifier::Insulator {
            spec: InsulatorSpec {
                length: parsed.length,
                material: Some(material),
                material_name: Some(material_name),
                base_length: 0.0,
                length_only: false,
            },
            known: info.is_some(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    #[test]
    fn test_parse_insulator() {
        assert_eq!(
            parse_insulator("8\"TEFINS"),
            Some(InsulatorToken {
                length: 8.0,
                material: Some("TEF".to_string())
            })
        );
        assert_eq!(
            parse_insulator("6.5\"INS"),
            Some(InsulatorToken {
                length: 6.5,
                material: None
            })
        );
        assert_eq!(parse_insulator("TEFINS"), None);
        assert_eq!(parse_insulator("8TEFINS"), None);
    }

    #[test]
    fn test_parse_bend_angle() {
        assert_eq!(parse_bend_angle("90DEG"), Some(90));
        assert_eq!(parse_bend_angle("0DEG"), Some(0));
        assert_eq!(parse_bend_angle("180DEG"), Some(180));
        assert_eq!(parse_bend_angle("181DEG"), None);
        assert_eq!(parse_bend_angle("XDEG"), None);
        assert_eq!(parse_bend_angle("99999999999DEG"), None);
    }

    #[test]
    fn test_parse_connection_forms() {
        let npt = parse_connection("1\"NPT").unwrap();
        assert_eq!(npt.kind, ConnectionKind::Threaded);
        assert_eq!(npt.size, "1\"");
        assert_eq!(npt.display, "1\"NPT");

        let half = parse_connection("1/2\"NPT").unwrap();
        assert_eq!(half.size, "1/2\"");

        let flange = parse_connection("2\"150#RF").unwrap();
        assert_eq!(flange.kind, ConnectionKind::Flanged);
        assert_eq!(flange.rating.as_deref(), Some("150#"));
        assert_eq!(flange.display, "2\"150#RF");

        let tc = parse_connection("2\"TC").unwrap();
        assert_eq!(tc.kind, ConnectionKind::TriClamp);

        assert!(parse_connection("2NPT").is_none());
        assert!(parse_connection("2\"RF").is_none());
    }

    #[test]
    fn test_classify_priority() {
        let catalog = builtin::catalog();
        let housing = vec![HousingToken::stainless()];
        let classifier = ModifierClassifier::new(&catalog, &housing);

        assert!(matches!(
            classifier.classify("8\"TEFINS"),
            Modifier::Insulator { known: true, .. }
        ));
        assert!(matches!(classifier.classify("45DEG"), Modifier::Bend(_)));
        assert!(matches!(classifier.classify("XSP"), Modifier::Option(_)));
        assert!(matches!(
            classifier.classify("2\"150#RF"),
            Modifier::Connection(_)
        ));
        assert!(matches!(classifier.classify("SS"), Modifier::Housing { .. }));
        assert!(matches!(
            classifier.classify("INVALIDXYZ"),
            Modifier::Unknown(_)
        ));
    }

    #[test]
    fn test_classify_option_alias() {
        let catalog = builtin::catalog();
        let classifier = ModifierClassifier::new(&catalog, &[]);

        match classifier.classify("3/4\"ROD") {
            Modifier::Option(option) => {
                assert_eq!(option.code, "3/4\"OD");
                assert_eq!(option.alias_of.as_deref(), Some("3/4\"ROD"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_housing_option_code_sets_housing() {
        let catalog = builtin::catalog();
        let housing = vec![HousingToken::stainless()];
        let classifier = ModifierClassifier::new(&catalog, &housing);

        match classifier.classify("SSHOUSING") {
            Modifier::Housing { housing, option } => {
                assert_eq!(housing, "Stainless Steel, NEMA 4X");
                assert_eq!(option.code, "SSHOUSING");
                assert_eq!(option.name, "Stainless Steel Housing");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_warnings() {
        let catalog = builtin::catalog();
        let classifier = ModifierClassifier::new(&catalog, &[]);

        let unknown = classifier.classify("INVALIDXYZ");
        assert_eq!(
            unknown.warning().as_deref(),
            Some("Unknown option or modifier: INVALIDXYZ")
        );

        let bend = classifier.classify("200DEG");
        assert_eq!(
            bend.warning().as_deref(),
            Some("Invalid bent probe format: 200DEG")
        );

        let conn = classifier.classify("5NPT");
        assert!(matches!(conn, Modifier::MalformedConnection(_)));
        assert!(conn.warning().unwrap().contains("5NPT"));

        let ins = classifier.classify("8\"XYZINS");
        assert_eq!(
            ins.warning().as_deref(),
            Some("Unknown insulator material: XYZ")
        );

        assert!(classifier.classify("VR").warning().is_none());
    }
}
