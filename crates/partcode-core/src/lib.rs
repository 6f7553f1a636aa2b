//! # partcode-core: Part-Code Parsing & Pricing
//!
//! Turns a level-switch part code such as
//! `LS2000-115VAC-S-10"-XSP-VR-8"TEFINS` into a resolved configuration and
//! an itemized price, with warnings for anything it could not understand.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Quote renderer / CLI (outside this workspace)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ParsedConfiguration                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ partcode-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  splitter ─► resolver ─► rules ─► modifiers ─► specs ─►         │   │
//! │  │  pricing ─► compatibility                                       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO ENVIRONMENT • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ trait Catalog                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        partcode-catalog (catalog files, settings, tracing)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`parser`] - `QuoteParser`, the pipeline entry point
//! - [`splitter`] - four positional fields plus modifiers
//! - [`resolver`] - shorthand and alias resolution, length parsing
//! - [`modifiers`] - modifier sub-grammars and classification
//! - [`rules`] - declarative cross-field material rules
//! - [`specs`] - derived temperature, pressure, insulator and diameter
//! - [`pricing`] - itemized, stepped pricing
//! - [`compatibility`] - blocking errors and advisory warnings
//! - [`catalog`] / [`builtin`] - reference data
//! - [`types`] / [`money`] / [`error`] / [`config`]
//!
//! ## Example Usage
//!
//! ```rust
//! use partcode_core::{builtin, QuoteParser};
//!
//! let parser = QuoteParser::new(builtin::catalog());
//! let parsed = parser.parse("LS2000-115VAC-S-10\"-90DEG").unwrap();
//!
//! assert_eq!(parsed.options[0].parameter, Some(90));
//! assert_eq!(parsed.pricing.total_price.to_string(), "$505.00");
//! assert!(parsed.warnings.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod builtin;
pub mod catalog;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod modifiers;
pub mod money;
pub mod parser;
pub mod pricing;
pub mod resolver;
pub mod rules;
pub mod specs;
pub mod splitter;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{Catalog, CatalogSnapshot, LayeredCatalog};
pub use config::ParserConfig;
pub use error::{CoreError, CoreResult, PricingError};
pub use money::Money;
pub use parser::QuoteParser;
pub use pricing::PricingConfig;
pub use types::*;
