//! # partcode-catalog: Catalog & Settings Loading
//!
//! Everything that touches the filesystem or environment on behalf of
//! `partcode-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   partcode.toml ──► Settings ──┬──► ParserConfig ───────────┐          │
//! │   PARTCODE_* env ─────┘        │                             ▼          │
//! │                                └──► catalog_path ──► load_catalog       │
//! │                                                          │              │
//! │                          LayeredCatalog(file, builtin) ◄─┘              │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                             QuoteParser                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//! ```rust,no_run
//! use partcode_catalog::{build_parser, init_tracing, Settings};
//!
//! let settings = Settings::load(None)?;
//! let _ = init_tracing(&settings.log_filter);
//!
//! let parser = build_parser(&settings)?;
//! let parsed = parser.parse("LS2000-115VAC-S-10\"").expect("four fields");
//! println!("{}", parsed.pricing.summary());
//! # Ok::<(), partcode_catalog::CatalogError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod file;
pub mod logging;
pub mod settings;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CatalogError, CatalogResult};
pub use file::load_catalog;
pub use logging::init_tracing;
pub use settings::Settings;

use tracing::info;

use partcode_core::{builtin, CatalogSnapshot, LayeredCatalog, QuoteParser};

/// Parser over a catalog file layered on the builtin catalog.
pub type FileCatalogParser = QuoteParser<LayeredCatalog<CatalogSnapshot, CatalogSnapshot>>;

/// Builds a parser from settings.
///
/// Without a `catalog_path` the primary tier is empty and every lookup
/// falls through to the builtin catalog.
pub fn build_parser(settings: &Settings) -> CatalogResult<FileCatalogParser> {
    let primary = match &settings.catalog_path {
        Some(path) => load_catalog(path)?,
        None => CatalogSnapshot::default(),
    };
    info!(
        catalog = ?settings.catalog_path,
        file_entries = !primary.is_empty(),
        "Building quote parser"
    );

    let catalog = LayeredCatalog::new(primary, builtin::catalog());
    Ok(QuoteParser::with_config(catalog, settings.parser.clone()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use partcode_core::Money;

    #[test]
    fn test_builtin_only_parser() {
        let parser = build_parser(&Settings::default()).unwrap();
        let parsed = parser.parse("LS2000-115VAC-S-10\"").unwrap();
        assert_eq!(parsed.pricing.total_price, Money::from_dollars(455));
    }

    #[test]
    fn test_catalog_file_overrides_builtin() {
        let dir = std::env::temp_dir().join(format!("partcode-build-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.toml");
        std::fs::write(
            &path,
            r#"
            [[models]]
            code = "LS2000"
            base_price = 50000
            base_length = 10.0
            insulator = "U"

            [[options]]
            code = "NEMA4"
            name = "NEMA 4 Enclosure"
            pricing = { kind = "fixed", price = 12000 }
            "#,
        )
        .unwrap();

        let mut settings = Settings::default();
        settings.catalog_path = Some(path);
        settings.parser.pricing.bend_price = Money::from_dollars(60);
        let parser = build_parser(&settings).unwrap();

        let parsed = parser.parse("LS2000-115VAC-S-10\"-NEMA4-90DEG").unwrap();
        assert_eq!(parsed.pricing.base_price, Money::from_dollars(500));
        assert_eq!(parsed.pricing.option_price, Money::from_dollars(180));
        assert!(parsed.warnings.is_empty());

        // Rows the file does not carry still come from the builtin catalog
        let parsed = parser.parse("LS2100-24VDC-S-10\"").unwrap();
        assert_eq!(parsed.pricing.base_price, Money::from_dollars(555));
    }

    #[test]
    fn test_bad_catalog_path_fails() {
        let mut settings = Settings::default();
        settings.catalog_path = Some("/nonexistent/catalog.toml".into());
        assert!(matches!(
            build_parser(&settings),
            Err(CatalogError::Io { .. })
        ));
    }
}
