//! # Settings
//!
//! Where the catalog lives, how verbose logging is, and the parser
//! configuration.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PARTCODE_CATALOG_PATH=/etc/partcode/catalog.toml                   │
//! │     PARTCODE_DEFAULT_LENGTH=12                                         │
//! │     PARTCODE_BEND_PRICE_CENTS=6000                                     │
//! │     PARTCODE_LOG=debug                                                 │
//! │                                                                         │
//! │  2. TOML Settings File                                                 │
//! │     ~/.config/partcode/partcode.toml (Linux)                           │
//! │     ~/Library/Application Support/com.partcode.partcode/partcode.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     builtin catalog only, ParserConfig::default()                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Settings File Format
//! ```toml
//! catalog_path = "/etc/partcode/catalog.toml"
//! log_filter = "info,partcode=debug"
//!
//! [parser]
//! default_probe_length = 10.0
//!
//! [parser.pricing]
//! bend_price = 5000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use partcode_core::{Money, ParserConfig};

use crate::error::{CatalogError, CatalogResult};

pub const ENV_CATALOG_PATH: &str = "PARTCODE_CATALOG_PATH";
pub const ENV_DEFAULT_LENGTH: &str = "PARTCODE_DEFAULT_LENGTH";
pub const ENV_BEND_PRICE_CENTS: &str = "PARTCODE_BEND_PRICE_CENTS";
pub const ENV_LOG: &str = "PARTCODE_LOG";

/// Settings file name inside the platform config directory.
pub const SETTINGS_FILE: &str = "partcode.toml";

/// Default tracing filter when neither `RUST_LOG` nor a setting names one.
pub const DEFAULT_LOG_FILTER: &str = "info,partcode=debug";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Catalog file layered over the builtin catalog.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub parser: ParserConfig,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: None,
            log_filter: default_log_filter(),
            parser: ParserConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from file, environment and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Settings file (`partcode.toml`)
    /// 3. Environment variables
    pub fn load(settings_path: Option<PathBuf>) -> CatalogResult<Self> {
        let mut settings = match settings_path.or_else(Self::default_settings_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Settings file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    /// Loads settings or returns defaults if loading fails.
    pub fn load_or_default(settings_path: Option<PathBuf>) -> Self {
        Self::load(settings_path).unwrap_or_else(|e| {
            warn!("Failed to load settings: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Reads one settings file, without environment overrides.
    pub fn from_file(path: &Path) -> CatalogResult<Self> {
        info!(?path, "Loading settings from file");
        let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        toml::from_str(&contents).map_err(|source| CatalogError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the settings as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> CatalogResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|e| CatalogError::io(path, e))?;

        info!(?path, "Settings saved");
        Ok(())
    }

    /// Rejects values the parser cannot work with.
    pub fn validate(&self) -> CatalogResult<()> {
        if let Err(e) = EnvFilter::try_new(&self.log_filter) {
            return Err(CatalogError::InvalidConfig(format!(
                "log_filter '{}' is not a valid filter: {}",
                self.log_filter, e
            )));
        }

        let problems = self.parser.problems();
        if !problems.is_empty() {
            return Err(CatalogError::InvalidConfig(problems.join("; ")));
        }

        Ok(())
    }

    /// Applies `PARTCODE_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_CATALOG_PATH) {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog_path = Some(PathBuf::from(path));
        }

        if let Some(length) = lookup(ENV_DEFAULT_LENGTH) {
            match length.trim().parse::<f64>() {
                Ok(value) => self.parser.default_probe_length = value,
                Err(_) => warn!(value = %length, "Ignoring unparsable {}", ENV_DEFAULT_LENGTH),
            }
        }

        if let Some(cents) = lookup(ENV_BEND_PRICE_CENTS) {
            match cents.trim().parse::<i64>() {
                Ok(value) => self.parser.pricing.bend_price = Money::from_cents(value),
                Err(_) => warn!(value = %cents, "Ignoring unparsable {}", ENV_BEND_PRICE_CENTS),
            }
        }

        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
    }

    /// `partcode.toml` in the platform config directory.
    pub fn default_settings_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "partcode", "partcode")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.catalog_path.is_none());
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(lookup(&[
            (ENV_CATALOG_PATH, "/tmp/catalog.toml"),
            (ENV_DEFAULT_LENGTH, "12.5"),
            (ENV_BEND_PRICE_CENTS, "6000"),
            (ENV_LOG, "warn"),
        ]));

        assert_eq!(settings.catalog_path, Some(PathBuf::from("/tmp/catalog.toml")));
        assert_eq!(settings.parser.default_probe_length, 12.5);
        assert_eq!(settings.parser.pricing.bend_price, Money::from_dollars(60));
        assert_eq!(settings.log_filter, "warn");
    }

    #[test]
    fn test_unparsable_overrides_are_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(lookup(&[
            (ENV_DEFAULT_LENGTH, "ten"),
            (ENV_BEND_PRICE_CENTS, "$50"),
        ]));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.parser.default_probe_length = -1.0;
        assert!(matches!(
            settings.validate(),
            Err(CatalogError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_settings_file() {
        let settings: Settings = toml::from_str(
            r#"
            catalog_path = "catalog.toml"

            [parser.pricing]
            bend_price = 5500
            "#,
        )
        .unwrap();

        assert_eq!(settings.catalog_path, Some(PathBuf::from("catalog.toml")));
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(settings.parser.pricing.bend_price, Money::from_cents(5500));
        assert_eq!(settings.parser.default_probe_length, 10.0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("partcode-settings-{}", std::process::id()));
        let path = dir.join(SETTINGS_FILE);

        let mut settings = Settings::default();
        settings.parser.default_probe_length = 14.0;
        settings.save(&path).unwrap();

        let reloaded = Settings::from_file(&path).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_missing_explicit_path_uses_defaults() {
        let settings =
            Settings::load_or_default(Some(PathBuf::from("/nonexistent/partcode.toml")));
        assert_eq!(
            settings.parser.default_probe_length,
            Settings::default().parser.default_probe_length
        );
    }
}
