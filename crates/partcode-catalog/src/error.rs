//! # Catalog Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  std::io / toml / serde_json errors                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CatalogError (this module) ← adds the file or setting involved         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller decides: abort, or fall back to the builtin catalog             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for catalog and settings operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// File could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Catalog parsed but its contents are unusable.
    #[error("Invalid catalog {}: {}", .path.display(), .problems.join("; "))]
    InvalidCatalog { path: PathBuf, problems: Vec<String> },

    /// Settings parsed but hold nonsensical values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_catalog_message_lists_problems() {
        let err = CatalogError::InvalidCatalog {
            path: PathBuf::from("catalog.toml"),
            problems: vec![
                "model #1 has an empty code".to_string(),
                "option XSP has a negative price".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Invalid catalog catalog.toml: model #1 has an empty code; option XSP has a negative price"
        );
    }
}
