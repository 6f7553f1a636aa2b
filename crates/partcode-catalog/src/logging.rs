//! # Tracing Setup
//!
//! Installs the global `tracing` subscriber.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - every resolved field, classified token and priced
//!   component
//! - `RUST_LOG=partcode_core=trace` - pipeline only
//! - Otherwise the filter passed in, usually `Settings::log_filter`

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Returns an error if a global subscriber is already set; callers that may
/// run twice (tests, embedding apps) can ignore it.
pub fn init_tracing(default_filter: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .try_init()
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(crate::settings::DEFAULT_LOG_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_error() {
        // The first call may succeed or lose to another test; the second
        // always finds a subscriber installed.
        let _ = init_tracing("warn");
        assert!(init_tracing("warn").is_err());
    }
}
