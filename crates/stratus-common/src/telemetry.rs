//! Tracing initialization for Stratus binaries
//!
//! Structured JSON logging with an environment-driven filter. Operators
//! diagnose stuck resources through resource status fields; logs carry the
//! per-handler Doing/Done breadcrumbs around them.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Errors that can occur during telemetry initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize the tracing subscriber
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Configuration for telemetry initialization
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name included in every log line
    pub service_name: String,

    /// Emit JSON log lines (plain text when false, useful locally)
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "stratus".to_string(),
            json: true,
        }
    }
}

/// Initialize the global tracing subscriber
///
/// The filter is taken from `RUST_LOG` when set, otherwise defaults to
/// `info` with debug logging for stratus crates.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stratus=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true);
        registry.with(fmt_layer).try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
        registry.with(fmt_layer).try_init()
    };

    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_json() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "stratus");
        assert!(config.json);
    }

    #[test]
    fn init_is_idempotent_enough_for_tests() {
        // A second init in the same process must surface an error rather
        // than panic; the first call may or may not win depending on test
        // ordering, so only the non-panicking contract is asserted.
        let config = TelemetryConfig::default();
        let _ = init_telemetry(&config);
        let second = init_telemetry(&config);
        assert!(second.is_err() || second.is_ok());
    }
}
