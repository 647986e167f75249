//! Controller configuration.

use std::time::Duration;

use serde::Deserialize;

use stratus_common::{Error, Result};

/// Tunables for the reconciler
///
/// Deserialized from the operator's config file; durations accept
/// humantime strings ("5m", "30s").
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Minimum interval between health re-probes of a healthy resource
    #[serde(with = "humantime_serde")]
    pub health_check_period: Duration,

    /// Number of resource identities processed in parallel
    pub workers: usize,

    /// Attempts when persisting status through a conflicting store
    pub conflict_retries: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            health_check_period: Duration::from_secs(5 * 60),
            workers: 4,
            conflict_retries: 5,
        }
    }
}

impl ControllerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::validation("workers must be at least 1"));
        }
        if self.conflict_retries == 0 {
            return Err(Error::validation("conflict retries must be at least 1"));
        }
        if self.health_check_period.is_zero() {
            return Err(Error::validation("health check period must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.health_check_period, Duration::from_secs(300));
    }

    #[test]
    fn deserializes_humantime_durations() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{"healthCheckPeriod": "1m", "workers": 8}"#).unwrap();
        assert_eq!(config.health_check_period, Duration::from_secs(60));
        assert_eq!(config.workers, 8);
        assert_eq!(config.conflict_retries, 5);
    }

    #[test]
    fn rejects_zero_workers() {
        let config = ControllerConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
