use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SECOND_MS: u64 = 1_000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// How a store keeps its catalog fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Serve the initial dataset forever.
    Never,
    /// One refresh right after startup.
    Once,
    /// Refresh on a fixed delay, backing off after failures.
    #[default]
    Periodic,
}

/// Refresh settings of a catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RefreshConfig {
    pub update_mode: UpdateMode,
    pub update_interval_ms: u64,
    /// Delay before the first retry after a failed cycle.
    pub retry_interval_ms: u64,
    /// Backoff ceiling.
    pub max_retry_interval_ms: u64,
    /// Applies to each fetch on its own.
    pub fetch_timeout_ms: u64,
    pub verify_checksums: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            update_mode: UpdateMode::Periodic,
            update_interval_ms: DAY_MS,
            retry_interval_ms: MINUTE_MS,
            max_retry_interval_ms: DAY_MS,
            fetch_timeout_ms: 30 * SECOND_MS,
            verify_checksums: true,
        }
    }
}

impl RefreshConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.update_mode == UpdateMode::Periodic && self.update_interval_ms == 0 {
            return Err(Error::invalid_argument(
                "update-interval-ms must be positive for periodic updates",
            ));
        }
        if self.retry_interval_ms > self.max_retry_interval_ms {
            return Err(Error::invalid_argument(format!(
                "retry-interval-ms ({}) exceeds max-retry-interval-ms ({})",
                self.retry_interval_ms, self.max_retry_interval_ms
            )));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn max_retry_interval(&self) -> Duration {
        Duration::from_millis(self.max_retry_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Bounds of the memoizing parser decorator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    pub max_entries: u64,
    pub time_to_live_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            time_to_live_ms: 2 * HOUR_MS,
        }
    }
}

impl CacheConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn time_to_live(&self) -> Duration {
        Duration::from_millis(self.time_to_live_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RefreshConfig::default();
        assert_eq!(c.update_mode, UpdateMode::Periodic);
        assert_eq!(c.update_interval(), Duration::from_secs(86_400));
        assert_eq!(c.fetch_timeout(), Duration::from_secs(30));
        assert!(c.validate().is_ok());

        let c = CacheConfig::default();
        assert_eq!(c.max_entries, 100);
        assert_eq!(c.time_to_live(), Duration::from_secs(7_200));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c = RefreshConfig::from_yaml_str("update-mode: once\nfetch-timeout-ms: 500\n").unwrap();
        assert_eq!(c.update_mode, UpdateMode::Once);
        assert_eq!(c.fetch_timeout_ms, 500);
        assert_eq!(c.retry_interval_ms, 60_000);
        assert!(c.verify_checksums);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            RefreshConfig::from_yaml_str("update-interval-ms: 0"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            RefreshConfig::from_yaml_str("retry-interval-ms: 10\nmax-retry-interval-ms: 5"),
            Err(Error::InvalidArgument(_))
        ));
        // A zero interval is fine when nothing is scheduled.
        assert!(RefreshConfig::from_yaml_str("update-mode: never\nupdate-interval-ms: 0").is_ok());
        assert!(matches!(
            RefreshConfig::from_yaml_str("update-mode: hourly"),
            Err(Error::YAML(_))
        ));
    }
}
