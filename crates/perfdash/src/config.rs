//! Engine configuration.

use perfdash_core::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MAX_CONCURRENCY: usize = 6;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_LEADERBOARD_SIZE: usize = 5;

/// Tunables of a [`DashboardService`](crate::DashboardService).
///
/// Missing fields take their defaults when deserialized, so a partial JSON
/// or TOML table is enough to override a single setting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Maximum number of metric calculations in flight per aggregation.
    pub max_concurrency: usize,
    /// Lifetime of a cached dashboard, in seconds.
    pub cache_ttl_secs: u64,
    /// Length of the best and worst employee lists.
    pub leaderboard_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
        }
    }
}

impl DashboardConfig {
    /// Sets the fan-out width.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Sets the dashboard cache TTL. Sub-second precision is dropped.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// Sets the leaderboard length.
    #[must_use]
    pub const fn with_leaderboard_size(mut self, size: usize) -> Self {
        self.leaderboard_size = size;
        self
    }

    /// Dashboard cache TTL.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Checks that the configuration can drive an aggregation.
    ///
    /// # Errors
    /// Returns [`DashboardError::InvalidParameter`] when `max_concurrency` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(DashboardError::InvalidParameter(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.max_concurrency, 6);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.leaderboard_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialize() {
        let config: DashboardConfig = serde_json::from_str(r#"{"max_concurrency": 2}"#).unwrap();
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.cache_ttl_secs, 300);
    }

    #[test]
    fn test_builders_and_validation() {
        let config = DashboardConfig::default()
            .with_max_concurrency(0)
            .with_cache_ttl(Duration::from_millis(90_500))
            .with_leaderboard_size(3);
        assert_eq!(config.cache_ttl_secs, 90);
        assert_eq!(config.leaderboard_size, 3);
        assert!(matches!(
            config.validate(),
            Err(DashboardError::InvalidParameter(_))
        ));
    }
}
