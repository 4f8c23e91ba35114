//! Cache configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the media blob cache and prefetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Soft ceiling on stored bytes (default: 100MB)
    pub max_cache_size_bytes: u64,

    /// Age cutoffs tried in order when a write would exceed the ceiling
    /// (default: 3 days, then 1 day)
    pub eviction_passes: Vec<Duration>,

    /// Timeout for a foreground fetch (default: 30s)
    pub fetch_timeout: Duration,

    /// Timeout for a background prefetch (default: 30s)
    pub prefetch_timeout: Duration,

    /// Age used by `clear_old_cache` when none is given (default: 7 days)
    pub default_max_age: Duration,

    /// Items warmed ahead of the current one on restricted platforms (default: 2)
    pub prefetch_fan_out_restricted: usize,

    /// Items warmed ahead of the current one elsewhere (default: 5)
    pub prefetch_fan_out_permissive: usize,

    /// Ask the host to exempt the store from eviction on first use (default: true)
    pub request_persistent_storage: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_cache_size_bytes: 100 * 1024 * 1024,
            eviction_passes: vec![3 * DAY, DAY],
            fetch_timeout: Duration::from_secs(30),
            prefetch_timeout: Duration::from_secs(30),
            default_max_age: 7 * DAY,
            prefetch_fan_out_restricted: 2,
            prefetch_fan_out_permissive: 5,
            request_persistent_storage: true,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum cache size.
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_cache_size_bytes = bytes;
        self
    }

    /// Set eviction age cutoffs, oldest first.
    pub fn with_eviction_passes(mut self, passes: Vec<Duration>) -> Self {
        self.eviction_passes = passes;
        self
    }

    /// Set foreground fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set prefetch timeout.
    pub fn with_prefetch_timeout(mut self, timeout: Duration) -> Self {
        self.prefetch_timeout = timeout;
        self
    }

    /// Set default age for `clear_old_cache`.
    pub fn with_default_max_age(mut self, age: Duration) -> Self {
        self.default_max_age = age;
        self
    }

    /// Set prefetch fan-out for restricted and permissive platforms.
    pub fn with_prefetch_fan_out(mut self, restricted: usize, permissive: usize) -> Self {
        self.prefetch_fan_out_restricted = restricted;
        self.prefetch_fan_out_permissive = permissive;
        self
    }

    /// Enable or disable the durable-storage request.
    pub fn with_persistent_storage_request(mut self, enabled: bool) -> Self {
        self.request_persistent_storage = enabled;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_cache_size_bytes == 0 {
            return Err("max_cache_size_bytes must be greater than 0".to_string());
        }

        if self.eviction_passes.windows(2).any(|w| w[0] < w[1]) {
            return Err("eviction_passes must go from oldest to newest cutoff".to_string());
        }

        if self.fetch_timeout.is_zero() || self.prefetch_timeout.is_zero() {
            return Err("fetch timeouts must be greater than 0".to_string());
        }

        if self.default_max_age.is_zero() {
            return Err("default_max_age must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.max_cache_size_bytes, 100 * 1024 * 1024);
        assert_eq!(
            config.eviction_passes,
            vec![Duration::from_secs(3 * 86_400), Duration::from_secs(86_400)]
        );
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.default_max_age, Duration::from_secs(7 * 86_400));
        assert_eq!(config.prefetch_fan_out_restricted, 2);
        assert_eq!(config.prefetch_fan_out_permissive, 5);
        assert!(config.request_persistent_storage);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = CacheConfig::new()
            .with_max_size(1024)
            .with_fetch_timeout(Duration::from_millis(10))
            .with_prefetch_fan_out(1, 3)
            .with_persistent_storage_request(false);

        assert_eq!(config.max_cache_size_bytes, 1024);
        assert_eq!(config.fetch_timeout, Duration::from_millis(10));
        assert_eq!(config.prefetch_fan_out_permissive, 3);
        assert!(!config.request_persistent_storage);
    }

    #[test]
    fn test_validation() {
        assert!(CacheConfig::new().with_max_size(0).validate().is_err());
        assert!(CacheConfig::new()
            .with_eviction_passes(vec![DAY, 3 * DAY])
            .validate()
            .is_err());
        assert!(CacheConfig::new()
            .with_fetch_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(CacheConfig::new()
            .with_eviction_passes(Vec::new())
            .validate()
            .is_ok());
    }
}
