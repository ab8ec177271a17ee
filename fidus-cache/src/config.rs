//! Configuration for the query cache.

use std::time::Duration;

/// Tunables for [`crate::QueryCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Freshness window for cached entries. A `Ready` entry older than this
    /// is treated as a miss and refetched on the next read.
    pub entry_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            entry_ttl: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the freshness window.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_one_minute() {
        assert_eq!(CacheConfig::default().entry_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_overrides_ttl() {
        let config = CacheConfig::new().with_ttl(Duration::from_millis(250));
        assert_eq!(config.entry_ttl, Duration::from_millis(250));
    }
}
