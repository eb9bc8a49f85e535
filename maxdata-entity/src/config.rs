use serde::Deserialize;
use std::time::Duration;

/// Tunables of an [`EntityRepository`](crate::EntityRepository).
///
/// Deserializes from JSON; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Retries after the first failed write attempt.
    pub retry_limit: u32,
    /// Pause between write attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Lifetime of cached query results, in seconds.
    pub cache_expire_secs: i64,
    /// Separator joining key values into a record key.
    pub key_separator: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            retry_limit: 5,
            retry_delay_ms: 50,
            cache_expire_secs: 3600,
            key_separator: "|".to_string(),
        }
    }
}

impl RepositoryConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Write attempts in total, the first one included.
    pub fn attempts(&self) -> u32 {
        self.retry_limit.saturating_add(1)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_expire_secs)
    }
}
