use crate::error::{CacheError, CacheResult};
use serde::Deserialize;
use std::time::Duration;

/// Configuration of the in-memory cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds between background sweeps of expired entries.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> CacheResult<()> {
        if self.sweep_interval_secs == 0 {
            return Err(CacheError::Configuration("sweep_interval_secs must be at least 1".into()));
        }
        Ok(())
    }
}
