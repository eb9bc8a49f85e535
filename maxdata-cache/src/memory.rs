//! In-process cache repository with read-triggered and periodic eviction.

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::repository::CacheRepository;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires
    }
}

/// A `HashMap` behind one coarse lock.
///
/// `get` evicts an expired entry on the spot; [`spawn_sweeper`] removes the
/// ones nobody reads.
#[derive(Debug, Default)]
pub struct MemoryCacheRepository {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCacheRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shared cache and starts its sweeper at the configured
    /// interval. The sweeper thread is detached and ends with the cache.
    pub fn with_sweeper(config: &CacheConfig) -> CacheResult<Arc<Self>> {
        config.validate()?;
        let cache = Arc::new(Self::new());
        spawn_sweeper(&cache, config.sweep_interval())?;
        Ok(cache)
    }

    /// Removes every entry expired at `now`. Returns how many were removed.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
        info!("memory cache cleared");
    }
}

impl CacheRepository for MemoryCacheRepository {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = entries.get(key)?.is_expired(Utc::now());
        if expired {
            entries.remove(key);
            debug!(key, "evicted expired cache entry on read");
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    fn set(&self, key: &str, value: Vec<u8>, expires: DateTime<Utc>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), CacheEntry { value, expires });
    }

    fn remove(&self, key: &str) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match key.strip_suffix('*') {
            Some(prefix) => {
                let before = entries.len();
                entries.retain(|k, _| !k.starts_with(prefix));
                before - entries.len()
            }
            None => usize::from(entries.remove(key).is_some()),
        }
    }
}

/// Starts a background thread that sweeps `cache` every `interval`.
///
/// The thread holds only a weak reference; it stops after the first sweep
/// that finds the repository dropped.
pub fn spawn_sweeper(
    cache: &Arc<MemoryCacheRepository>,
    interval: Duration,
) -> CacheResult<JoinHandle<()>> {
    if interval.is_zero() {
        return Err(CacheError::Configuration("sweep interval must be non-zero".into()));
    }
    let weak: Weak<MemoryCacheRepository> = Arc::downgrade(cache);
    let handle = std::thread::Builder::new()
        .name("maxdata-cache-sweeper".into())
        .spawn(move || {
            loop {
                std::thread::sleep(interval);
                let Some(cache) = weak.upgrade() else {
                    debug!("cache dropped; sweeper exiting");
                    break;
                };
                let expired = cache.sweep_expired(Utc::now());
                if expired > 0 {
                    debug!(expired, remaining = cache.len(), "cache sweep completed");
                }
            }
        })?;

    info!(interval_ms = interval.as_millis() as u64, "cache sweeper started");
    Ok(handle)
}
