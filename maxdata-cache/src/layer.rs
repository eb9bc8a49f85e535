use crate::keys::invalidation_pattern;
use crate::repository::CacheRepository;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Typed access to a [`CacheRepository`].
///
/// Payloads are stored as JSON. A payload that no longer decodes is removed
/// and treated as a miss.
#[derive(Clone)]
pub struct QueryCache {
    repository: Arc<dyn CacheRepository>,
    default_ttl: Duration,
}

impl QueryCache {
    pub fn new(repository: Arc<dyn CacheRepository>, default_ttl: Duration) -> Self {
        Self {
            repository,
            default_ttl,
        }
    }

    pub fn repository(&self) -> &Arc<dyn CacheRepository> {
        &self.repository
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let Some(bytes) = self.repository.get(key) else {
            debug!(key, "cache miss");
            return None;
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "undecodable cache payload dropped");
                self.repository.remove(key);
                None
            }
        }
    }

    /// Stores `value` until `expires`, or for the default lifetime.
    pub fn put<T: Serialize>(&self, key: &str, value: &T, expires: Option<DateTime<Utc>>) {
        let expires = expires.unwrap_or_else(|| Utc::now() + self.default_ttl);
        match serde_json::to_vec(value) {
            Ok(bytes) => self.repository.set(key, bytes, expires),
            Err(e) => warn!(key, error = %e, "cache payload not serializable; skipped"),
        }
    }

    /// Removes every entry under `namespace`.
    pub fn invalidate(&self, namespace: &str) -> usize {
        let removed = self.repository.remove(&invalidation_pattern(namespace));
        debug!(namespace, removed, "cache namespace invalidated");
        removed
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}
