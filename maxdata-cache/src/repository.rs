use chrono::{DateTime, Utc};

/// Backing store for cached query results.
///
/// Values are opaque blobs with an absolute expiry. An expired entry must
/// never be returned. `remove` accepts either an exact key or a literal
/// prefix followed by `*`.
pub trait CacheRepository: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    fn set(&self, key: &str, value: Vec<u8>, expires: DateTime<Utc>);

    /// Removes one key, or every key sharing a prefix when `key` ends in
    /// `*`. Returns the number of entries removed.
    fn remove(&self, key: &str) -> usize;
}

/// A repository that stores nothing. Every read misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheRepository;

impl CacheRepository for NoopCacheRepository {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: Vec<u8>, _expires: DateTime<Utc>) {}

    fn remove(&self, _key: &str) -> usize {
        0
    }
}
