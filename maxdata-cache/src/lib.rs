//! Query result cache for maxdata.
//!
//! - [`CacheRepository`] — the backing-store contract (get, set with an
//!   absolute expiry, exact or `prefix*` removal)
//! - [`MemoryCacheRepository`] — coarse-locked in-process store with
//!   read-triggered eviction and a background sweeper
//! - [`QueryCache`] — typed JSON payloads over any repository
//! - key helpers deriving namespaces from the storage name and an optional
//!   per-record `StorageKey`, and hashing query signatures with SHA-256

mod config;
mod error;
mod keys;
mod layer;
mod memory;
mod repository;

pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use keys::{
    cache_key, invalidation_pattern, load_all_namespace, record_namespace, signature_hash,
    LOAD_ALL_SEGMENT,
};
pub use layer::QueryCache;
pub use memory::{spawn_sweeper, MemoryCacheRepository};
pub use repository::{CacheRepository, NoopCacheRepository};
