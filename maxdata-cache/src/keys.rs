//! Cache key construction.
//!
//! Keys are `{namespace}{sha256-hex of the query signature}`. Namespaces end
//! in `/` so that invalidating `"{namespace}*"` cannot reach a sibling
//! namespace that merely shares a name prefix.

use crate::error::CacheResult;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Namespace segment holding every load-all style query for a storage.
pub const LOAD_ALL_SEGMENT: &str = "LoadAll";

/// The everything-that-lists-rows namespace of a storage.
pub fn load_all_namespace(storage_name: &str, storage_key: Option<&str>) -> String {
    match storage_key {
        Some(sk) => format!("{storage_name}/{sk}/{LOAD_ALL_SEGMENT}/"),
        None => format!("{storage_name}/{LOAD_ALL_SEGMENT}/"),
    }
}

/// The namespace of queries scoped to one record key.
pub fn record_namespace(storage_name: &str, storage_key: Option<&str>, data_key: &str) -> String {
    match storage_key {
        Some(sk) => format!("{storage_name}/{sk}/{data_key}/"),
        None => format!("{storage_name}/{data_key}/"),
    }
}

/// Hex SHA-256 digest of the JSON form of `signature`.
pub fn signature_hash(signature: &impl Serialize) -> CacheResult<String> {
    let json = serde_json::to_vec(signature)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hex::encode(hasher.finalize()))
}

/// A full cache key: namespace followed by the signature digest.
pub fn cache_key(namespace: &str, signature: &impl Serialize) -> CacheResult<String> {
    Ok(format!("{namespace}{}", signature_hash(signature)?))
}

/// Wildcard pattern removing every key under `namespace`.
pub fn invalidation_pattern(namespace: &str) -> String {
    format!("{namespace}*")
}
