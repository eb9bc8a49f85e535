use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Issues version numbers per (storage, version group).
///
/// The next version is one past the larger of the stored maximum and the
/// last number this issuer handed out for the group. The stored maximum
/// is read while the lock is held, so two concurrent inserts into one
/// group never claim the same version.
#[derive(Debug, Default)]
pub struct VersionIssuer {
    last: Mutex<HashMap<(String, String), i64>>,
}

impl VersionIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, storage_name: &str, group: &str, stored_max: impl FnOnce() -> i64) -> i64 {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let key = (storage_name.to_string(), group.to_string());
        let issued = last.get(&key).copied().unwrap_or(0);
        let next = issued.max(stored_max()).saturating_add(1);
        last.insert(key, next);
        next
    }

    /// The last version issued for a group, if any.
    pub fn last_issued(&self, storage_name: &str, group: &str) -> Option<i64> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(storage_name.to_string(), group.to_string()))
            .copied()
    }
}
