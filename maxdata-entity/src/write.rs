//! Retrying writes with cache invalidation and lifecycle notifications.
//!
//! Ordinary persistence failures never surface as errors: every attempt is
//! logged, the caller gets `false` once the attempts run out, and the
//! matching `*_failed` notification fires.

use crate::repository::EntityRepository;
use maxdata_model::{CACHE_EXPIRE_FIELD, Entity, EntityDescriptor, Record};
use maxdata_storage::StorageResult;
use std::collections::BTreeSet;
use std::slice;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Outcome of [`EntityRepository::insert_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BatchStatus {
    Ok = 0,
    Failed = 1,
}

impl BatchStatus {
    /// Numeric status; zero means success.
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl EntityRepository {
    /// Inserts a new entity.
    ///
    /// Runs the initial-value and property hooks, persists with retry,
    /// then clears the changed flags and invalidates the type's load-all
    /// cache namespace together with the new key's namespace, which may
    /// hold a cached miss.
    pub fn insert(&self, entity: &mut Entity) -> bool {
        self.notify(entity, |l, e| l.before_insert(e));
        self.set_initial(entity);
        self.set_properties(entity);

        let descriptor = Arc::clone(entity.descriptor());
        let stored = self
            .encode(&descriptor, entity.record())
            .and_then(|row| self.with_retry("insert", &descriptor, || self.storage.insert(&descriptor, slice::from_ref(&row))));
        if stored.is_none() {
            self.notify(entity, |l, e| l.insert_failed(e));
            return false;
        }

        entity.record_mut().clear_changed();
        self.cache.invalidate(&self.load_all_namespace(entity));
        if let Some(record_namespace) = self.record_namespace(entity) {
            self.cache.invalidate(&record_namespace);
        }
        self.notify(entity, |l, e| l.after_insert(e));
        true
    }

    /// Inserts new entities of one type in a single provider call.
    ///
    /// There is no retry; any failure is logged and reported as
    /// [`BatchStatus::Failed`].
    pub fn insert_batch(&self, entities: &mut [Entity]) -> BatchStatus {
        let Some(first) = entities.first() else {
            return BatchStatus::Ok;
        };
        let descriptor = Arc::clone(first.descriptor());
        if let Some(other) = entities.iter().find(|e| e.entity_type() != descriptor.entity_type) {
            warn!(expected = %descriptor.entity_type, found = %other.entity_type(), "batch mixes entity types");
            return BatchStatus::Failed;
        }

        let mut rows = Vec::with_capacity(entities.len());
        for entity in entities.iter_mut() {
            self.set_initial(entity);
            self.set_properties(entity);
            match self.encode(&descriptor, entity.record()) {
                Some(row) => rows.push(row),
                None => return BatchStatus::Failed,
            }
        }

        if let Err(e) = self.storage.insert(&descriptor, &rows) {
            warn!(storage = %descriptor.storage_name, rows = rows.len(), error = %e, "batch insert failed");
            return BatchStatus::Failed;
        }

        let mut namespaces = BTreeSet::new();
        for entity in entities.iter_mut() {
            entity.record_mut().clear_changed();
            namespaces.insert(self.load_all_namespace(entity));
            namespaces.extend(self.record_namespace(entity));
        }
        for namespace in &namespaces {
            self.cache.invalidate(namespace);
        }
        debug!(storage = %descriptor.storage_name, rows = rows.len(), "batch inserted");
        BatchStatus::Ok
    }

    /// Persists the changes of a loaded entity.
    ///
    /// An entity with nothing changed besides its last-update time is left
    /// alone and reported as updated. An entity without a complete key
    /// fails without reaching the provider.
    pub fn update(&self, entity: &mut Entity) -> bool {
        self.notify(entity, |l, e| l.before_update(e));
        self.set_properties(entity);

        let descriptor = Arc::clone(entity.descriptor());
        let mut ignored = vec![CACHE_EXPIRE_FIELD];
        ignored.extend(descriptor.last_update_field.as_deref());
        if !entity.record().has_changes_except(&ignored) {
            info!(storage = %descriptor.storage_name, "nothing changed; update skipped");
            return true;
        }

        let Some(record_namespace) = self.record_namespace(entity) else {
            warn!(storage = %descriptor.storage_name, "update of an entity without a key");
            self.notify(entity, |l, e| l.update_failed(e));
            return false;
        };

        let stored = self
            .encode(&descriptor, entity.record())
            .and_then(|row| self.with_retry("update", &descriptor, || self.storage.update(&descriptor, slice::from_ref(&row))));
        if stored.is_none() {
            self.notify(entity, |l, e| l.update_failed(e));
            return false;
        }

        entity.record_mut().clear_changed();
        self.cache.invalidate(&self.load_all_namespace(entity));
        self.cache.invalidate(&record_namespace);
        self.notify(entity, |l, e| l.after_update(e));
        true
    }

    /// Deletes an entity.
    ///
    /// Types with a soft-delete field are flagged and updated instead of
    /// being removed from storage.
    pub fn delete(&self, entity: &mut Entity) -> bool {
        self.notify(entity, |l, e| l.before_delete(e));

        let descriptor = Arc::clone(entity.descriptor());
        let deleted = match &descriptor.soft_delete_field {
            Some(field) => {
                entity.set(field, true);
                self.update(entity)
            }
            None => self.remove(&descriptor, entity),
        };

        if deleted {
            self.notify(entity, |l, e| l.after_delete(e));
        } else {
            self.notify(entity, |l, e| l.delete_failed(e));
        }
        deleted
    }

    /// Moves an entity into the `<storage>Archive` storage.
    ///
    /// The copy is written first; the original is physically deleted only
    /// once the copy is stored, soft-delete field or not.
    pub fn archive(&self, entity: &Entity) -> bool {
        let descriptor = entity.descriptor();
        let mut archive = EntityDescriptor::clone(descriptor);
        archive.storage_name = format!("{}Archive", descriptor.storage_name);

        let copied = self
            .encode(&archive, entity.record())
            .and_then(|row| self.with_retry("archive", &archive, || self.storage.insert(&archive, slice::from_ref(&row))));
        if copied.is_none() {
            return false;
        }

        let removed = self.remove(descriptor, entity);
        if removed {
            info!(storage = %descriptor.storage_name, archive = %archive.storage_name, "entity archived");
        }
        removed
    }

    /// Physically deletes the row of `entity`.
    fn remove(&self, descriptor: &EntityDescriptor, entity: &Entity) -> bool {
        let Some(record_namespace) = self.record_namespace(entity) else {
            warn!(storage = %descriptor.storage_name, "delete of an entity without a key");
            return false;
        };

        let removed = self
            .encode(descriptor, entity.record())
            .and_then(|row| self.with_retry("delete", descriptor, || self.storage.delete(descriptor, slice::from_ref(&row))));
        if removed.is_none() {
            return false;
        }

        self.cache.invalidate(&record_namespace);
        self.cache.invalidate(&self.load_all_namespace(entity));
        true
    }

    fn encode(&self, descriptor: &EntityDescriptor, record: &Record) -> Option<Record> {
        match self.codec.encode(descriptor, record) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!(storage = %descriptor.storage_name, error = %e, "record not encodable; write abandoned");
                None
            }
        }
    }

    /// Runs `attempt` until it succeeds or the configured attempts run out,
    /// sleeping between attempts.
    fn with_retry<T>(
        &self,
        operation: &'static str,
        descriptor: &EntityDescriptor,
        mut attempt: impl FnMut() -> StorageResult<T>,
    ) -> Option<T> {
        let attempts = self.config.attempts();
        for n in 1..=attempts {
            match attempt() {
                Ok(value) => {
                    if n > 1 {
                        debug!(operation, storage = %descriptor.storage_name, attempt = n, "write succeeded after retry");
                    }
                    return Some(value);
                }
                Err(e) => {
                    warn!(operation, storage = %descriptor.storage_name, attempt = n, error = %e, "write attempt failed");
                    if n < attempts {
                        thread::sleep(self.config.retry_delay());
                    }
                }
            }
        }
        warn!(operation, storage = %descriptor.storage_name, attempts, "write retries exhausted");
        None
    }
}
