use crate::record::Record;
use crate::schema::EntityDescriptor;
use chrono::{DateTime, Utc};
use maxdata_types::DataValue;
use std::sync::Arc;

/// Record-level override of the cache namespace (multi-tenant partitioning).
pub const STORAGE_KEY_FIELD: &str = "StorageKey";

/// Record-level override of cache expiry. Never persisted.
pub const CACHE_EXPIRE_FIELD: &str = "_MaxCacheExpire";

/// Virtual field exposing the record key to projections.
pub const DATA_KEY_FIELD: &str = "DataKey";

/// A record bound to the descriptor of its entity type.
///
/// Cloning an entity clones its record, so the copy starts with no
/// changed fields.
#[derive(Debug, Clone)]
pub struct Entity {
    descriptor: Arc<EntityDescriptor>,
    record: Record,
}

impl Entity {
    /// A blank entity of the given type.
    pub fn new(descriptor: Arc<EntityDescriptor>) -> Self {
        Self::from_record(descriptor, Record::new())
    }

    pub fn from_record(descriptor: Arc<EntityDescriptor>, record: Record) -> Self {
        Self { descriptor, record }
    }

    pub fn descriptor(&self) -> &Arc<EntityDescriptor> {
        &self.descriptor
    }

    pub fn entity_type(&self) -> &str {
        &self.descriptor.entity_type
    }

    pub fn storage_name(&self) -> &str {
        &self.descriptor.storage_name
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    /// Reads a physical field.
    pub fn get(&self, field: &str) -> Option<&DataValue> {
        self.record.get(field)
    }

    /// Writes a physical field, tracking the change.
    pub fn set(&mut self, field: &str, value: impl Into<DataValue>) -> bool {
        self.record.set(field, value)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(DataValue::as_str)
    }

    pub fn get_number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(DataValue::as_f64)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        match self.get(field) {
            Some(DataValue::Boolean(v)) => Some(*v),
            _ => None,
        }
    }

    /// Per-record cache namespace override, if any.
    pub fn storage_key(&self) -> Option<&str> {
        self.get_str(STORAGE_KEY_FIELD).filter(|s| !s.is_empty())
    }

    /// Per-record cache expiry override, if any.
    pub fn cache_expire(&self) -> Option<DateTime<Utc>> {
        self.get(CACHE_EXPIRE_FIELD)
            .filter(|v| !v.is_unset())
            .and_then(DataValue::as_timestamp)
    }

    /// True when the soft-delete field is declared and set.
    pub fn is_deleted(&self) -> bool {
        self.descriptor
            .soft_delete_field
            .as_deref()
            .and_then(|f| self.get_bool(f))
            .unwrap_or(false)
    }
}
