//! Process-wide registry of entity descriptors.
//!
//! Owns the two memoized lookups every read and write path goes through:
//! property-name resolution (per storage name and property) and key
//! properties (per entity type). Both are filled on first access with a
//! check-lock-check sequence so the common case only takes a read lock.

use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::schema::EntityDescriptor;
use maxdata_types::DataValue;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Separator between the physical fields of a composite property.
pub(crate) const COMPOSITE_SEPARATOR: char = '\t';

const DEFAULT_KEY_SEPARATOR: &str = "|";

/// Registry of entity descriptors plus the resolution caches built on them.
///
/// Construct one at startup and share it (`Arc<EntityRegistry>`) with every
/// component that needs descriptors.
#[derive(Debug)]
pub struct EntityRegistry {
    descriptors: RwLock<HashMap<String, Arc<EntityDescriptor>>>,
    field_names: RwLock<HashMap<(String, String), String>>,
    key_properties: RwLock<HashMap<String, Arc<[String]>>>,
    key_separator: String,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::with_key_separator(DEFAULT_KEY_SEPARATOR)
    }

    /// Creates a registry that joins key values with `separator`.
    pub fn with_key_separator(separator: &str) -> Self {
        Self {
            descriptors: RwLock::new(HashMap::new()),
            field_names: RwLock::new(HashMap::new()),
            key_properties: RwLock::new(HashMap::new()),
            key_separator: separator.into(),
        }
    }

    pub fn key_separator(&self) -> &str {
        &self.key_separator
    }

    // ── Descriptors ──────────────────────────────────────────────

    /// Registers a descriptor. Registering the same entity type twice is
    /// a contract violation.
    pub fn register(&self, descriptor: EntityDescriptor) -> ModelResult<Arc<EntityDescriptor>> {
        descriptor.validate()?;
        let mut descriptors = self.descriptors.write().unwrap_or_else(PoisonError::into_inner);
        if descriptors.contains_key(&descriptor.entity_type) {
            return Err(ModelError::DuplicateEntityType(descriptor.entity_type));
        }
        let descriptor = Arc::new(descriptor);
        descriptors.insert(descriptor.entity_type.clone(), Arc::clone(&descriptor));
        debug!(entity_type = %descriptor.entity_type, storage = %descriptor.storage_name, "registered entity descriptor");
        Ok(descriptor)
    }

    /// Returns the descriptor for `entity_type`.
    pub fn descriptor(&self, entity_type: &str) -> ModelResult<Arc<EntityDescriptor>> {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity_type)
            .cloned()
            .ok_or_else(|| ModelError::UnknownEntityType(entity_type.into()))
    }

    /// Returns the descriptor for `entity_type`, building and registering it
    /// on first access.
    pub fn descriptor_or_init(
        &self,
        entity_type: &str,
        init: impl FnOnce() -> ModelResult<EntityDescriptor>,
    ) -> ModelResult<Arc<EntityDescriptor>> {
        if let Ok(found) = self.descriptor(entity_type) {
            return Ok(found);
        }

        let mut descriptors = self.descriptors.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = descriptors.get(entity_type) {
            return Ok(Arc::clone(found));
        }
        let descriptor = init()?;
        descriptor.validate()?;
        if descriptor.entity_type != entity_type {
            return Err(ModelError::InvalidDescriptor {
                entity_type: entity_type.into(),
                reason: format!("initializer produced {}", descriptor.entity_type),
            });
        }
        let descriptor = Arc::new(descriptor);
        descriptors.insert(entity_type.into(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    // ── Field resolution ─────────────────────────────────────────

    /// Resolves a property name to its physical field name.
    ///
    /// Returns the property itself when it names a physical field, the
    /// tab-joined physical fields of a declared virtual property, or an empty
    /// string when the property is unknown.
    pub fn resolve_field(&self, descriptor: &EntityDescriptor, property: &str) -> String {
        let cache_key = (descriptor.storage_name.clone(), property.to_string());
        if let Some(found) = self
            .field_names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cache_key)
        {
            return found.clone();
        }

        let resolved = if descriptor.field(property).is_some() {
            property.to_string()
        } else if let Some(p) = descriptor.property(property) {
            p.storage_fields.join("\t")
        } else {
            String::new()
        };

        self.field_names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(cache_key)
            .or_insert(resolved)
            .clone()
    }

    /// Resolves a property to exactly one physical field.
    ///
    /// Unknown and composite properties yield `None`; callers needing a
    /// single field (ordering, filtering) skip them.
    pub fn resolve_single_field(&self, descriptor: &EntityDescriptor, property: &str) -> Option<String> {
        let resolved = self.resolve_field(descriptor, property);
        if resolved.is_empty() || resolved.contains(COMPOSITE_SEPARATOR) {
            None
        } else {
            Some(resolved)
        }
    }

    // ── Keys ─────────────────────────────────────────────────────

    /// Property names that make up the key of `descriptor`'s entity type,
    /// sorted lexicographically.
    ///
    /// A property counts when it resolves to one of the declared key fields;
    /// when several properties resolve to the same key field, the first in
    /// sorted order wins.
    pub fn key_properties(&self, descriptor: &EntityDescriptor) -> Arc<[String]> {
        if let Some(found) = self
            .key_properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&descriptor.entity_type)
        {
            return Arc::clone(found);
        }

        let mut cache = self.key_properties.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = cache.get(&descriptor.entity_type) {
            return Arc::clone(found);
        }

        let mut names: Vec<&str> = descriptor
            .declared_properties()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        names.sort_unstable();

        let mut seen_fields: Vec<String> = Vec::new();
        let mut keys: Vec<String> = Vec::new();
        for name in names {
            let Some(field) = self.resolve_single_field(descriptor, name) else {
                continue;
            };
            if descriptor.key_fields.contains(&field) && !seen_fields.contains(&field) {
                seen_fields.push(field);
                keys.push(name.to_string());
            }
        }

        let keys: Arc<[String]> = keys.into();
        cache.insert(descriptor.entity_type.clone(), Arc::clone(&keys));
        keys
    }

    /// Physical fields backing the key properties.
    pub fn key_field_names(&self, descriptor: &EntityDescriptor) -> Vec<String> {
        self.key_properties(descriptor)
            .iter()
            .filter_map(|p| self.resolve_single_field(descriptor, p))
            .collect()
    }

    /// The key of an entity: key-property values joined by the separator.
    ///
    /// `None` when the type has no key or any key value is missing or unset.
    pub fn data_key(&self, entity: &Entity) -> Option<String> {
        let keys = self.key_properties(entity.descriptor());
        if keys.is_empty() {
            return None;
        }
        let mut parts = Vec::with_capacity(keys.len());
        for property in keys.iter() {
            parts.push(self.property_value(entity, property)?.to_string());
        }
        Some(parts.join(self.key_separator.as_str()))
    }

    // ── Values ───────────────────────────────────────────────────

    /// Reads a property through field resolution.
    ///
    /// Unset sentinels read as `None`. Composite properties read as the
    /// present parts joined by a single space.
    pub fn property_value(&self, entity: &Entity, property: &str) -> Option<DataValue> {
        let resolved = self.resolve_field(entity.descriptor(), property);
        if resolved.is_empty() {
            return None;
        }
        if !resolved.contains(COMPOSITE_SEPARATOR) {
            return entity.get(&resolved).filter(|v| !v.is_unset()).cloned();
        }

        let parts: Vec<String> = resolved
            .split(COMPOSITE_SEPARATOR)
            .filter_map(|f| entity.get(f))
            .filter(|v| !v.is_unset())
            .map(ToString::to_string)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(DataValue::Text(parts.join(" ")))
        }
    }
}
