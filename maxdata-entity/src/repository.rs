use crate::behavior::{DefaultBehavior, EntityBehavior};
use crate::codec::FieldCodec;
use crate::config::RepositoryConfig;
use crate::error::{EntityError, EntityResult};
use crate::version::VersionIssuer;
use chrono::Utc;
use maxdata_cache::{load_all_namespace, record_namespace, CacheRepository, NoopCacheRepository, QueryCache};
use maxdata_crypto::{DataCompressor, DataEncryptor, PassthroughCompressor, PassthroughEncryptor};
use maxdata_model::{Entity, EntityDescriptor, EntityListener, EntityRegistry, FieldType};
use maxdata_projection::Projector;
use maxdata_storage::{DataQuery, OrderBy, Page, StorageProvider};
use maxdata_types::{DataValue, RecordId, TimestampIssuer};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Reads and writes entities through the injected collaborators.
///
/// One repository serves every registered entity type. It is `Send + Sync`
/// and meant to be shared behind an `Arc`.
pub struct EntityRepository {
    pub(crate) registry: Arc<EntityRegistry>,
    pub(crate) storage: Arc<dyn StorageProvider>,
    pub(crate) cache: QueryCache,
    pub(crate) codec: FieldCodec,
    listeners: Vec<Arc<dyn EntityListener>>,
    behaviors: HashMap<String, Arc<dyn EntityBehavior>>,
    default_behavior: DefaultBehavior,
    timestamps: Arc<TimestampIssuer>,
    versions: Arc<VersionIssuer>,
    pub(crate) config: RepositoryConfig,
}

impl EntityRepository {
    pub fn builder() -> EntityRepositoryBuilder {
        EntityRepositoryBuilder::default()
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// A projector over this repository's registry.
    pub fn projector(&self) -> Projector {
        Projector::new(Arc::clone(&self.registry))
    }

    /// A blank entity of a registered type.
    pub fn new_entity(&self, entity_type: &str) -> EntityResult<Entity> {
        Ok(Entity::new(self.registry.descriptor(entity_type)?))
    }

    pub(crate) fn behavior(&self, entity_type: &str) -> &dyn EntityBehavior {
        match self.behaviors.get(entity_type) {
            Some(behavior) => behavior.as_ref(),
            None => &self.default_behavior,
        }
    }

    /// The standing predicate of a type.
    pub fn base_query(&self, descriptor: &EntityDescriptor) -> DataQuery {
        self.behavior(&descriptor.entity_type).base_query(descriptor)
    }

    pub(crate) fn notify(&self, entity: &Entity, event: impl Fn(&dyn EntityListener, &Entity)) {
        for listener in &self.listeners {
            event(listener.as_ref(), entity);
        }
    }

    // ── Cache namespaces ─────────────────────────────────────────

    pub(crate) fn load_all_namespace(&self, entity: &Entity) -> String {
        load_all_namespace(entity.storage_name(), entity.storage_key())
    }

    /// `None` when the entity has no complete key.
    pub(crate) fn record_namespace(&self, entity: &Entity) -> Option<String> {
        let data_key = self.registry.data_key(entity)?;
        Some(record_namespace(entity.storage_name(), entity.storage_key(), &data_key))
    }

    // ── Initial values ───────────────────────────────────────────

    /// Fills the values a new entity needs, then runs the type's hook.
    ///
    /// Only unset fields are touched: identifier key fields get a fresh
    /// time-ordered id, the created field gets a strictly increasing
    /// timestamp, the version field gets the group's next version and the
    /// soft-delete flag starts out false.
    pub fn set_initial(&self, entity: &mut Entity) {
        let descriptor = Arc::clone(entity.descriptor());

        for key in &descriptor.key_fields {
            let is_identifier = descriptor
                .field(key)
                .is_some_and(|f| f.field_type == FieldType::Identifier);
            if is_identifier && is_blank(entity.get(key)) {
                entity.set(key, RecordId::new());
            }
        }
        if let Some(created) = &descriptor.created_field {
            if is_blank(entity.get(created)) {
                entity.set(created, self.timestamps.issue());
            }
        }
        if let Some(deleted) = &descriptor.soft_delete_field {
            if entity.get(deleted).is_none() {
                entity.set(deleted, false);
            }
        }
        if let Some(version_field) = &descriptor.version_field {
            if is_blank(entity.get(version_field)) {
                let version = self.next_version(entity, version_field);
                let value = match descriptor.field(version_field).map(|f| f.field_type) {
                    Some(FieldType::Integer) => DataValue::Integer(i32::try_from(version).unwrap_or(i32::MAX)),
                    _ => DataValue::Long(version),
                };
                entity.set(version_field, value);
            }
        }

        self.behavior(&descriptor.entity_type).set_initial(entity);
    }

    /// Refreshes the last-update time, then runs the type's hook.
    pub fn set_properties(&self, entity: &mut Entity) {
        let descriptor = Arc::clone(entity.descriptor());
        if let Some(field) = &descriptor.last_update_field {
            entity.set(field, Utc::now());
        }
        self.behavior(&descriptor.entity_type).set_properties(entity);
    }

    fn next_version(&self, entity: &Entity, version_field: &str) -> i64 {
        let descriptor = entity.descriptor();
        let group = descriptor.version_group_field.as_deref().and_then(|field| {
            entity
                .get(field)
                .filter(|v| !v.is_unset())
                .map(|v| (field, v.clone()))
        });
        let group_text = group.as_ref().map(|(_, v)| v.to_string()).unwrap_or_default();

        self.versions.next(&descriptor.storage_name, &group_text, || {
            let query = match &group {
                Some((field, value)) => DataQuery::equal(field, value.clone()),
                None => DataQuery::new(),
            };
            let newest = self.storage.select(
                descriptor,
                &query,
                Page::new(0, 1),
                Some(&OrderBy::desc(version_field)),
                &[version_field.to_string()],
            );
            match newest {
                Ok(rows) => rows
                    .first()
                    .and_then(|r| r.get(version_field))
                    .filter(|v| !v.is_unset())
                    .and_then(DataValue::as_f64)
                    .map_or(0, |v| v as i64),
                Err(e) => {
                    warn!(storage = %descriptor.storage_name, error = %e, "stored version unreadable; counting from issued versions");
                    0
                }
            }
        })
    }
}

fn is_blank(value: Option<&DataValue>) -> bool {
    value.is_none_or(DataValue::is_unset)
}

impl std::fmt::Debug for EntityRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRepository")
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .field("behaviors", &self.behaviors.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Fluent construction of an [`EntityRepository`].
///
/// Only the storage provider is required. Without a registry one is
/// created with the configured key separator; the cache defaults to one
/// that stores nothing and the field providers pass data through.
#[derive(Default)]
pub struct EntityRepositoryBuilder {
    config: RepositoryConfig,
    registry: Option<Arc<EntityRegistry>>,
    storage: Option<Arc<dyn StorageProvider>>,
    cache: Option<Arc<dyn CacheRepository>>,
    encryptor: Option<Arc<dyn DataEncryptor>>,
    compressor: Option<Arc<dyn DataCompressor>>,
    listeners: Vec<Arc<dyn EntityListener>>,
    behaviors: HashMap<String, Arc<dyn EntityBehavior>>,
    timestamps: Option<Arc<TimestampIssuer>>,
    versions: Option<Arc<VersionIssuer>>,
}

impl EntityRepositoryBuilder {
    pub fn config(mut self, config: RepositoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(mut self, registry: Arc<EntityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn StorageProvider>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn CacheRepository>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn encryptor(mut self, encryptor: Arc<dyn DataEncryptor>) -> Self {
        self.encryptor = Some(encryptor);
        self
    }

    pub fn compressor(mut self, compressor: Arc<dyn DataCompressor>) -> Self {
        self.compressor = Some(compressor);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn EntityListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Shares a creation-time issuer with other repositories. Without it
    /// each repository issues strictly increasing times only among its
    /// own inserts.
    pub fn timestamp_issuer(mut self, issuer: Arc<TimestampIssuer>) -> Self {
        self.timestamps = Some(issuer);
        self
    }

    /// Shares a version issuer with other repositories over the same storage.
    pub fn version_issuer(mut self, issuer: Arc<VersionIssuer>) -> Self {
        self.versions = Some(issuer);
        self
    }

    /// Registers the hooks of one entity type, replacing earlier ones.
    pub fn behavior(mut self, entity_type: &str, behavior: Arc<dyn EntityBehavior>) -> Self {
        self.behaviors.insert(entity_type.to_string(), behavior);
        self
    }

    pub fn build(self) -> EntityResult<EntityRepository> {
        let storage = self.storage.ok_or(EntityError::MissingStorage)?;
        if self.config.cache_expire_secs <= 0 {
            return Err(EntityError::Configuration(format!(
                "cache_expire_secs must be positive, got {}",
                self.config.cache_expire_secs
            )));
        }

        let registry = match self.registry {
            Some(registry) => {
                if registry.key_separator() != self.config.key_separator {
                    return Err(EntityError::Configuration(format!(
                        "registry joins keys with {:?} but the configuration asks for {:?}",
                        registry.key_separator(),
                        self.config.key_separator
                    )));
                }
                registry
            }
            None => Arc::new(EntityRegistry::with_key_separator(&self.config.key_separator)),
        };

        let cache = self.cache.unwrap_or_else(|| Arc::new(NoopCacheRepository));
        let codec = FieldCodec::new(
            self.encryptor.unwrap_or_else(|| Arc::new(PassthroughEncryptor)),
            self.compressor.unwrap_or_else(|| Arc::new(PassthroughCompressor)),
        );

        Ok(EntityRepository {
            registry,
            storage,
            cache: QueryCache::new(cache, self.config.cache_ttl()),
            codec,
            listeners: self.listeners,
            behaviors: self.behaviors,
            default_behavior: DefaultBehavior,
            timestamps: self.timestamps.unwrap_or_default(),
            versions: self.versions.unwrap_or_default(),
            config: self.config,
        })
    }
}
