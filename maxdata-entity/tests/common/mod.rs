//! Shared descriptors, storage doubles and repository fixtures.

#![allow(dead_code)]

use maxdata_cache::MemoryCacheRepository;
use maxdata_crypto::{KeyEncryptor, Lz4Compressor};
use maxdata_entity::{EntityRepository, RepositoryConfig};
use maxdata_model::{
    Entity, EntityDescriptor, EntityListener, EntityRegistry, FieldDescriptor, PropertyDescriptor, Record,
};
use maxdata_storage::{
    DataQuery, MemoryProvider, OrderBy, Page, ReadProvider, StorageError, StorageResult,
    WriteProvider,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Descriptors ──────────────────────────────────────────────────

/// Identifier key, sealed fields, soft delete and timestamps.
pub fn contact_descriptor() -> EntityDescriptor {
    EntityDescriptor::builder("Contact", "contacts")
        .key(FieldDescriptor::identifier("Id"))
        .field(FieldDescriptor::text("First"))
        .field(FieldDescriptor::text("Last"))
        .field(FieldDescriptor::integer("Age"))
        .field(FieldDescriptor::text("Email").encrypted())
        .field(FieldDescriptor::text("Notes").compressed().encrypted())
        .field(FieldDescriptor::text_list("Tags").compressed())
        .field(FieldDescriptor::boolean("Deleted"))
        .field(FieldDescriptor::datetime("Modified"))
        .field(FieldDescriptor::datetime("Created"))
        .property(PropertyDescriptor::composite("FullName", &["First", "Last"]))
        .soft_delete("Deleted")
        .last_update("Modified")
        .created("Created")
        .build()
        .unwrap()
}

/// Integer key, physically deleted.
pub fn event_descriptor() -> EntityDescriptor {
    EntityDescriptor::builder("Event", "events")
        .key(FieldDescriptor::integer("Id"))
        .field(FieldDescriptor::text("Kind"))
        .field(FieldDescriptor::integer("Size"))
        .build()
        .unwrap()
}

/// Versioned per document.
pub fn revision_descriptor() -> EntityDescriptor {
    EntityDescriptor::builder("Revision", "revisions")
        .key(FieldDescriptor::identifier("Id"))
        .field(FieldDescriptor::text("DocId"))
        .field(FieldDescriptor::integer("Version"))
        .field(FieldDescriptor::text("Body"))
        .versioned("Version", "DocId")
        .build()
        .unwrap()
}

// ── Storage doubles ──────────────────────────────────────────────

/// Memory storage whose first `failures` writes fail.
pub struct FlakyStorage {
    pub inner: MemoryProvider,
    failures_left: AtomicUsize,
    write_calls: AtomicUsize,
}

impl FlakyStorage {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: MemoryProvider::new(),
            failures_left: AtomicUsize::new(failures),
            write_calls: AtomicUsize::new(0),
        }
    }

    pub fn always_failing() -> Self {
        Self::new(usize::MAX)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn write<T>(&self, op: impl FnOnce() -> StorageResult<T>) -> StorageResult<T> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(StorageError::Unavailable("connection reset".into()));
        }
        op()
    }
}

impl ReadProvider for FlakyStorage {
    fn select(
        &self,
        descriptor: &EntityDescriptor,
        query: &DataQuery,
        page: Page,
        order_by: Option<&OrderBy>,
        fields: &[String],
    ) -> StorageResult<Vec<Record>> {
        self.inner.select(descriptor, query, page, order_by, fields)
    }

    fn select_count(&self, descriptor: &EntityDescriptor, query: &DataQuery) -> StorageResult<usize> {
        self.inner.select_count(descriptor, query)
    }
}

impl WriteProvider for FlakyStorage {
    fn insert(&self, descriptor: &EntityDescriptor, records: &[Record]) -> StorageResult<usize> {
        self.write(|| self.inner.insert(descriptor, records))
    }

    fn update(&self, descriptor: &EntityDescriptor, records: &[Record]) -> StorageResult<usize> {
        self.write(|| self.inner.update(descriptor, records))
    }

    fn delete(&self, descriptor: &EntityDescriptor, records: &[Record]) -> StorageResult<usize> {
        self.write(|| self.inner.delete(descriptor, records))
    }
}

// ── Listeners ────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: &str, entity: &Entity) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{event}:{}", entity.entity_type()));
    }
}

impl EntityListener for RecordingListener {
    fn before_insert(&self, entity: &Entity) {
        self.push("before_insert", entity);
    }
    fn after_insert(&self, entity: &Entity) {
        self.push("after_insert", entity);
    }
    fn insert_failed(&self, entity: &Entity) {
        self.push("insert_failed", entity);
    }
    fn before_update(&self, entity: &Entity) {
        self.push("before_update", entity);
    }
    fn after_update(&self, entity: &Entity) {
        self.push("after_update", entity);
    }
    fn update_failed(&self, entity: &Entity) {
        self.push("update_failed", entity);
    }
    fn before_delete(&self, entity: &Entity) {
        self.push("before_delete", entity);
    }
    fn after_delete(&self, entity: &Entity) {
        self.push("after_delete", entity);
    }
    fn delete_failed(&self, entity: &Entity) {
        self.push("delete_failed", entity);
    }
}

// ── Fixture ──────────────────────────────────────────────────────

/// Retries without waiting.
pub fn fast_config() -> RepositoryConfig {
    RepositoryConfig {
        retry_delay_ms: 0,
        ..RepositoryConfig::default()
    }
}

pub fn registry() -> Arc<EntityRegistry> {
    let registry = Arc::new(EntityRegistry::new());
    registry.register(contact_descriptor()).unwrap();
    registry.register(event_descriptor()).unwrap();
    registry.register(revision_descriptor()).unwrap();
    registry
}

pub struct Fixture {
    pub storage: Arc<FlakyStorage>,
    pub cache: Arc<MemoryCacheRepository>,
    pub listener: Arc<RecordingListener>,
    pub encryptor: Arc<KeyEncryptor>,
    pub repo: EntityRepository,
}

pub fn fixture() -> Fixture {
    fixture_with(FlakyStorage::new(0))
}

/// Routes repository logs to the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fixture_with(storage: FlakyStorage) -> Fixture {
    init_tracing();
    let storage = Arc::new(storage);
    let cache = Arc::new(MemoryCacheRepository::new());
    let listener = Arc::new(RecordingListener::default());
    let encryptor = Arc::new(KeyEncryptor::random());
    let repo = EntityRepository::builder()
        .config(fast_config())
        .registry(registry())
        .storage(storage.clone())
        .cache(cache.clone())
        .encryptor(encryptor.clone())
        .compressor(Arc::new(Lz4Compressor))
        .listener(listener.clone())
        .build()
        .unwrap();
    Fixture {
        storage,
        cache,
        listener,
        encryptor,
        repo,
    }
}

impl Fixture {
    pub fn contact(&self, first: &str, last: &str, age: i32) -> Entity {
        let mut e = self.repo.new_entity("Contact").unwrap();
        e.set("First", first);
        e.set("Last", last);
        e.set("Age", age);
        e
    }

    pub fn event(&self, id: i32, kind: &str, size: i32) -> Entity {
        let mut e = self.repo.new_entity("Event").unwrap();
        e.set("Id", id);
        e.set("Kind", kind);
        e.set("Size", size);
        e
    }

    pub fn revision(&self, doc: &str, body: &str) -> Entity {
        let mut e = self.repo.new_entity("Revision").unwrap();
        e.set("DocId", doc);
        e.set("Body", body);
        e
    }

    /// A blank entity of `entity_type` to read through.
    pub fn template(&self, entity_type: &str) -> Entity {
        self.repo.new_entity(entity_type).unwrap()
    }

    /// A template carrying only the key of `entity`.
    pub fn key_of(&self, entity: &Entity) -> Entity {
        let mut template = self.template(entity.entity_type());
        for field in &entity.descriptor().key_fields {
            template.set(field, entity.get(field).unwrap().clone());
        }
        template
    }

    pub fn stored(&self, storage_name: &str) -> Vec<Record> {
        self.storage.inner.rows(storage_name)
    }
}
