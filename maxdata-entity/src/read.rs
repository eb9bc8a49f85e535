//! Query entry points.
//!
//! Every query starts from the type's base predicate. Caller filters are
//! ANDed onto it as one parenthesized group. The `*_cache` variants memoize
//! the stored rows under a key derived from the whole query signature, in
//! the namespace that writes to the type invalidate.
//!
//! Storage failures on the read path are logged and read as "no rows".

use crate::repository::EntityRepository;
use maxdata_cache::{cache_key, record_namespace};
use maxdata_model::{Entity, EntityDescriptor, Record};
use maxdata_storage::{DataQuery, FilterIndex, Operator, OrderBy, Page};
use maxdata_types::DataValue;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Paging, ordering and field selection of a read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub page: Page,
    /// `"Property"`, `"Property asc"` or `"Property desc"`.
    pub order_by: Option<String>,
    /// Properties to load; empty loads every field. Key fields are always
    /// loaded.
    pub fields: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, index: usize, size: usize) -> Self {
        self.page = Page::new(index, size);
        self
    }

    #[must_use]
    pub fn order_by(mut self, order_by: &str) -> Self {
        self.order_by = Some(order_by.to_string());
        self
    }

    #[must_use]
    pub fn fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }
}

/// One page of entities with the number of rows matching overall.
#[derive(Debug, Clone)]
pub struct Paged {
    pub items: Vec<Entity>,
    pub total: usize,
}

/// Everything that distinguishes one cached read from another.
#[derive(Serialize)]
struct QuerySignature<'a> {
    query: &'a DataQuery,
    page_index: usize,
    page_size: usize,
    order_by: Option<String>,
    fields: &'a [String],
}

/// A read translated to physical field names.
struct PlannedRead {
    query: DataQuery,
    page: Page,
    order_by: Option<OrderBy>,
    fields: Vec<String>,
}

impl EntityRepository {
    // ── By key ───────────────────────────────────────────────────

    /// Loads the stored entity whose key equals the template's.
    pub fn load_by_key(&self, template: &Entity) -> Option<Entity> {
        let planned = self.plan_by_key(template)?;
        self.fetch(template, &planned).into_iter().next()
    }

    /// [`load_by_key`](Self::load_by_key) through the record's cache
    /// namespace.
    pub fn load_by_key_cache(&self, template: &Entity) -> Option<Entity> {
        let planned = self.plan_by_key(template)?;
        let data_key = self.registry.data_key(template)?;
        let namespace = record_namespace(template.storage_name(), template.storage_key(), &data_key);
        self.fetch_cached(template, &namespace, &planned).into_iter().next()
    }

    // ── Lists ────────────────────────────────────────────────────

    /// Loads every entity the base predicate admits.
    pub fn load_all(&self, template: &Entity, selection: &Selection) -> Vec<Entity> {
        let planned = self.plan(template.descriptor(), self.base_query(template.descriptor()), selection);
        self.fetch(template, &planned)
    }

    pub fn load_all_cache(&self, template: &Entity, selection: &Selection) -> Vec<Entity> {
        let planned = self.plan(template.descriptor(), self.base_query(template.descriptor()), selection);
        self.fetch_cached(template, &self.load_all_namespace(template), &planned)
    }

    /// Loads the entities whose `property` equals `value`.
    ///
    /// A property that does not resolve to a single field loads nothing.
    pub fn load_all_by_property(
        &self,
        template: &Entity,
        property: &str,
        value: impl Into<DataValue>,
        selection: &Selection,
    ) -> Vec<Entity> {
        match self.property_query(template.descriptor(), property, value.into()) {
            Some(query) => {
                let planned = self.plan(template.descriptor(), query, selection);
                self.fetch(template, &planned)
            }
            None => Vec::new(),
        }
    }

    pub fn load_all_by_property_cache(
        &self,
        template: &Entity,
        property: &str,
        value: impl Into<DataValue>,
        selection: &Selection,
    ) -> Vec<Entity> {
        match self.property_query(template.descriptor(), property, value.into()) {
            Some(query) => {
                let planned = self.plan(template.descriptor(), query, selection);
                self.fetch_cached(template, &self.load_all_namespace(template), &planned)
            }
            None => Vec::new(),
        }
    }

    /// Loads one page of the entities matching `filter`, with the total
    /// number of matching rows.
    ///
    /// A filter naming a property that does not resolve to a single field
    /// matches nothing.
    pub fn load_all_by_page_filter(&self, template: &Entity, filter: &FilterIndex, selection: &Selection) -> Paged {
        let Some(query) = self.filter_query(template.descriptor(), filter) else {
            return Paged {
                items: Vec::new(),
                total: 0,
            };
        };
        let total = self.count_query(template.descriptor(), &query);
        let planned = self.plan(template.descriptor(), query, selection);
        Paged {
            items: self.fetch(template, &planned),
            total,
        }
    }

    pub fn load_all_by_filter_cache(&self, template: &Entity, filter: &FilterIndex, selection: &Selection) -> Vec<Entity> {
        let Some(query) = self.filter_query(template.descriptor(), filter) else {
            return Vec::new();
        };
        let planned = self.plan(template.descriptor(), query, selection);
        self.fetch_cached(template, &self.load_all_namespace(template), &planned)
    }

    /// Number of stored rows matching `filter` and the base predicate.
    pub fn count(&self, template: &Entity, filter: &FilterIndex) -> usize {
        self.filter_query(template.descriptor(), filter)
            .map_or(0, |query| self.count_query(template.descriptor(), &query))
    }

    // ── Query building ───────────────────────────────────────────

    fn filter_query(&self, descriptor: &EntityDescriptor, filter: &FilterIndex) -> Option<DataQuery> {
        let caller = filter.to_query(|property| self.registry.resolve_single_field(descriptor, property))?;
        let mut query = self.base_query(descriptor);
        query.append_group(caller);
        Some(query)
    }

    fn property_query(&self, descriptor: &EntityDescriptor, property: &str, value: DataValue) -> Option<DataQuery> {
        let Some(field) = self.registry.resolve_single_field(descriptor, property) else {
            warn!(storage = %descriptor.storage_name, property, "property does not resolve to a single field");
            return None;
        };
        let mut query = self.base_query(descriptor);
        query.append_group(DataQuery::equal(&field, value));
        Some(query)
    }

    fn plan_by_key(&self, template: &Entity) -> Option<PlannedRead> {
        let descriptor = template.descriptor();
        let mut by_key = DataQuery::new();
        for property in self.registry.key_properties(descriptor).iter() {
            let field = self.registry.resolve_single_field(descriptor, property)?;
            let Some(value) = self.registry.property_value(template, property) else {
                debug!(storage = %descriptor.storage_name, property = %property, "key value missing; nothing to load");
                return None;
            };
            by_key = by_key.and(&field, Operator::Equal, value);
        }
        if by_key.is_empty() {
            debug!(storage = %descriptor.storage_name, "type has no key");
            return None;
        }

        let mut query = self.base_query(descriptor);
        query.append_group(by_key);
        Some(self.plan(descriptor, query, &Selection::new().page(0, 1)))
    }

    /// Resolves the selection's properties to physical fields.
    ///
    /// Composite properties load each of their fields. Key fields are added
    /// to any non-empty field list. An order-by property that does not
    /// resolve to exactly one field is dropped.
    fn plan(&self, descriptor: &EntityDescriptor, query: DataQuery, selection: &Selection) -> PlannedRead {
        let mut fields: Vec<String> = Vec::new();
        if !selection.fields.is_empty() {
            for property in &selection.fields {
                let resolved = self.registry.resolve_field(descriptor, property);
                if resolved.is_empty() {
                    warn!(storage = %descriptor.storage_name, property = %property, "unknown property not loaded");
                    continue;
                }
                for field in resolved.split('\t') {
                    if !fields.iter().any(|f| f == field) {
                        fields.push(field.to_string());
                    }
                }
            }
            for key in self.registry.key_field_names(descriptor) {
                if !fields.contains(&key) {
                    fields.push(key);
                }
            }
        }

        let order_by = selection.order_by.as_deref().and_then(|spec| {
            let requested = OrderBy::parse(spec)?;
            match self.registry.resolve_single_field(descriptor, &requested.field) {
                Some(field) => Some(OrderBy {
                    field,
                    descending: requested.descending,
                }),
                None => {
                    warn!(storage = %descriptor.storage_name, order_by = spec, "order-by property is not a single field; ordering dropped");
                    None
                }
            }
        });

        PlannedRead {
            query,
            page: selection.page,
            order_by,
            fields,
        }
    }

    // ── Execution ────────────────────────────────────────────────

    fn select_rows(&self, descriptor: &EntityDescriptor, planned: &PlannedRead) -> Option<Vec<Record>> {
        let selected = self.storage.select(
            descriptor,
            &planned.query,
            planned.page,
            planned.order_by.as_ref(),
            &planned.fields,
        );
        match selected {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!(storage = %descriptor.storage_name, error = %e, "select failed");
                None
            }
        }
    }

    fn count_query(&self, descriptor: &EntityDescriptor, query: &DataQuery) -> usize {
        self.storage.select_count(descriptor, query).unwrap_or_else(|e| {
            warn!(storage = %descriptor.storage_name, error = %e, "count failed");
            0
        })
    }

    fn fetch(&self, template: &Entity, planned: &PlannedRead) -> Vec<Entity> {
        let rows = self.select_rows(template.descriptor(), planned).unwrap_or_default();
        self.to_entities(template.descriptor(), rows)
    }

    /// Cached rows hold the stored form, so sealed fields stay sealed in
    /// the cache and are opened on every read.
    fn fetch_cached(&self, template: &Entity, namespace: &str, planned: &PlannedRead) -> Vec<Entity> {
        let descriptor = template.descriptor();
        let signature = QuerySignature {
            query: &planned.query,
            page_index: planned.page.index,
            page_size: planned.page.size,
            order_by: planned
                .order_by
                .as_ref()
                .map(|o| format!("{} {}", o.field, if o.descending { "desc" } else { "asc" })),
            fields: &planned.fields,
        };
        let key = match cache_key(namespace, &signature) {
            Ok(key) => key,
            Err(e) => {
                warn!(storage = %descriptor.storage_name, error = %e, "query signature not hashable; reading through");
                return self.fetch(template, planned);
            }
        };

        if let Some(rows) = self.cache.get::<Vec<Record>>(&key) {
            return self.to_entities(descriptor, rows);
        }
        let Some(rows) = self.select_rows(descriptor, planned) else {
            return Vec::new();
        };
        self.cache.put(&key, &rows, template.cache_expire());
        self.to_entities(descriptor, rows)
    }

    fn to_entities(&self, descriptor: &Arc<EntityDescriptor>, rows: Vec<Record>) -> Vec<Entity> {
        rows.into_iter()
            .map(|row| Entity::from_record(Arc::clone(descriptor), self.codec.decode(descriptor, row)))
            .collect()
    }
}
