//! In-memory storage provider.
//!
//! Rows live in a map keyed by storage name, guarded by one `RwLock`.
//! Key uniqueness is enforced on the descriptor's key fields. Used by
//! tests and by embedders that need no persistence.

use crate::error::{StorageError, StorageResult};
use crate::provider::{OrderBy, Page, ReadProvider, WriteProvider};
use crate::query::DataQuery;
use maxdata_model::{EntityDescriptor, Record};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryProvider {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row stored under `storage_name`.
    pub fn rows(&self, storage_name: &str) -> Vec<Record> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(storage_name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self, storage_name: &str) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(storage_name)
            .map_or(0, Vec::len)
    }
}

fn row_key(descriptor: &EntityDescriptor, record: &Record) -> Option<String> {
    if descriptor.key_fields.is_empty() {
        return None;
    }
    let parts: Option<Vec<String>> = descriptor
        .key_fields
        .iter()
        .map(|f| record.get(f).filter(|v| !v.is_unset()).map(ToString::to_string))
        .collect();
    parts.map(|p| p.join("\u{1f}"))
}

fn compare_rows(a: &Record, b: &Record, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

impl ReadProvider for MemoryProvider {
    fn select(
        &self,
        descriptor: &EntityDescriptor,
        query: &DataQuery,
        page: Page,
        order_by: Option<&OrderBy>,
        fields: &[String],
    ) -> StorageResult<Vec<Record>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<Record> = tables
            .get(&descriptor.storage_name)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        drop(tables);

        if let Some(order) = order_by {
            rows.sort_by(|a, b| {
                let ordering = compare_rows(a, b, &order.field);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if page.size > 0 {
            rows = rows
                .into_iter()
                .skip(page.index.saturating_mul(page.size))
                .take(page.size)
                .collect();
        }

        if !fields.is_empty() {
            for row in &mut rows {
                row.retain(|name| fields.iter().any(|f| f == name));
            }
        }

        debug!(storage = %descriptor.storage_name, rows = rows.len(), "select");
        Ok(rows)
    }

    fn select_count(&self, descriptor: &EntityDescriptor, query: &DataQuery) -> StorageResult<usize> {
        Ok(self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&descriptor.storage_name)
            .map_or(0, |rows| rows.iter().filter(|r| query.matches(r)).count()))
    }
}

impl WriteProvider for MemoryProvider {
    fn insert(&self, descriptor: &EntityDescriptor, records: &[Record]) -> StorageResult<usize> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let table = tables.entry(descriptor.storage_name.clone()).or_default();

        // Reject the whole batch before touching the table.
        let mut incoming: Vec<String> = Vec::new();
        for record in records {
            if let Some(key) = row_key(descriptor, record) {
                let clash = incoming.contains(&key)
                    || table.iter().any(|r| row_key(descriptor, r).as_deref() == Some(key.as_str()));
                if clash {
                    return Err(StorageError::DuplicateKey {
                        storage: descriptor.storage_name.clone(),
                        key,
                    });
                }
                incoming.push(key);
            }
        }

        table.extend(records.iter().cloned());
        debug!(storage = %descriptor.storage_name, rows = records.len(), "insert");
        Ok(records.len())
    }

    fn update(&self, descriptor: &EntityDescriptor, records: &[Record]) -> StorageResult<usize> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let Some(table) = tables.get_mut(&descriptor.storage_name) else {
            return Ok(0);
        };

        let mut updated = 0;
        for record in records {
            let Some(key) = row_key(descriptor, record) else {
                continue;
            };
            if let Some(row) = table
                .iter_mut()
                .find(|r| row_key(descriptor, r).as_deref() == Some(key.as_str()))
            {
                for (name, value) in record.iter() {
                    row.load(name, value.clone());
                }
                updated += 1;
            }
        }
        debug!(storage = %descriptor.storage_name, rows = updated, "update");
        Ok(updated)
    }

    fn delete(&self, descriptor: &EntityDescriptor, records: &[Record]) -> StorageResult<usize> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let Some(table) = tables.get_mut(&descriptor.storage_name) else {
            return Ok(0);
        };

        let keys: Vec<String> = records.iter().filter_map(|r| row_key(descriptor, r)).collect();
        let before = table.len();
        table.retain(|r| row_key(descriptor, r).is_none_or(|k| !keys.contains(&k)));
        let deleted = before - table.len();
        debug!(storage = %descriptor.storage_name, rows = deleted, "delete");
        Ok(deleted)
    }
}
