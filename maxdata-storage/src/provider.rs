use crate::error::StorageResult;
use crate::query::DataQuery;
use maxdata_model::{EntityDescriptor, Record};

/// Ordering requested from a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Parses `"Field"`, `"Field asc"` or `"Field desc"`.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut parts = spec.split_whitespace();
        let field = parts.next()?;
        let descending = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(_) => return None,
        };
        Some(Self {
            field: field.into(),
            descending,
        })
    }
}

/// One page of a select. `size == 0` selects every matching row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub size: usize,
}

impl Page {
    pub const ALL: Self = Self { index: 0, size: 0 };

    pub fn new(index: usize, size: usize) -> Self {
        Self { index, size }
    }
}

/// Read side of a storage backend.
///
/// The descriptor identifies the storage name and the shape of the rows.
/// Returned records must come back with no changed flags.
pub trait ReadProvider: Send + Sync {
    /// Selects matching rows.
    ///
    /// `fields` limits the returned fields; empty means every field.
    fn select(
        &self,
        descriptor: &EntityDescriptor,
        query: &DataQuery,
        page: Page,
        order_by: Option<&OrderBy>,
        fields: &[String],
    ) -> StorageResult<Vec<Record>>;

    /// Counts matching rows.
    fn select_count(&self, descriptor: &EntityDescriptor, query: &DataQuery) -> StorageResult<usize>;
}

/// Write side of a storage backend.
///
/// Each call receives a homogeneous batch of rows for one entity type and
/// returns the number of rows affected.
pub trait WriteProvider: Send + Sync {
    fn insert(&self, descriptor: &EntityDescriptor, records: &[Record]) -> StorageResult<usize>;

    fn update(&self, descriptor: &EntityDescriptor, records: &[Record]) -> StorageResult<usize>;

    fn delete(&self, descriptor: &EntityDescriptor, records: &[Record]) -> StorageResult<usize>;
}

/// A backend serving both reads and writes.
pub trait StorageProvider: ReadProvider + WriteProvider {}

impl<T: ReadProvider + WriteProvider> StorageProvider for T {}
