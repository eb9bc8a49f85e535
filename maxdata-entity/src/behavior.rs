use maxdata_model::{Entity, EntityDescriptor};
use maxdata_storage::DataQuery;

/// Per-type hooks into the repository's read and write paths.
///
/// Every method has a default, so a type only overrides what it needs.
/// The repository runs its own generic steps first (identity, creation
/// time, version, last-update time) and then calls the hook.
pub trait EntityBehavior: Send + Sync {
    /// Standing predicate ANDed onto every query for the type.
    ///
    /// By default excludes soft-deleted rows when the type declares a
    /// soft-delete field.
    fn base_query(&self, descriptor: &EntityDescriptor) -> DataQuery {
        match &descriptor.soft_delete_field {
            Some(field) => DataQuery::equal(field, false),
            None => DataQuery::new(),
        }
    }

    /// Assigns values a new entity needs before its first insert.
    fn set_initial(&self, entity: &mut Entity) {
        let _ = entity;
    }

    /// Normalizes or derives fields before every insert and update.
    fn set_properties(&self, entity: &mut Entity) {
        let _ = entity;
    }
}

/// Behavior of types that register none.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBehavior;

impl EntityBehavior for DefaultBehavior {}
