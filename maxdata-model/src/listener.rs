use crate::Entity;

/// Observer of entity lifecycle events.
///
/// Every method has an empty default, so listeners only implement the
/// events they care about. Notifications are fire-and-forget: they receive
/// the entity by shared reference and cannot alter or veto the operation.
///
/// Listeners are registered on the repository and called synchronously on
/// the writing thread, so they should return quickly.
pub trait EntityListener: Send + Sync {
    fn before_insert(&self, entity: &Entity) {
        let _ = entity;
    }

    fn after_insert(&self, entity: &Entity) {
        let _ = entity;
    }

    /// Called once retries are exhausted.
    fn insert_failed(&self, entity: &Entity) {
        let _ = entity;
    }

    fn before_update(&self, entity: &Entity) {
        let _ = entity;
    }

    fn after_update(&self, entity: &Entity) {
        let _ = entity;
    }

    fn update_failed(&self, entity: &Entity) {
        let _ = entity;
    }

    fn before_delete(&self, entity: &Entity) {
        let _ = entity;
    }

    fn after_delete(&self, entity: &Entity) {
        let _ = entity;
    }

    fn delete_failed(&self, entity: &Entity) {
        let _ = entity;
    }
}
