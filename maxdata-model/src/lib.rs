//! Entity model for maxdata.
//!
//! Defines the types every other maxdata subsystem is written against:
//! - [`Record`] — ordered field values with per-field change tracking
//! - [`EntityDescriptor`] — the statically declared shape of one entity type
//!   (physical fields, key fields, logical properties, special fields)
//! - [`Entity`] — a record bound to its descriptor
//! - [`EntityRegistry`] — the process-wide descriptor registry that resolves
//!   property names to physical fields and computes record keys
//! - [`EntityListener`] — fire-and-forget lifecycle notifications
//!
//! There is no runtime reflection: each entity type declares its fields once
//! through [`EntityDescriptor::builder`] and registers the descriptor.

mod entity;
mod error;
mod listener;
mod record;
mod registry;
mod schema;

pub use entity::{Entity, CACHE_EXPIRE_FIELD, DATA_KEY_FIELD, STORAGE_KEY_FIELD};
pub use error::{ModelError, ModelResult};
pub use listener::EntityListener;
pub use record::Record;
pub use registry::EntityRegistry;
pub use schema::{
    EntityDescriptor, EntityDescriptorBuilder, FieldDescriptor, FieldType, PropertyDescriptor,
};
