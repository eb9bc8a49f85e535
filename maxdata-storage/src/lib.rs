//! Storage layer for maxdata.
//!
//! Defines the storage-agnostic query model and the collaborator contracts
//! the entity layer persists through. Concrete backends (SQL, document
//! stores) implement [`ReadProvider`] and [`WriteProvider`] outside this
//! workspace; [`MemoryProvider`] is the reference implementation.
//!
//! # Architecture
//!
//! - Queries are flat term lists (filters, AND/OR joins, group markers)
//!   over physical field names; logical property names are resolved by the
//!   caller before a query reaches a provider
//! - Caller filters arrive as a [`FilterIndex`] on property names and are
//!   appended as one parenthesized group onto an entity's base query
//! - Providers receive the entity descriptor with every call, so one
//!   provider instance serves every entity type

mod error;
mod memory;
mod provider;
mod query;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryProvider;
pub use provider::{OrderBy, Page, ReadProvider, StorageProvider, WriteProvider};
pub use query::{Condition, DataQuery, Filter, FilterEntry, FilterIndex, Operator, QueryTerm};
