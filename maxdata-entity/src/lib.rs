//! Entity repository for maxdata.
//!
//! [`EntityRepository`] ties the lower crates together:
//! - writes (`insert`, `insert_batch`, `update`, `delete`, `archive`) run the
//!   initial-value and property hooks, seal encrypted and compressed
//!   fields, persist with bounded retry and invalidate cache namespaces
//! - reads (`load_by_key`, `load_all*`, `count`) start from each type's base
//!   predicate, resolve property names to physical fields and optionally
//!   go through the query cache
//! - lifecycle listeners observe every write without being able to veto it
//!
//! ```text
//! insert ─▶ before_insert ─▶ set_initial ─▶ set_properties ─▶ seal ─▶ retry(insert)
//!                                                                   ├─ ok  ─▶ clear flags ─▶ invalidate LoadAll ─▶ after_insert
//!                                                                   └─ err ─▶ insert_failed
//! ```

mod behavior;
mod codec;
mod config;
mod error;
mod read;
mod repository;
mod version;
mod write;

pub use behavior::{DefaultBehavior, EntityBehavior};
pub use codec::FieldCodec;
pub use config::RepositoryConfig;
pub use error::{CodecError, EntityError, EntityResult};
pub use read::{Paged, Selection};
pub use repository::{EntityRepository, EntityRepositoryBuilder};
pub use version::VersionIssuer;
pub use write::BatchStatus;
