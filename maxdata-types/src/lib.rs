//! Core type definitions for maxdata.
//!
//! This crate defines the storage-agnostic building blocks shared by every
//! other maxdata crate:
//! - [`DataValue`], the closed set of values a record field can hold
//! - [`RecordId`], time-ordered record identifiers (UUID v7)
//! - [`TimestampIssuer`], strictly increasing creation timestamps
//!
//! Entity descriptors, records and everything that knows about storage
//! belong in `maxdata-model` and above, not here.

mod ids;
mod timestamp;
mod value;

pub use ids::RecordId;
pub use timestamp::TimestampIssuer;
pub use value::{format_timestamp, DataValue, NestedDocument};
