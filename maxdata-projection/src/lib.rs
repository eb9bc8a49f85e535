//! Projection engine for maxdata.
//!
//! Turns entities into ordered JSON documents according to a list of spec
//! strings:
//!
//! | Spec                    | Meaning                                         |
//! |-------------------------|-------------------------------------------------|
//! | `Name`                  | the property under its own name                 |
//! | `Name:Alias`            | the property renamed                            |
//! | `Amount?Kind=Credit`    | the property only when every condition holds    |
//! | `Email?Email=*`         | the property only when present                  |
//! | `ADD(Age,Age):Double`   | a function over projected values                |
//! | `GROUPBY(Type):Type`    | group key for [`Projector::map_index_list`]     |
//!
//! Specs are parsed by a small recursive-descent parser into
//! [`ProjectionSpec`] values. Malformed specs, unknown properties and unknown
//! functions never fail: they yield an empty-string placeholder or no value.

mod aggregate;
mod document;
mod error;
mod functions;
mod projector;
mod spec;

pub use aggregate::{fold, group_key, is_aggregate, AggregateState};
pub use document::{number_of, number_value, to_json, Document};
pub use error::{ProjectionError, ProjectionResult};
pub use functions::evaluate;
pub use projector::{ProjectionOptions, Projector, DETAIL_KEY};
pub use spec::{parse_spec, Argument, CallSpec, FieldSpec, FilterTerm, FilterValue, ProjectionSpec};
