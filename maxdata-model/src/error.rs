//! Error types for the entity model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by descriptor registration and lookup.
///
/// These are contract violations made by the program itself, never data
/// conditions, so callers are expected to fail fast on them.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No descriptor was registered for the entity type.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    /// A descriptor for the entity type is already registered.
    #[error("entity type already registered: {0}")]
    DuplicateEntityType(String),

    /// The descriptor is internally inconsistent.
    #[error("invalid descriptor for {entity_type}: {reason}")]
    InvalidDescriptor { entity_type: String, reason: String },
}
