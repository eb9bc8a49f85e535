//! Error types for the entity repository.

use maxdata_model::ModelError;
use thiserror::Error;

/// Result type for repository construction and lookups.
pub type EntityResult<T> = Result<T, EntityError>;

/// Errors surfaced by the entity repository.
///
/// Only configuration and contract violations surface as errors. Failed
/// writes, unreadable fields and no-op updates are logged and reported
/// through `bool` results instead.
#[derive(Debug, Error)]
pub enum EntityError {
    /// The repository was built without a storage provider.
    #[error("no storage provider configured")]
    MissingStorage,

    /// The builder was given settings that contradict each other.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// Why a record could not be encoded for storage or decoded from it.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("field {field} does not encode: {reason}")]
    Encode { field: String, reason: String },

    #[error("encryption failed for {field}: {reason}")]
    Encrypt { field: String, reason: String },

    #[error("decryption failed for {field}: {reason}")]
    Decrypt { field: String, reason: String },

    #[error("decompression failed for {field}: {reason}")]
    Decompress { field: String, reason: String },

    #[error("field {field} does not decode: {reason}")]
    Decode { field: String, reason: String },
}
