use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failures a storage provider reports back to the entity layer.
///
/// Reads never surface these; the repository logs them and answers empty.
/// Writes retry on either variant until the attempts run out.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("duplicate key in {storage}: {key}")]
    DuplicateKey { storage: String, key: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
