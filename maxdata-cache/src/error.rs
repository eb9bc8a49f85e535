use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    /// A query signature or cached payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid cache configuration: {0}")]
    Configuration(String),

    /// The background sweeper thread could not be started.
    #[error("failed to start sweeper: {0}")]
    Sweeper(#[from] std::io::Error),
}
