use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Failures of the encryption and compression providers.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Wrong key, wrong field or tampered data.
    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("unsupported sealed frame version {0}")]
    UnsupportedFrame(u8),

    #[error("decompression failed: {0}")]
    Decompression(String),
}
