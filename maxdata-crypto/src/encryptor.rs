//! Encryption providers for flagged fields.
//!
//! The entity layer holds an `Arc<dyn DataEncryptor>` and never sees key
//! material.

use crate::cipher;
use crate::error::CryptoResult;
use crate::key::{FieldKey, KdfParams, KeySalt};

/// Encrypts and decrypts the bytes of one field.
///
/// `context` names the field as `"{storage}.{field}"`. Implementations may
/// bind it into the ciphertext; decryption is always given the same context
/// as encryption was.
pub trait DataEncryptor: Send + Sync {
    fn encrypt_bytes(&self, context: &str, data: &[u8]) -> CryptoResult<Vec<u8>>;

    fn decrypt_bytes(&self, context: &str, data: &[u8]) -> CryptoResult<Vec<u8>>;
}

/// Leaves data as it is.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughEncryptor;

impl DataEncryptor for PassthroughEncryptor {
    fn encrypt_bytes(&self, _context: &str, data: &[u8]) -> CryptoResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decrypt_bytes(&self, _context: &str, data: &[u8]) -> CryptoResult<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Seals fields with one [`FieldKey`].
#[derive(Debug)]
pub struct KeyEncryptor {
    key: FieldKey,
}

impl KeyEncryptor {
    pub fn new(key: FieldKey) -> Self {
        Self { key }
    }

    pub fn from_passphrase(passphrase: &str, salt: &KeySalt, params: &KdfParams) -> CryptoResult<Self> {
        FieldKey::derive(passphrase, salt, params).map(Self::new)
    }

    pub fn random() -> Self {
        Self::new(FieldKey::random())
    }
}

impl DataEncryptor for KeyEncryptor {
    fn encrypt_bytes(&self, context: &str, data: &[u8]) -> CryptoResult<Vec<u8>> {
        cipher::seal(&self.key, context, data)
    }

    fn decrypt_bytes(&self, context: &str, data: &[u8]) -> CryptoResult<Vec<u8>> {
        cipher::open(&self.key, context, data)
    }
}
