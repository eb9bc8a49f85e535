//! Sealed field frames.
//!
//! ```text
//! ┌─────────┬────────────┬──────────────────────────┐
//! │ version │ nonce (12) │ ciphertext ‖ tag (16)    │
//! └─────────┴────────────┴──────────────────────────┘
//! ```
//!
//! ChaCha20-Poly1305 with a fresh random nonce per seal. The field context
//! (`"{storage}.{field}"`) is bound as associated data, so a sealed value
//! only opens under the field it was written for.

use crate::error::{CryptoError, CryptoResult};
use crate::key::FieldKey;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::RngCore;

/// Frame layout written by [`seal`].
pub const FRAME_VERSION: u8 = 1;

pub const NONCE_SIZE: usize = 12;

pub const TAG_SIZE: usize = 16;

/// Bytes a frame adds on top of the plaintext.
pub const FRAME_OVERHEAD: usize = 1 + NONCE_SIZE + TAG_SIZE;

/// Encrypts `plaintext` for the field named by `context`.
pub fn seal(key: &FieldKey, context: &str, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = ChaCha20Poly1305::new(key.as_bytes().into())
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: context.as_bytes(),
            },
        )
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut frame = Vec::with_capacity(FRAME_OVERHEAD + plaintext.len());
    frame.push(FRAME_VERSION);
    frame.extend_from_slice(&nonce);
    frame.extend_from_slice(&ciphertext);
    Ok(frame)
}

/// Reverses [`seal`]. Fails on a foreign key, a different context or any
/// modified byte.
pub fn open(key: &FieldKey, context: &str, frame: &[u8]) -> CryptoResult<Vec<u8>> {
    let Some((&version, rest)) = frame.split_first() else {
        return Err(CryptoError::Decryption("empty frame".into()));
    };
    if version != FRAME_VERSION {
        return Err(CryptoError::UnsupportedFrame(version));
    }
    if rest.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Decryption(format!("frame of {} bytes is truncated", frame.len())));
    }
    let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);

    ChaCha20Poly1305::new(key.as_bytes().into())
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: context.as_bytes(),
            },
        )
        .map_err(|_| CryptoError::Decryption(format!("{context} does not open with this key")))
}
