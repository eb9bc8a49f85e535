//! Encryption and compression providers for maxdata.
//!
//! Fields flagged as encrypted or compressed in an entity descriptor are run
//! through a [`DataCompressor`] and then a [`DataEncryptor`] before they reach
//! the storage provider, and back through both in reverse order on read.
//!
//! The entity layer depends only on the two traits. Concrete providers:
//! - [`KeyEncryptor`] — ChaCha20-Poly1305 frames bound to their field
//! - [`Lz4Compressor`] — LZ4 block compression with a size prefix
//! - [`PassthroughEncryptor`] / [`PassthroughCompressor`] — no-ops for tests
//!   and for deployments without at-rest protection

mod cipher;
mod compressor;
mod encryptor;
mod error;
mod key;

pub use cipher::{open, seal, FRAME_OVERHEAD, FRAME_VERSION, NONCE_SIZE, TAG_SIZE};
pub use compressor::{DataCompressor, Lz4Compressor, PassthroughCompressor};
pub use encryptor::{DataEncryptor, KeyEncryptor, PassthroughEncryptor};
pub use error::{CryptoError, CryptoResult};
pub use key::{FieldKey, KdfParams, KeySalt, KEY_SIZE, SALT_SIZE};
