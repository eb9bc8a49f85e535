//! Abstract compression interface for compressed fields.

use crate::error::{CryptoError, CryptoResult};

/// Trait for compressing/decompressing opaque byte slices.
pub trait DataCompressor: Send + Sync {
    fn compress(&self, data: &[u8]) -> Vec<u8>;

    /// Expands data produced by `compress`. Corrupt input is an error.
    fn decompress(&self, data: &[u8]) -> CryptoResult<Vec<u8>>;
}

/// No-op compressor. Data passes through unchanged.
pub struct PassthroughCompressor;

impl DataCompressor for PassthroughCompressor {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        data.to_vec()
    }

    fn decompress(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// LZ4 block compression; the uncompressed size is stored as a prefix.
pub struct Lz4Compressor;

impl DataCompressor for Lz4Compressor {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        lz4_flex::compress_prepend_size(data)
    }

    fn decompress(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        lz4_flex::decompress_size_prepended(data).map_err(|e| CryptoError::Decompression(e.to_string()))
    }
}
