//! At-rest transformation of encrypted and compressed fields.
//!
//! On the way to storage a flagged field is turned into bytes, compressed
//! when flagged so, then encrypted when flagged so, and stored as
//! [`DataValue::Bytes`]. Reads run the same steps in reverse.
//!
//! | Field type | Plain bytes               |
//! |------------|---------------------------|
//! | bytes      | the bytes themselves      |
//! | text       | UTF-8                     |
//! | any other  | JSON of the [`DataValue`] |

use crate::error::CodecError;
use maxdata_crypto::{DataCompressor, DataEncryptor};
use maxdata_model::{CACHE_EXPIRE_FIELD, EntityDescriptor, FieldDescriptor, FieldType, Record};
use maxdata_types::DataValue;
use std::sync::Arc;
use tracing::warn;

/// Applies the encryption and compression providers to flagged fields.
#[derive(Clone)]
pub struct FieldCodec {
    encryptor: Arc<dyn DataEncryptor>,
    compressor: Arc<dyn DataCompressor>,
}

impl FieldCodec {
    pub fn new(encryptor: Arc<dyn DataEncryptor>, compressor: Arc<dyn DataCompressor>) -> Self {
        Self {
            encryptor,
            compressor,
        }
    }

    /// The record as it is handed to the storage provider.
    ///
    /// Drops the cache-expiry override and seals flagged fields. Unset
    /// values are stored as they are.
    pub fn encode(&self, descriptor: &EntityDescriptor, record: &Record) -> Result<Record, CodecError> {
        let mut out = Record::new();
        for (name, value) in record.iter() {
            if name == CACHE_EXPIRE_FIELD {
                continue;
            }
            match descriptor.field(name) {
                Some(field) if is_sealed(field) && !value.is_unset() => {
                    let sealed = self.seal(descriptor, field, value)?;
                    out.load(name, DataValue::Bytes(sealed));
                }
                _ => out.load(name, value.clone()),
            }
        }
        Ok(out)
    }

    /// The record as read back from storage.
    ///
    /// A field that fails to open is logged and dropped; the rest of the
    /// record is kept.
    pub fn decode(&self, descriptor: &EntityDescriptor, mut record: Record) -> Record {
        for field in descriptor.fields.iter().filter(|f| is_sealed(f)) {
            let Some(DataValue::Bytes(sealed)) = record.get(&field.name) else {
                continue;
            };
            match self.open(descriptor, field, sealed) {
                Ok(value) => record.load(&field.name, value),
                Err(e) => {
                    warn!(storage = %descriptor.storage_name, field = %field.name, error = %e, "sealed field dropped");
                    record.remove(&field.name);
                }
            }
        }
        record
    }

    fn seal(&self, descriptor: &EntityDescriptor, field: &FieldDescriptor, value: &DataValue) -> Result<Vec<u8>, CodecError> {
        let mut bytes = match value {
            DataValue::Bytes(b) => b.clone(),
            DataValue::Text(s) => s.as_bytes().to_vec(),
            other => serde_json::to_vec(other).map_err(|e| CodecError::Encode {
                field: field.name.clone(),
                reason: e.to_string(),
            })?,
        };
        if field.compressed {
            bytes = self.compressor.compress(&bytes);
        }
        if field.encrypted {
            let context = format!("{}.{}", descriptor.storage_name, field.name);
            bytes = self
                .encryptor
                .encrypt_bytes(&context, &bytes)
                .map_err(|e| CodecError::Encrypt {
                    field: field.name.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(bytes)
    }

    fn open(&self, descriptor: &EntityDescriptor, field: &FieldDescriptor, sealed: &[u8]) -> Result<DataValue, CodecError> {
        let mut bytes = sealed.to_vec();
        if field.encrypted {
            let context = format!("{}.{}", descriptor.storage_name, field.name);
            bytes = self
                .encryptor
                .decrypt_bytes(&context, &bytes)
                .map_err(|e| CodecError::Decrypt {
                    field: field.name.clone(),
                    reason: e.to_string(),
                })?;
        }
        if field.compressed {
            bytes = self
                .compressor
                .decompress(&bytes)
                .map_err(|e| CodecError::Decompress {
                    field: field.name.clone(),
                    reason: e.to_string(),
                })?;
        }

        let decode_error = |reason: String| CodecError::Decode {
            field: field.name.clone(),
            reason,
        };
        match field.field_type {
            FieldType::Bytes => Ok(DataValue::Bytes(bytes)),
            FieldType::Text => String::from_utf8(bytes)
                .map(DataValue::Text)
                .map_err(|e| decode_error(e.to_string())),
            _ => serde_json::from_slice(&bytes).map_err(|e| decode_error(e.to_string())),
        }
    }
}

fn is_sealed(field: &FieldDescriptor) -> bool {
    field.encrypted || field.compressed
}

impl std::fmt::Debug for FieldCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCodec").finish_non_exhaustive()
    }
}
