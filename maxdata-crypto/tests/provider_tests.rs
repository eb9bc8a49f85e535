use maxdata_crypto::{
    DataCompressor, DataEncryptor, KdfParams, KeyEncryptor, Lz4Compressor, PassthroughCompressor,
    KeySalt, PassthroughEncryptor,
};
use std::sync::Arc;

// ── Encryptors ───────────────────────────────────────────────────

#[test]
fn passthrough_encryptor_is_identity() {
    let enc = PassthroughEncryptor;
    assert_eq!(enc.encrypt_bytes("people.Notes", b"plain").unwrap(), b"plain");
    assert_eq!(enc.decrypt_bytes("people.Notes", b"plain").unwrap(), b"plain");
}

#[test]
fn key_encryptor_roundtrip() {
    let enc = KeyEncryptor::random();
    let blob = enc.encrypt_bytes("people.Notes", b"private note").unwrap();
    assert_ne!(blob, b"private note");
    assert_eq!(enc.decrypt_bytes("people.Notes", &blob).unwrap(), b"private note");
}

#[test]
fn key_encryptor_rejects_foreign_blob() {
    let blob = KeyEncryptor::random().encrypt_bytes("ctx", b"data").unwrap();
    assert!(KeyEncryptor::random().decrypt_bytes("ctx", &blob).is_err());
}

#[test]
fn key_encryptor_binds_field_context() {
    let enc = KeyEncryptor::random();
    let blob = enc.encrypt_bytes("people.Notes", b"private note").unwrap();
    assert!(enc.decrypt_bytes("people.Email", &blob).is_err());
}

#[test]
fn passphrase_encryptors_with_same_salt_interoperate() {
    let salt = KeySalt::random();
    let params = KdfParams {
        memory_kib: 1024,
        iterations: 1,
        lanes: 1,
    };
    let writer = KeyEncryptor::from_passphrase("hunter2", &salt, &params).unwrap();
    let reader = KeyEncryptor::from_passphrase("hunter2", &salt, &params).unwrap();
    let blob = writer.encrypt_bytes("ctx", b"shared").unwrap();
    assert_eq!(reader.decrypt_bytes("ctx", &blob).unwrap(), b"shared");
}

#[test]
fn encryptor_is_object_safe() {
    let providers: Vec<Arc<dyn DataEncryptor>> =
        vec![Arc::new(PassthroughEncryptor), Arc::new(KeyEncryptor::random())];
    for p in providers {
        let blob = p.encrypt_bytes("ctx", b"x").unwrap();
        assert_eq!(p.decrypt_bytes("ctx", &blob).unwrap(), b"x");
    }
}

// ── Compressors ──────────────────────────────────────────────────

#[test]
fn lz4_roundtrip_shrinks_repetitive_data() {
    let data = "abcabcabc".repeat(200).into_bytes();
    let packed = Lz4Compressor.compress(&data);
    assert!(packed.len() < data.len());
    assert_eq!(Lz4Compressor.decompress(&packed).unwrap(), data);
}

#[test]
fn lz4_rejects_garbage() {
    let err = Lz4Compressor.decompress(&[1, 2]).unwrap_err();
    assert!(err.to_string().contains("decompression failed"));
}

#[test]
fn passthrough_compressor_is_identity() {
    assert_eq!(PassthroughCompressor.compress(b"raw"), b"raw");
    assert_eq!(PassthroughCompressor.decompress(b"raw").unwrap(), b"raw");
}

#[test]
fn compress_then_encrypt_reverses() {
    let enc = KeyEncryptor::random();
    let data = b"compressed and sealed".repeat(10);
    let stored = enc.encrypt_bytes("ctx", &Lz4Compressor.compress(&data)).unwrap();
    let restored = Lz4Compressor.decompress(&enc.decrypt_bytes("ctx", &stored).unwrap()).unwrap();
    assert_eq!(restored, data);
}
