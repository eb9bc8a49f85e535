use maxdata_crypto::CryptoError;

#[test]
fn error_display_key_derivation() {
    let err = CryptoError::KeyDerivation("bad params".into());
    assert!(format!("{err}").contains("key derivation failed"));
    assert!(format!("{err}").contains("bad params"));
}

#[test]
fn error_display_decryption() {
    let err = CryptoError::Decryption("tampered".into());
    assert!(format!("{err}").contains("decryption failed"));
}

#[test]
fn error_display_invalid_key_length() {
    let err = CryptoError::InvalidKeyLength {
        expected: 32,
        actual: 16,
    };
    let msg = format!("{err}");
    assert!(msg.contains("32"));
    assert!(msg.contains("16"));
}

#[test]
fn error_display_decompression() {
    let err = CryptoError::Decompression("truncated".into());
    assert!(format!("{err}").contains("decompression failed: truncated"));
}

#[test]
fn error_display_unsupported_frame() {
    assert_eq!(CryptoError::UnsupportedFrame(7).to_string(), "unsupported sealed frame version 7");
}
