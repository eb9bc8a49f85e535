use maxdata_crypto::{FieldKey, KdfParams, KeySalt, SALT_SIZE};

fn cheap() -> KdfParams {
    KdfParams {
        memory_kib: 1024,
        iterations: 1,
        lanes: 1,
    }
}

#[test]
fn same_passphrase_and_salt_give_same_key() {
    let salt = KeySalt::from_bytes([3u8; SALT_SIZE]);
    let a = FieldKey::derive("correct horse", &salt, &cheap()).unwrap();
    let b = FieldKey::derive("correct horse", &salt, &cheap()).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn salt_changes_the_key() {
    let a = FieldKey::derive("pw", &KeySalt::from_bytes([1u8; SALT_SIZE]), &cheap()).unwrap();
    let b = FieldKey::derive("pw", &KeySalt::from_bytes([2u8; SALT_SIZE]), &cheap()).unwrap();
    assert_ne!(a.as_bytes(), b.as_bytes());
}

#[test]
fn passphrase_changes_the_key() {
    let salt = KeySalt::random();
    let a = FieldKey::derive("pw-one", &salt, &cheap()).unwrap();
    let b = FieldKey::derive("pw-two", &salt, &cheap()).unwrap();
    assert_ne!(a.as_bytes(), b.as_bytes());
}

#[test]
fn rejected_cost_settings_fail() {
    let params = KdfParams {
        memory_kib: 1,
        iterations: 0,
        lanes: 0,
    };
    let err = FieldKey::derive("pw", &KeySalt::random(), &params).unwrap_err();
    assert!(err.to_string().contains("key derivation failed"));
}

#[test]
fn default_cost_is_owasp_minimum() {
    assert_eq!(
        KdfParams::default(),
        KdfParams {
            memory_kib: 19 * 1024,
            iterations: 2,
            lanes: 1,
        }
    );
}

#[test]
fn random_salts_and_keys_differ() {
    assert_ne!(KeySalt::random(), KeySalt::random());
    assert_ne!(FieldKey::random().as_bytes(), FieldKey::random().as_bytes());
}
