use maxdata_types::RecordId;
use std::collections::HashSet;
use std::str::FromStr;

#[test]
fn record_id_new_is_unique() {
    let a = RecordId::new();
    let b = RecordId::new();
    assert_ne!(a, b);
}

#[test]
fn record_id_from_uuid_roundtrip() {
    let uuid = uuid::Uuid::now_v7();
    let id = RecordId::from_uuid(uuid);
    assert_eq!(id.as_uuid(), uuid);
}

#[test]
fn record_id_display_and_parse() {
    let id = RecordId::new();
    let parsed = RecordId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn record_id_from_str_invalid() {
    assert!(RecordId::from_str("garbage").is_err());
}

#[test]
fn nil_record_id_is_detected() {
    assert!(RecordId::from_uuid(uuid::Uuid::nil()).is_nil());
    assert!(!RecordId::new().is_nil());
}

#[test]
fn record_ids_sort_by_creation() {
    let a = RecordId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = RecordId::new();
    assert!(a < b);
}

#[test]
fn record_id_hash_and_eq() {
    let id = RecordId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn record_id_serializes_as_plain_uuid() {
    let id = RecordId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
}
