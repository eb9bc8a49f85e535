use maxdata_model::Record;
use maxdata_types::DataValue;

// ── Change tracking ──────────────────────────────────────────────

#[test]
fn set_marks_new_field_changed() {
    let mut r = Record::new();
    assert!(r.set("Name", "Alice"));
    assert!(r.is_changed("Name"));
    assert_eq!(r.changed_fields(), vec!["Name"]);
}

#[test]
fn set_same_value_is_not_a_change() {
    let mut r: Record = [("Name", "Alice")].into_iter().collect();
    assert!(!r.set("Name", "Alice"));
    assert!(!r.has_changes());
}

#[test]
fn load_does_not_mark_changed() {
    let mut r = Record::new();
    r.load("Age", 30);
    assert_eq!(r.get("Age"), Some(&DataValue::Integer(30)));
    assert!(!r.has_changes());
}

#[test]
fn clear_changed_resets_all_flags() {
    let mut r = Record::new();
    r.set("A", 1);
    r.set("B", 2);
    r.clear_changed();
    assert!(!r.has_changes());
    assert!(r.changed_fields().is_empty());
}

#[test]
fn has_changes_except_ignores_listed_fields() {
    let mut r = Record::new();
    r.set("LastUpdateDate", chrono::Utc::now());
    assert!(r.has_changes());
    assert!(!r.has_changes_except(&["LastUpdateDate"]));
    r.set("Name", "x");
    assert!(r.has_changes_except(&["LastUpdateDate"]));
}

// ── Clone ────────────────────────────────────────────────────────

#[test]
fn clone_is_independent_and_clean() {
    let mut r = Record::new();
    r.set("Name", "original");
    let mut copy = r.clone();
    assert!(!copy.has_changes());
    copy.set("Name", "modified");
    assert_eq!(r.get("Name"), Some(&DataValue::from("original")));
    assert_eq!(copy.get("Name"), Some(&DataValue::from("modified")));
    assert!(r.is_changed("Name"));
}

// ── Structure ────────────────────────────────────────────────────

#[test]
fn fields_keep_insertion_order() {
    let mut r = Record::new();
    r.set("C", 1);
    r.set("A", 2);
    r.set("B", 3);
    assert_eq!(r.names().collect::<Vec<_>>(), vec!["C", "A", "B"]);
}

#[test]
fn remove_and_retain() {
    let mut r: Record = [("A", 1), ("B", 2), ("C", 3)].into_iter().collect();
    assert_eq!(r.remove("B"), Some(DataValue::Integer(2)));
    assert_eq!(r.remove("B"), None);
    r.retain(|name| name != "C");
    assert_eq!(r.len(), 1);
    assert!(r.contains("A"));
}

#[test]
fn equality_ignores_order_and_flags() {
    let a: Record = [("A", 1), ("B", 2)].into_iter().collect();
    let mut b = Record::new();
    b.set("B", 2);
    b.set("A", 1);
    assert_eq!(a, b);
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serde_roundtrip_drops_flags() {
    let mut r = Record::new();
    r.set("Name", "Alice");
    r.set("Age", 30);
    let json = serde_json::to_string(&r).unwrap();
    let parsed: Record = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, r);
    assert!(!parsed.has_changes());
}
