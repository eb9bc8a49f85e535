use chrono::{DateTime, TimeZone, Utc};
use maxdata_types::{format_timestamp, DataValue, NestedDocument};
use std::cmp::Ordering;
use uuid::Uuid;

// ── Unset sentinels ──────────────────────────────────────────────

#[test]
fn sentinels_are_unset() {
    assert!(DataValue::Integer(i32::MIN).is_unset());
    assert!(DataValue::Long(i64::MIN).is_unset());
    assert!(DataValue::Double(f64::MIN).is_unset());
    assert!(DataValue::Double(f64::NAN).is_unset());
    assert!(DataValue::Timestamp(DateTime::<Utc>::MIN_UTC).is_unset());
    assert!(DataValue::Identifier(Uuid::nil()).is_unset());
}

#[test]
fn ordinary_values_are_set() {
    assert!(!DataValue::Integer(0).is_unset());
    assert!(!DataValue::Text(String::new()).is_unset());
    assert!(!DataValue::Boolean(false).is_unset());
    assert!(!DataValue::Identifier(Uuid::now_v7()).is_unset());
}

#[test]
fn unset_numbers_have_no_numeric_view() {
    assert_eq!(DataValue::Long(i64::MIN).as_f64(), None);
    assert_eq!(DataValue::Long(7).as_f64(), Some(7.0));
    assert_eq!(DataValue::Text("7".into()).as_f64(), None);
}

// ── Literal matching ─────────────────────────────────────────────

#[test]
fn numbers_match_numerically() {
    assert!(DataValue::Integer(1).matches_literal("1"));
    assert!(DataValue::Integer(1).matches_literal("1.0"));
    assert!(DataValue::Double(2.5).matches_literal(" 2.5 "));
    assert!(!DataValue::Integer(1).matches_literal("one"));
}

#[test]
fn booleans_match_loosely() {
    assert!(DataValue::Boolean(true).matches_literal("TRUE"));
    assert!(DataValue::Boolean(true).matches_literal("1"));
    assert!(DataValue::Boolean(false).matches_literal("false"));
    assert!(!DataValue::Boolean(false).matches_literal("yes"));
}

#[test]
fn identifiers_match_case_insensitively() {
    let id = Uuid::now_v7();
    assert!(DataValue::Identifier(id).matches_literal(&id.to_string().to_uppercase()));
}

#[test]
fn text_matches_exactly() {
    assert!(DataValue::from("Alice").matches_literal("Alice"));
    assert!(!DataValue::from("Alice").matches_literal("alice"));
}

// ── Ordering ─────────────────────────────────────────────────────

#[test]
fn numbers_compare_across_widths() {
    assert_eq!(
        DataValue::Integer(3).compare(&DataValue::Double(3.5)),
        Some(Ordering::Less)
    );
    assert_eq!(
        DataValue::Long(9).compare(&DataValue::Integer(9)),
        Some(Ordering::Equal)
    );
}

#[test]
fn incompatible_kinds_do_not_compare() {
    assert_eq!(DataValue::from("a").compare(&DataValue::Integer(1)), None);
}

// ── Canonical strings ────────────────────────────────────────────

#[test]
fn timestamps_render_as_iso_utc() {
    let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    assert_eq!(format_timestamp(&t), "2024-03-01T12:30:00.000Z");
    assert_eq!(DataValue::Timestamp(t).to_string(), "2024-03-01T12:30:00.000Z");
}

#[test]
fn text_lists_join_with_commas() {
    let v = DataValue::from(vec!["a".to_string(), "b".to_string()]);
    assert_eq!(v.to_string(), "a,b");
}

#[test]
fn doubles_render_without_trailing_zero() {
    assert_eq!(DataValue::Double(3.0).to_string(), "3");
    assert_eq!(DataValue::Double(0.25).to_string(), "0.25");
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn nested_documents_survive_json() {
    let mut inner = NestedDocument::new();
    inner.insert("city".into(), DataValue::from("Oslo"));
    inner.insert("zip".into(), DataValue::Integer(150));
    let value = DataValue::Document(inner);

    let json = serde_json::to_string(&value).unwrap();
    let parsed: DataValue = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, value);
}

#[test]
fn variants_are_tagged() {
    let json = serde_json::to_value(DataValue::Integer(4)).unwrap();
    assert_eq!(json, serde_json::json!({"type": "integer", "value": 4}));
}
