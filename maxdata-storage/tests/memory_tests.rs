use maxdata_model::{EntityDescriptor, FieldDescriptor, Record};
use maxdata_storage::{
    DataQuery, MemoryProvider, Operator, OrderBy, Page, ReadProvider, StorageError, WriteProvider,
};
use maxdata_types::DataValue;

fn people() -> EntityDescriptor {
    EntityDescriptor::builder("Person", "people")
        .key(FieldDescriptor::integer("Id"))
        .field(FieldDescriptor::text("Name"))
        .field(FieldDescriptor::integer("Age"))
        .build()
        .unwrap()
}

fn row(id: i32, name: &str, age: i32) -> Record {
    [
        ("Id", DataValue::from(id)),
        ("Name", DataValue::from(name)),
        ("Age", DataValue::from(age)),
    ]
    .into_iter()
    .collect()
}

fn seeded() -> MemoryProvider {
    let provider = MemoryProvider::new();
    provider
        .insert(&people(), &[row(1, "Alice", 30), row(2, "Bob", 25), row(3, "Carol", 41)])
        .unwrap();
    provider
}

// ── Writes ───────────────────────────────────────────────────────

#[test]
fn insert_then_select_all() {
    let provider = seeded();
    assert_eq!(provider.len("people"), 3);
    let rows = provider
        .select(&people(), &DataQuery::new(), Page::ALL, None, &[])
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| !r.has_changes()));
}

#[test]
fn duplicate_key_rejects_whole_batch() {
    let provider = seeded();
    let err = provider
        .insert(&people(), &[row(9, "New", 1), row(1, "Again", 2)])
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateKey { ref key, .. } if key == "1"));
    assert_eq!(provider.len("people"), 3);
}

#[test]
fn update_merges_fields_by_key() {
    let provider = seeded();
    let mut change = Record::new();
    change.load("Id", 2);
    change.load("Age", 26);
    assert_eq!(provider.update(&people(), &[change]).unwrap(), 1);

    let bob = provider
        .select(&people(), &DataQuery::equal("Id", 2), Page::ALL, None, &[])
        .unwrap();
    assert_eq!(bob[0].get("Age"), Some(&DataValue::Integer(26)));
    assert_eq!(bob[0].get("Name"), Some(&DataValue::from("Bob")));
}

#[test]
fn update_unknown_key_affects_nothing() {
    let provider = seeded();
    assert_eq!(provider.update(&people(), &[row(99, "Ghost", 1)]).unwrap(), 0);
}

#[test]
fn delete_by_key() {
    let provider = seeded();
    assert_eq!(provider.delete(&people(), &[row(1, "", 0)]).unwrap(), 1);
    assert_eq!(provider.len("people"), 2);
    assert_eq!(provider.delete(&people(), &[row(1, "", 0)]).unwrap(), 0);
}

// ── Reads ────────────────────────────────────────────────────────

#[test]
fn select_filters_orders_and_pages() {
    let provider = seeded();
    let query = DataQuery::new().and("Age", Operator::GreaterThan, 20);
    let order = OrderBy::desc("Age");

    let first = provider.select(&people(), &query, Page::new(0, 2), Some(&order), &[]).unwrap();
    let names: Vec<_> = first.iter().map(|r| r.get("Name").unwrap().to_string()).collect();
    assert_eq!(names, vec!["Carol", "Alice"]);

    let second = provider.select(&people(), &query, Page::new(1, 2), Some(&order), &[]).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].get("Name"), Some(&DataValue::from("Bob")));
}

#[test]
fn select_limits_fields() {
    let provider = seeded();
    let rows = provider
        .select(&people(), &DataQuery::equal("Id", 1), Page::ALL, None, &["Id".to_string()])
        .unwrap();
    assert_eq!(rows[0].len(), 1);
    assert!(rows[0].contains("Id"));
}

#[test]
fn count_matches_query() {
    let provider = seeded();
    let query = DataQuery::new().and("Age", Operator::LessThan, 35);
    assert_eq!(provider.select_count(&people(), &query).unwrap(), 2);
    assert_eq!(provider.select_count(&people(), &DataQuery::new()).unwrap(), 3);
}

#[test]
fn unknown_storage_is_empty() {
    let provider = MemoryProvider::new();
    let rows = provider.select(&people(), &DataQuery::new(), Page::ALL, None, &[]).unwrap();
    assert!(rows.is_empty());
    assert_eq!(provider.select_count(&people(), &DataQuery::new()).unwrap(), 0);
}

#[test]
fn order_by_parses_direction() {
    assert_eq!(OrderBy::parse("Age desc"), Some(OrderBy::desc("Age")));
    assert_eq!(OrderBy::parse("Age"), Some(OrderBy::asc("Age")));
    assert_eq!(OrderBy::parse("Age sideways"), None);
    assert_eq!(OrderBy::parse("  "), None);
}
