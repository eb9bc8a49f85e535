//! Shared descriptors and entity builders for projection tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use maxdata_model::{
    Entity, EntityDescriptor, EntityRegistry, FieldDescriptor, FieldType, PropertyDescriptor,
};
use maxdata_types::DataValue;
use std::sync::Arc;

pub fn person_descriptor() -> EntityDescriptor {
    EntityDescriptor::builder("Person", "people")
        .key(FieldDescriptor::integer("Id"))
        .field(FieldDescriptor::text("Name"))
        .field(FieldDescriptor::integer("Age"))
        .field(FieldDescriptor::integer("Kind"))
        .field(FieldDescriptor::text("Email"))
        .field(FieldDescriptor::double("Score"))
        .field(FieldDescriptor::datetime("Created"))
        .field(FieldDescriptor::text_list("Tags"))
        .field(FieldDescriptor::document("Profile"))
        .property(PropertyDescriptor::alias("PersonName", FieldType::Text, "Name"))
        .build()
        .unwrap()
}

pub fn sale_descriptor() -> EntityDescriptor {
    EntityDescriptor::builder("Sale", "sales")
        .key(FieldDescriptor::integer("Id"))
        .field(FieldDescriptor::text("Type"))
        .field(FieldDescriptor::text("Region"))
        .field(FieldDescriptor::double("Amount"))
        .field(FieldDescriptor::text("Note"))
        .build()
        .unwrap()
}

pub struct Fixture {
    pub registry: Arc<EntityRegistry>,
    pub person: Arc<EntityDescriptor>,
    pub sale: Arc<EntityDescriptor>,
}

pub fn fixture() -> Fixture {
    let registry = Arc::new(EntityRegistry::new());
    let person = registry.register(person_descriptor()).unwrap();
    let sale = registry.register(sale_descriptor()).unwrap();
    Fixture {
        registry,
        person,
        sale,
    }
}

impl Fixture {
    /// Alice, 30, created 2024-03-01T12:00:00Z.
    pub fn alice(&self) -> Entity {
        let mut e = Entity::new(Arc::clone(&self.person));
        e.record_mut().load("Id", 7);
        e.record_mut().load("Name", "Alice");
        e.record_mut().load("Age", 30);
        e.record_mut().load(
            "Created",
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        );
        e
    }

    pub fn sale(&self, id: i32, kind: &str, region: &str, amount: f64) -> Entity {
        let mut e = Entity::new(Arc::clone(&self.sale));
        e.record_mut().load("Id", id);
        e.record_mut().load("Type", kind);
        e.record_mut().load("Region", region);
        e.record_mut().load("Amount", DataValue::Double(amount));
        e
    }
}
