//! Shared descriptors for model tests.

#![allow(dead_code)]

use maxdata_model::{EntityDescriptor, FieldDescriptor, FieldType, PropertyDescriptor};

/// A person keyed by a generated identifier, with a composite full name.
pub fn person_descriptor() -> EntityDescriptor {
    EntityDescriptor::builder("Person", "MaxPerson")
        .key(FieldDescriptor::identifier("Id"))
        .field(FieldDescriptor::text("FirstName"))
        .field(FieldDescriptor::text("LastName"))
        .field(FieldDescriptor::integer("Age"))
        .field(FieldDescriptor::boolean("IsDeleted"))
        .field(FieldDescriptor::datetime("LastUpdateDate"))
        .property(PropertyDescriptor::alias("PersonId", FieldType::Identifier, "Id"))
        .property(PropertyDescriptor::composite("FullName", &["FirstName", "LastName"]))
        .soft_delete("IsDeleted")
        .last_update("LastUpdateDate")
        .build()
        .unwrap()
}

/// A ledger line keyed by account and period.
pub fn ledger_descriptor() -> EntityDescriptor {
    EntityDescriptor::builder("Ledger", "MaxLedger")
        .key(FieldDescriptor::text("Period"))
        .key(FieldDescriptor::text("Account"))
        .field(FieldDescriptor::double("Amount"))
        .build()
        .unwrap()
}
