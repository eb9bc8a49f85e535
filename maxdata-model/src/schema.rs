use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Describes one entity type: where it is stored, which physical fields it
/// has, which of them form the key, and which logical properties map onto them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub entity_type: String,
    pub storage_name: String,
    pub fields: Vec<FieldDescriptor>,
    /// Physical field names that make a row unique in storage.
    pub key_fields: Vec<String>,
    /// Logical properties that are not physical fields themselves.
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    /// Boolean field set instead of physically deleting a row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_delete_field: Option<String>,
    /// Timestamp refreshed on every save; ignored when detecting changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_field: Option<String>,
    /// Timestamp assigned once, from the strictly increasing issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_field: Option<String>,
    /// Integer version assigned on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_field: Option<String>,
    /// Rows sharing this field's value share one version sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_group_field: Option<String>,
}

impl EntityDescriptor {
    /// Starts a descriptor for `entity_type` stored under `storage_name`.
    pub fn builder(entity_type: &str, storage_name: &str) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder {
            descriptor: Self {
                entity_type: entity_type.into(),
                storage_name: storage_name.into(),
                fields: Vec::new(),
                key_fields: Vec::new(),
                properties: Vec::new(),
                soft_delete_field: None,
                last_update_field: None,
                created_field: None,
                version_field: None,
                version_group_field: None,
            },
        }
    }

    /// Looks up a physical field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up a virtual property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Every declared property name with its type, physical fields first,
    /// then virtual properties, in declaration order.
    pub fn declared_properties(&self) -> Vec<(&str, FieldType)> {
        let mut out: Vec<(&str, FieldType)> = self
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.field_type))
            .collect();
        for p in &self.properties {
            if self.field(&p.name).is_none() {
                out.push((p.name.as_str(), p.field_type));
            }
        }
        out
    }

    /// Type of a declared property or physical field.
    pub fn property_type(&self, name: &str) -> Option<FieldType> {
        self.field(name)
            .map(|f| f.field_type)
            .or_else(|| self.property(name).map(|p| p.field_type))
    }

    /// Checks that every referenced field is declared.
    pub fn validate(&self) -> ModelResult<()> {
        let invalid = |reason: String| ModelError::InvalidDescriptor {
            entity_type: self.entity_type.clone(),
            reason,
        };

        if self.storage_name.is_empty() {
            return Err(invalid("storage name is empty".into()));
        }
        for (i, f) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|other| other.name == f.name) {
                return Err(invalid(format!("field {} declared twice", f.name)));
            }
        }
        for key in &self.key_fields {
            if self.field(key).is_none() {
                return Err(invalid(format!("key field {key} is not declared")));
            }
        }
        for p in &self.properties {
            if p.storage_fields.is_empty() {
                return Err(invalid(format!("property {} maps to no field", p.name)));
            }
            if let Some(missing) = p.storage_fields.iter().find(|f| self.field(f).is_none()) {
                return Err(invalid(format!(
                    "property {} maps to undeclared field {missing}",
                    p.name
                )));
            }
        }

        let typed = [
            (&self.soft_delete_field, FieldType::Boolean),
            (&self.last_update_field, FieldType::DateTime),
            (&self.created_field, FieldType::DateTime),
        ];
        for (name, expected) in typed {
            if let Some(name) = name {
                match self.field(name) {
                    Some(f) if f.field_type == expected => {}
                    Some(f) => {
                        return Err(invalid(format!(
                            "field {name} must be {expected:?}, found {:?}",
                            f.field_type
                        )));
                    }
                    None => return Err(invalid(format!("field {name} is not declared"))),
                }
            }
        }
        if let Some(name) = &self.version_field {
            match self.field(name).map(|f| f.field_type) {
                Some(FieldType::Integer | FieldType::Long) => {}
                _ => return Err(invalid(format!("version field {name} must be numeric"))),
            }
        }
        if let Some(name) = &self.version_group_field {
            if self.field(name).is_none() {
                return Err(invalid(format!("version group field {name} is not declared")));
            }
        }
        Ok(())
    }
}

/// Fluent construction of an [`EntityDescriptor`].
#[derive(Debug, Clone)]
pub struct EntityDescriptorBuilder {
    descriptor: EntityDescriptor,
}

impl EntityDescriptorBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.descriptor.fields.push(field);
        self
    }

    /// Declares a field and marks it as part of the key.
    pub fn key(mut self, field: FieldDescriptor) -> Self {
        self.descriptor.key_fields.push(field.name.clone());
        self.descriptor.fields.push(field);
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.descriptor.properties.push(property);
        self
    }

    pub fn soft_delete(mut self, field: &str) -> Self {
        self.descriptor.soft_delete_field = Some(field.into());
        self
    }

    pub fn last_update(mut self, field: &str) -> Self {
        self.descriptor.last_update_field = Some(field.into());
        self
    }

    pub fn created(mut self, field: &str) -> Self {
        self.descriptor.created_field = Some(field.into());
        self
    }

    /// Versions rows per distinct value of `group_field`.
    pub fn versioned(mut self, version_field: &str, group_field: &str) -> Self {
        self.descriptor.version_field = Some(version_field.into());
        self.descriptor.version_group_field = Some(group_field.into());
        self
    }

    /// Validates and returns the descriptor.
    pub fn build(self) -> ModelResult<EntityDescriptor> {
        self.descriptor.validate()?;
        Ok(self.descriptor)
    }
}

/// A physical field as the storage provider sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// Value is encrypted before it reaches the storage provider.
    #[serde(default)]
    pub encrypted: bool,
    /// Value is compressed before it reaches the storage provider.
    #[serde(default)]
    pub compressed: bool,
}

impl FieldDescriptor {
    fn simple(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            encrypted: false,
            compressed: false,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::simple(name, FieldType::Text)
    }

    pub fn integer(name: &str) -> Self {
        Self::simple(name, FieldType::Integer)
    }

    pub fn long(name: &str) -> Self {
        Self::simple(name, FieldType::Long)
    }

    pub fn double(name: &str) -> Self {
        Self::simple(name, FieldType::Double)
    }

    pub fn boolean(name: &str) -> Self {
        Self::simple(name, FieldType::Boolean)
    }

    pub fn datetime(name: &str) -> Self {
        Self::simple(name, FieldType::DateTime)
    }

    pub fn identifier(name: &str) -> Self {
        Self::simple(name, FieldType::Identifier)
    }

    pub fn bytes(name: &str) -> Self {
        Self::simple(name, FieldType::Bytes)
    }

    pub fn text_list(name: &str) -> Self {
        Self::simple(name, FieldType::TextList)
    }

    /// Nested generic document.
    pub fn document(name: &str) -> Self {
        Self::simple(name, FieldType::Document)
    }

    pub fn stream(name: &str) -> Self {
        Self::simple(name, FieldType::Stream)
    }

    /// Marks the field as encrypted at rest.
    #[must_use]
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    /// Marks the field as compressed at rest.
    #[must_use]
    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }
}

/// A logical property backed by one or more physical fields.
///
/// A property mapped onto several fields is a composite virtual property;
/// it can be read and projected but not used for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub storage_fields: Vec<String>,
}

impl PropertyDescriptor {
    /// A property stored under a different physical name.
    pub fn alias(name: &str, field_type: FieldType, storage_field: &str) -> Self {
        Self {
            name: name.into(),
            field_type,
            storage_fields: vec![storage_field.into()],
        }
    }

    /// A text property composed of several physical fields.
    pub fn composite(name: &str, storage_fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Text,
            storage_fields: storage_fields.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

/// The physical type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Long,
    Double,
    Boolean,
    DateTime,
    Identifier,
    Bytes,
    TextList,
    Document,
    Stream,
}

impl FieldType {
    /// Integer, long and double fields.
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Long | Self::Double)
    }
}
