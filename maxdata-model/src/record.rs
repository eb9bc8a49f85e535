use maxdata_types::DataValue;
use serde::{Deserialize, Serialize};

/// Ordered field values of one stored row, with a changed flag per field.
///
/// Flags are raised by [`Record::set`] when a value actually differs and are
/// cleared after a successful save. Values put in by a storage provider via
/// [`Record::load`] start unchanged.
///
/// Cloning yields an independent copy whose changed flags are all reset.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Vec<RecordField>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordField {
    name: String,
    value: DataValue,
    #[serde(skip)]
    changed: bool,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.position(name).map(|i| &self.fields[i].value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Sets a field, raising its changed flag if the value differs.
    /// Returns whether the record changed.
    pub fn set(&mut self, name: &str, value: impl Into<DataValue>) -> bool {
        let value = value.into();
        match self.position(name) {
            Some(i) => {
                let field = &mut self.fields[i];
                if field.value == value {
                    return false;
                }
                field.value = value;
                field.changed = true;
            }
            None => self.fields.push(RecordField {
                name: name.into(),
                value,
                changed: true,
            }),
        }
        true
    }

    /// Sets a field without raising its changed flag.
    pub fn load(&mut self, name: &str, value: impl Into<DataValue>) {
        let value = value.into();
        match self.position(name) {
            Some(i) => {
                self.fields[i].value = value;
                self.fields[i].changed = false;
            }
            None => self.fields.push(RecordField {
                name: name.into(),
                value,
                changed: false,
            }),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<DataValue> {
        self.position(name).map(|i| self.fields.remove(i).value)
    }

    pub fn is_changed(&self, name: &str) -> bool {
        self.position(name).is_some_and(|i| self.fields[i].changed)
    }

    pub fn has_changes(&self) -> bool {
        self.fields.iter().any(|f| f.changed)
    }

    /// True if any field other than `ignored` has changed.
    pub fn has_changes_except(&self, ignored: &[&str]) -> bool {
        self.fields
            .iter()
            .any(|f| f.changed && !ignored.contains(&f.name.as_str()))
    }

    pub fn changed_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.changed)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn clear_changed(&mut self) {
        for field in &mut self.fields {
            field.changed = false;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.fields.iter().map(|f| (f.name.as_str(), &f.value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Keeps only the named fields, preserving their order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.fields.retain(|f| keep(&f.name));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl Clone for Record {
    fn clone(&self) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .map(|f| RecordField {
                    name: f.name.clone(),
                    value: f.value.clone(),
                    changed: false,
                })
                .collect(),
        }
    }
}

/// Two records are equal when they hold the same values under the same
/// names, regardless of field order or changed flags.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(name, value)| other.get(name) == Some(value))
    }
}

impl<S: Into<String>, V: Into<DataValue>> FromIterator<(S, V)> for Record {
    /// Builds a freshly loaded record (no changed flags).
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            let name: String = name.into();
            record.load(&name, value);
        }
        record
    }
}
