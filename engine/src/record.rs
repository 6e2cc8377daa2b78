//! Records and named collections.

use crate::{CollectionName, Value};

/// A flat, ordered mapping from field name to value.
///
/// Field order is insertion order; it decides the header when the record
/// is the first of its collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a field. An existing field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a record from a JSON object. Returns `None` for anything else.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            fields: obj
                .iter()
                .map(|(k, v)| (k.clone(), Value::from_json(v.clone())))
                .collect(),
        })
    }

    /// Convert into a JSON object.
    pub fn into_json(self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .into_iter()
            .map(|(k, v)| (k, v.into_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// A named, ordered list of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub name: CollectionName,
    pub records: Vec<Record>,
}

impl Collection {
    /// Create a collection.
    pub fn new(name: impl Into<CollectionName>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Interpret a stored value as a collection.
    ///
    /// Only a non-empty array whose elements are all objects qualifies.
    pub fn from_stored(name: impl Into<CollectionName>, value: &serde_json::Value) -> Option<Self> {
        let items = value.as_array()?;
        if items.is_empty() {
            return None;
        }
        let records = items
            .iter()
            .map(Record::from_json)
            .collect::<Option<Vec<_>>>()?;
        Some(Self::new(name, records))
    }

    /// Convert the records into the stored JSON array form.
    pub fn into_json(self) -> serde_json::Value {
        records_to_json(self.records)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the collection has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Convert records into a JSON array.
pub fn records_to_json(records: Vec<Record>) -> serde_json::Value {
    serde_json::Value::Array(records.into_iter().map(Record::into_json).collect())
}
