//! Key-value store interface and an in-memory implementation.
//!
//! The engine never owns persisted state. Everything it reads or writes
//! goes through [`KeyValueStore`], whose values are JSON documents (usually
//! arrays of record objects, but any JSON value may be stored).

use crate::error::Result;
use crate::CollectionName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persistent storage of named JSON values.
pub trait KeyValueStore {
    /// Read the value stored under `name`.
    fn read(&self, name: &str) -> Result<Option<serde_json::Value>>;

    /// Replace the value stored under `name`.
    fn write(&mut self, name: &str, value: serde_json::Value) -> Result<()>;

    /// Names currently stored that start with `prefix`, in a stable order.
    fn list_names(&self, prefix: &str) -> Result<Vec<CollectionName>>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn read(&self, name: &str) -> Result<Option<serde_json::Value>> {
        (**self).read(name)
    }

    fn write(&mut self, name: &str, value: serde_json::Value) -> Result<()> {
        (**self).write(name, value)
    }

    fn list_names(&self, prefix: &str) -> Result<Vec<CollectionName>> {
        (**self).list_names(prefix)
    }
}

/// An in-memory store. Names enumerate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    entries: BTreeMap<CollectionName, serde_json::Value>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style method to add an entry.
    pub fn with_entry(mut self, name: impl Into<CollectionName>, value: serde_json::Value) -> Self {
        self.entries.insert(name.into(), value);
        self
    }

    /// Get a stored value.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.entries.get(name)
    }

    /// Set a stored value.
    pub fn set(&mut self, name: impl Into<CollectionName>, value: serde_json::Value) {
        self.entries.insert(name.into(), value);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(CollectionName, serde_json::Value)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (CollectionName, serde_json::Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.entries.get(name).cloned())
    }

    fn write(&mut self, name: &str, value: serde_json::Value) -> Result<()> {
        self.entries.insert(name.to_string(), value);
        Ok(())
    }

    fn list_names(&self, prefix: &str) -> Result<Vec<CollectionName>> {
        Ok(self
            .entries
            .range(prefix.to_string()..)
            .map(|(name, _)| name)
            .take_while(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }
}
