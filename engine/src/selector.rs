//! Policies choosing which stored collections go into a snapshot.

use crate::error::Result;
use crate::{Collection, CollectionName, KeyValueStore};
use serde::{Deserialize, Serialize};

/// Which collection names are candidates for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "value", rename_all = "camelCase")]
pub enum SnapshotSelector {
    /// A caller-supplied allow-list, in the given order (export)
    Fixed(Vec<CollectionName>),
    /// Every stored name starting with the prefix (backup)
    Prefix(String),
}

impl SnapshotSelector {
    /// Allow-list selector.
    pub fn fixed<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CollectionName>,
    {
        SnapshotSelector::Fixed(names.into_iter().map(Into::into).collect())
    }

    /// Prefix-scan selector.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        SnapshotSelector::Prefix(prefix.into())
    }

    /// Candidate names, before checking what is stored under them.
    pub fn candidate_names<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<Vec<CollectionName>> {
        match self {
            SnapshotSelector::Fixed(names) => Ok(names.clone()),
            SnapshotSelector::Prefix(prefix) => store.list_names(prefix),
        }
    }

    /// Read the candidates that hold a non-empty array of records.
    pub fn select<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<Vec<Collection>> {
        let mut collections = Vec::new();

        for name in self.candidate_names(store)? {
            let Some(value) = store.read(&name)? else {
                tracing::debug!(collection = %name, "nothing stored");
                continue;
            };
            match Collection::from_stored(name.as_str(), &value) {
                Some(collection) => collections.push(collection),
                None => tracing::debug!(collection = %name, "not a non-empty record array, left out"),
            }
        }

        Ok(collections)
    }
}
