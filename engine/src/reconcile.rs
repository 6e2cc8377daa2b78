//! Reconciliation of imported sections with stored collections.
//!
//! # Algorithm
//!
//! For each decoded section, in document order:
//!
//! 1. Read the value currently stored under the section name
//! 2. If nothing is stored, or the stored value is not an array, the
//!    imported records become the stored value
//! 3. Otherwise combine imported and stored records with the
//!    [`MergeStrategy`]
//! 4. Write the result back
//!
//! There is no transaction across sections. A failed write is recorded in
//! the [`ImportReport`] and the remaining sections are still processed, so
//! a failed import may leave some collections updated and others not.

use crate::error::{Error, Result};
use crate::record::records_to_json;
use crate::section::SkipReason;
use crate::{CollectionName, DecodedSection, Document, KeyValueStore, Record, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How imported records combine with a stored collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MergeStrategy {
    /// Imported records first, then every stored record (default).
    /// No de-duplication is performed.
    #[default]
    Concatenate,
    /// Stored records with a matching `key` are replaced in place; other
    /// imported records go ahead of the stored ones.
    ReplaceById { key: String },
    /// Imported records replace the stored collection.
    ReplaceCollection,
}

impl MergeStrategy {
    /// Parse a strategy name as used in configuration and query strings.
    ///
    /// `key` is only used by `replace-by-id` and defaults to `id`.
    pub fn parse(name: &str, key: Option<&str>) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "concatenate" | "concat" => Ok(MergeStrategy::Concatenate),
            "replace-by-id" | "replace_by_id" => Ok(MergeStrategy::ReplaceById {
                key: key.unwrap_or("id").to_string(),
            }),
            "replace-collection" | "replace_collection" | "replace" => {
                Ok(MergeStrategy::ReplaceCollection)
            }
            other => Err(Error::InvalidStrategy(other.to_string())),
        }
    }
}

/// Combine imported records with the currently stored value.
///
/// Pure: returns the value to store under the section name.
pub fn merge_section(
    strategy: &MergeStrategy,
    existing: Option<serde_json::Value>,
    records: Vec<Record>,
) -> serde_json::Value {
    let stored = match existing {
        Some(serde_json::Value::Array(items)) => items,
        _ => return records_to_json(records),
    };
    let imported = records.into_iter().map(Record::into_json);

    let merged = match strategy {
        MergeStrategy::Concatenate => imported.chain(stored).collect(),
        MergeStrategy::ReplaceCollection => imported.collect(),
        MergeStrategy::ReplaceById { key } => replace_by_id(key, imported, stored),
    };

    serde_json::Value::Array(merged)
}

fn replace_by_id(
    key: &str,
    imported: impl Iterator<Item = serde_json::Value>,
    mut stored: Vec<serde_json::Value>,
) -> Vec<serde_json::Value> {
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, item) in stored.iter().enumerate() {
        if let Some(id) = key_text(item, key) {
            index.entry(id).or_insert(i);
        }
    }

    let mut fresh = Vec::new();
    for item in imported {
        match key_text(&item, key).and_then(|id| index.get(&id)) {
            Some(&i) => stored[i] = item,
            None => fresh.push(item),
        }
    }

    fresh.extend(stored);
    fresh
}

/// Key value as cell text, so that `"7"` and `7` compare equal.
fn key_text(item: &serde_json::Value, key: &str) -> Option<String> {
    match item.get(key)? {
        serde_json::Value::Null => None,
        v => Some(Value::from_json(v.clone()).encode_cell()),
    }
}

/// A section whose write failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionFailure {
    pub name: CollectionName,
    pub error: String,
}

/// Result of importing a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Sections written to the store
    pub sections_imported: usize,
    /// Names of written sections, in document order
    pub imported: Vec<CollectionName>,
    /// Blocks that were not valid sections
    pub skipped: Vec<SkipReason>,
    /// Sections whose write failed
    pub failed: Vec<SectionFailure>,
}

impl ImportReport {
    /// Number of dropped blocks.
    pub fn sections_skipped(&self) -> usize {
        self.skipped.len()
    }

    /// Whether every decoded section was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turn a report with failed writes into an error.
    pub fn into_result(self) -> Result<Self> {
        match self.failed.first() {
            None => Ok(self),
            Some(first) => Err(Error::ImportIncomplete {
                imported: self.sections_imported,
                failed: self.failed.iter().map(|f| f.name.clone()).collect(),
                message: first.error.clone(),
            }),
        }
    }
}

/// Writes decoded sections into a store.
pub struct Reconciler<S> {
    store: S,
    strategy: MergeStrategy,
}

impl<S: KeyValueStore> Reconciler<S> {
    /// Create a new reconciler.
    pub fn new(store: S, strategy: MergeStrategy) -> Self {
        Self { store, strategy }
    }

    /// Reconcile every section of a document.
    pub fn reconcile(mut self, document: Document) -> ImportReport {
        let mut report = ImportReport {
            skipped: document.skipped().cloned().collect(),
            ..ImportReport::default()
        };

        for reason in &report.skipped {
            tracing::debug!(%reason, "skipping block");
        }

        for section in document.into_sections() {
            let name = section.name.clone();
            match self.reconcile_section(section) {
                Ok(stored) => {
                    tracing::debug!(collection = %name, stored, "section imported");
                    report.sections_imported += 1;
                    report.imported.push(name);
                }
                Err(e) => {
                    tracing::warn!(collection = %name, error = %e, "section import failed");
                    report.failed.push(SectionFailure {
                        name,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Reconcile one section. Returns the stored record count.
    pub fn reconcile_section(&mut self, section: DecodedSection) -> Result<usize> {
        let existing = self.store.read(&section.name)?;
        let merged = merge_section(&self.strategy, existing, section.records);
        let count = merged.as_array().map_or(0, Vec::len);
        self.store.write(&section.name, merged)?;
        Ok(count)
    }

    /// Release the store.
    pub fn into_store(self) -> S {
        self.store
    }
}
