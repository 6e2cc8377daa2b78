//! Caller-facing snapshot operations: export, backup and import.
//!
//! Export and backup only read the store. Import writes one value per
//! decoded section and is not atomic across sections: when it returns
//! [`Error::ImportIncomplete`], the sections named as imported have already
//! been written.
//!
//! [`Error::ImportIncomplete`]: crate::Error::ImportIncomplete

use crate::error::Result;
use crate::{
    encode_document, Document, EncodeOptions, ImportReport, KeyValueStore, MergeStrategy,
    Reconciler, SnapshotSelector,
};

/// Encode the allow-listed collections that hold records.
pub fn export<S, N>(store: &S, names: &[N], options: &EncodeOptions) -> Result<String>
where
    S: KeyValueStore + ?Sized,
    N: AsRef<str>,
{
    let selector = SnapshotSelector::fixed(names.iter().map(|n| n.as_ref().to_string()));
    snapshot(store, &selector, options)
}

/// Encode every stored collection under a name prefix.
pub fn backup<S>(store: &S, prefix: &str, options: &EncodeOptions) -> Result<String>
where
    S: KeyValueStore + ?Sized,
{
    snapshot(store, &SnapshotSelector::prefix(prefix), options)
}

/// Encode the collections chosen by a selector.
pub fn snapshot<S>(store: &S, selector: &SnapshotSelector, options: &EncodeOptions) -> Result<String>
where
    S: KeyValueStore + ?Sized,
{
    let collections = selector.select(store)?;
    tracing::debug!(sections = collections.len(), "encoding snapshot");
    encode_document(&collections, options)
}

/// Decode a document and merge it into the store.
///
/// Returns the report when every decoded section was written, and
/// [`crate::Error::ImportIncomplete`] otherwise.
pub fn import<S>(store: &mut S, text: &str, strategy: MergeStrategy) -> Result<ImportReport>
where
    S: KeyValueStore + ?Sized,
{
    let document = Document::decode(text);
    let summary = document.summary();
    tracing::debug!(
        sections = summary.sections.len(),
        records = summary.record_count(),
        skipped = summary.skipped,
        "importing document"
    );

    Reconciler::new(store, strategy)
        .reconcile(document)
        .into_result()
}
