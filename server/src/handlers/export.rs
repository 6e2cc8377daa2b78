//! Export and backup handlers - encode stored collections as a document.

use crate::config::Config;
use crate::db;
use crate::error::Result;
use serde::Deserialize;
use sqlx::PgPool;
use stockpile_engine::{snapshot, EncodeOptions};

/// Query parameters for export and backup.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQuery {
    /// Emit typed header columns (defaults to configuration)
    pub typed: Option<bool>,
    /// Key prefix for backup (defaults to configuration)
    pub prefix: Option<String>,
}

impl SnapshotQuery {
    fn options(&self, config: &Config) -> EncodeOptions {
        EncodeOptions {
            typed_header: self.typed.unwrap_or(config.typed_headers),
        }
    }
}

/// Export the configured allow-list of collections.
pub async fn handle_export(pool: &PgPool, config: &Config, query: SnapshotQuery) -> Result<String> {
    let names = &config.export_collections;
    let entries = db::get_entries(pool, names).await?;
    let latest = db::latest_update(&entries);
    let store = db::into_memory_store(entries);

    let text = snapshot::export(&store, names, &query.options(config))?;
    tracing::info!(bytes = text.len(), latest = ?latest, "export created");
    Ok(text)
}

/// Back up every collection under a key prefix.
pub async fn handle_backup(pool: &PgPool, config: &Config, query: SnapshotQuery) -> Result<String> {
    let options = query.options(config);
    let prefix = query.prefix.unwrap_or_else(|| config.backup_prefix.clone());
    let entries = db::get_entries_with_prefix(pool, &prefix).await?;
    let latest = db::latest_update(&entries);
    let store = db::into_memory_store(entries);

    let text = snapshot::backup(&store, &prefix, &options)?;
    tracing::info!(
        prefix = %prefix,
        entries = store.len(),
        bytes = text.len(),
        latest = ?latest,
        "backup created"
    );
    Ok(text)
}
