//! Import handler - merges a document into the stored collections.

use crate::config::Config;
use crate::db::SectionStore;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use stockpile_engine::{
    merge_section, Document, ImportReport, MergeStrategy, SectionFailure, SkipReason,
};

/// Query parameters for import.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportQuery {
    /// `concatenate`, `replace-by-id` or `replace-collection`
    pub strategy: Option<String>,
    /// Key field for `replace-by-id`
    pub key: Option<String>,
}

impl ImportQuery {
    /// The requested strategy, or the configured default.
    pub fn strategy(&self, config: &Config) -> Result<MergeStrategy> {
        match &self.strategy {
            Some(name) => MergeStrategy::parse(name, self.key.as_deref())
                .map_err(|e| AppError::BadRequest(e.to_string())),
            None => Ok(config.merge_strategy.clone()),
        }
    }
}

/// Response for import.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Sections written to the store
    pub sections_imported: usize,
    /// Blocks that were not valid sections
    pub sections_skipped: usize,
    /// Names of written sections
    pub imported: Vec<String>,
    /// Why blocks were skipped
    pub skipped: Vec<SkipReason>,
}

impl From<ImportReport> for ImportResponse {
    fn from(report: ImportReport) -> Self {
        Self {
            sections_imported: report.sections_imported,
            sections_skipped: report.sections_skipped(),
            imported: report.imported,
            skipped: report.skipped,
        }
    }
}

/// Process an import request.
///
/// Each section is merged in its own transaction. A failed section does not
/// stop the others; the request then fails with the partial outcome in the
/// error details.
pub async fn handle_import(
    pool: &PgPool,
    config: &Config,
    query: ImportQuery,
    body: String,
) -> Result<ImportResponse> {
    let strategy = query.strategy(config)?;

    let document = Document::decode(&body);
    let summary = document.summary();
    tracing::info!(
        sections = summary.sections.len(),
        records = summary.record_count(),
        skipped = summary.skipped,
        strategy = ?strategy,
        "importing document"
    );

    let report = import_document(pool, document, &strategy).await;
    Ok(report.into_result()?.into())
}

/// Merge every decoded section into the store, continuing past failures.
pub async fn import_document<S>(store: &S, document: Document, strategy: &MergeStrategy) -> ImportReport
where
    S: SectionStore + Sync,
{
    let mut report = ImportReport {
        skipped: document.skipped().cloned().collect(),
        ..ImportReport::default()
    };

    for section in document.into_sections() {
        let name = section.name.clone();
        let records = section.records;
        let merge = move |existing| merge_section(strategy, existing, records);

        match store.update(&name, merge).await {
            Ok(stored) => {
                tracing::debug!(collection = %name, stored, "section imported");
                report.sections_imported += 1;
                report.imported.push(name);
            }
            Err(e) => {
                tracing::warn!(collection = %name, "Failed to import section: {}", e);
                report.failed.push(SectionFailure {
                    name,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
