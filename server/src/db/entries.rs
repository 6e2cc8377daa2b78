//! Database operations for the kv_entries table.

use super::SectionStore;
use sqlx::{PgConnection, PgExecutor, PgPool, Row};
use stockpile_engine::MemoryStore;

/// A stored key-value row from the database.
#[derive(Debug)]
pub struct StoredEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredEntry {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredEntry {
            key: row.try_get("key")?,
            value: row.try_get("value")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Most recent change among the rows.
pub fn latest_update(entries: &[StoredEntry]) -> Option<chrono::DateTime<chrono::Utc>> {
    entries.iter().map(|e| e.updated_at).max()
}

/// Load rows into an in-memory store for the snapshot engine.
pub fn into_memory_store(entries: Vec<StoredEntry>) -> MemoryStore {
    entries.into_iter().map(|e| (e.key, e.value)).collect()
}

/// Get the entries for a set of keys. Missing keys are absent from the result.
pub async fn get_entries(pool: &PgPool, keys: &[String]) -> Result<Vec<StoredEntry>, sqlx::Error> {
    sqlx::query_as::<_, StoredEntry>(
        r#"
        SELECT key, value, updated_at
        FROM kv_entries
        WHERE key = ANY($1)
        "#,
    )
    .bind(keys)
    .fetch_all(pool)
    .await
}

/// Get every entry whose key starts with a prefix, ordered by key.
pub async fn get_entries_with_prefix(
    pool: &PgPool,
    prefix: &str,
) -> Result<Vec<StoredEntry>, sqlx::Error> {
    sqlx::query_as::<_, StoredEntry>(
        r#"
        SELECT key, value, updated_at
        FROM kv_entries
        WHERE left(key, char_length($1)) = $1
        ORDER BY key
        "#,
    )
    .bind(prefix)
    .fetch_all(pool)
    .await
}

/// Lock a key for the rest of the transaction and read its value.
///
/// The advisory lock also serializes updates of keys that have no row yet.
pub async fn lock_entry(
    conn: &mut PgConnection,
    key: &str,
) -> Result<Option<serde_json::Value>, sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(key)
        .execute(&mut *conn)
        .await?;

    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT value FROM kv_entries WHERE key = $1 FOR UPDATE")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(row.map(|(value,)| value))
}

/// Upsert an entry (insert or replace its value).
///
/// The value is sent as text and cast to `json` so key order is kept.
pub async fn upsert_entry<'e, E>(executor: E, key: &str, value: &serde_json::Value) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO kv_entries (key, value, updated_at)
        VALUES ($1, CAST($2 AS JSON), NOW())
        ON CONFLICT (key) DO UPDATE SET
            value = EXCLUDED.value,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(executor)
    .await?;

    Ok(())
}

impl SectionStore for PgPool {
    type Error = sqlx::Error;

    async fn update<F>(&self, key: &str, merge: F) -> Result<usize, sqlx::Error>
    where
        F: FnOnce(Option<serde_json::Value>) -> serde_json::Value + Send,
    {
        let mut tx = self.begin().await?;

        let existing = lock_entry(&mut *tx, key).await?;
        let merged = merge(existing);
        let count = merged.as_array().map_or(0, Vec::len);
        upsert_entry(&mut *tx, key, &merged).await?;

        tx.commit().await?;
        Ok(count)
    }
}
