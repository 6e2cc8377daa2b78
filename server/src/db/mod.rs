//! Database module for PostgreSQL persistence.

mod entries;

pub use entries::*;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::future::Future;

/// Type alias for the database pool.
pub type Pool = PgPool;

/// Create a new database connection pool.
pub async fn create_pool(database_url: &str) -> Result<Pool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations.
pub async fn run_migrations(pool: &Pool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Read-merge-write access to stored values, one key at a time.
pub trait SectionStore {
    type Error: std::fmt::Display;

    /// Replace the value under `key` with `merge(current)`.
    ///
    /// The read and the write are atomic with respect to other updates of
    /// the same key. Returns the number of elements in the written array.
    fn update<F>(&self, key: &str, merge: F) -> impl Future<Output = Result<usize, Self::Error>> + Send
    where
        F: FnOnce(Option<serde_json::Value>) -> serde_json::Value + Send;
}
