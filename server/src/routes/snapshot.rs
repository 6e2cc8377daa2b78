//! Export, backup and import endpoints.

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::handlers::{self, ImportQuery, ImportResponse, SnapshotQuery};
use crate::AppState;

/// Largest accepted import document.
const MAX_IMPORT_BYTES: usize = 64 * 1024 * 1024;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Create snapshot routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/export", get(export))
        .route("/backup", get(backup))
        .route(
            "/import",
            post(import).layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES)),
        )
}

async fn export(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> Result<impl IntoResponse> {
    let text = handlers::handle_export(&state.pool, &state.config, query).await?;
    Ok(([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], text))
}

async fn backup(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> Result<impl IntoResponse> {
    let text = handlers::handle_backup(&state.pool, &state.config, query).await?;
    Ok(([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], text))
}

async fn import(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportResponse>> {
    let response = handlers::handle_import(&state.pool, &state.config, query, body).await?;
    Ok(Json(response))
}
