use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;

use crate::catalog::{Catalog, TrajectorySummary};
use crate::error::CatalogError;

const INDEX_HTML: &str = include_str!("../../../assets/index.html");
const APP_JS: &str = include_str!("../../../assets/app.js");

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorDetail>);

fn error_response(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorDetail {
            detail: detail.into(),
        }),
    )
}

// ============================================================
// Error Handling
// ============================================================

/// Map catalog failures onto HTTP statuses.
///
/// Missing ids become 404. A missing data directory is a server-side
/// misconfiguration and its message is passed through; archive build
/// failures are logged in full and reported with a generic detail.
fn catalog_error(e: CatalogError) -> ApiError {
    match e {
        CatalogError::NotFound(_) => {
            tracing::warn!("{}", e);
            error_response(StatusCode::NOT_FOUND, e.to_string())
        }
        CatalogError::DirectoryMissing(_) | CatalogError::Scan { .. } => {
            tracing::error!("Testdata folder unavailable: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        CatalogError::Build { id, source } => {
            tracing::error!("Failed to build MVSX for {}: {}", id, source);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to build MVSX")
        }
    }
}

fn join_error(e: JoinError) -> ApiError {
    tracing::error!("Blocking task failed: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

// ============================================================
// Pages
// ============================================================

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        APP_JS,
    )
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Trajectories
// ============================================================

pub async fn list_trajectories(
    State(catalog): State<Catalog>,
) -> Result<Json<Vec<TrajectorySummary>>, ApiError> {
    tokio::task::spawn_blocking(move || catalog.list())
        .await
        .map_err(join_error)?
        .map(Json)
        .map_err(catalog_error)
}

pub async fn get_mvsx(
    State(catalog): State<Catalog>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let payload = tokio::task::spawn_blocking(move || catalog.fetch_archive(&id))
        .await
        .map_err(join_error)?
        .map_err(catalog_error)?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        payload,
    )
        .into_response())
}
