//! Dataset management endpoints.
//!
//! Provides endpoints for adding, removing, and listing datasets.

use super::{ok, reject, ApiResult, ErrorResponse};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde_json::Value;
use shared::models::{Dataset, DatasetInfo, DatasetKind};
use shared::storage::{validate_dataset_id, DatasetStoreError};

/// Creates the dataset routes with application state.
pub fn dataset_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/dataset/{id}/{kind}", put(put_dataset))
        .route("/api/v1/dataset/{id}", delete(delete_dataset))
        .route("/api/v1/datasets", get(list_datasets))
        .with_state(state)
}

/// Maps a registry failure to a status and error body.
fn store_error(e: DatasetStoreError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match e {
        DatasetStoreError::InvalidId(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
        DatasetStoreError::AlreadyExists(_) => (StatusCode::BAD_REQUEST, "already_exists"),
        DatasetStoreError::EmptyDataset(_) => (StatusCode::BAD_REQUEST, "empty_dataset"),
        DatasetStoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        DatasetStoreError::LockError => {
            tracing::error!(error = %e, "Dataset store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    };
    reject(status, code, e.to_string())
}

/// Handler for dataset upload.
///
/// The body is a JSON array of rows: raw course rows for `sections`,
/// room objects for `rooms`. Returns the ids of all loaded datasets.
async fn put_dataset(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
    payload: Result<Json<Vec<Value>>, JsonRejection>,
) -> ApiResult<Vec<String>> {
    validate_dataset_id(&id).map_err(store_error)?;

    let kind: DatasetKind = kind
        .parse()
        .map_err(|message: String| reject(StatusCode::BAD_REQUEST, "invalid_kind", message))?;

    let Json(rows) = payload.map_err(|rejection| {
        reject(
            StatusCode::BAD_REQUEST,
            "invalid_json",
            rejection.body_text(),
        )
    })?;

    let dataset = Dataset::from_json_rows(id.as_str(), kind, rows).map_err(|e| {
        tracing::debug!(dataset = %id, %kind, error = %e, "Rejected dataset upload");
        reject(StatusCode::BAD_REQUEST, "invalid_record", e.to_string())
    })?;

    let ids = state.dataset_store().add(dataset).map_err(store_error)?;
    ok(ids)
}

/// Handler for dataset removal.
async fn delete_dataset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    let removed = state.dataset_store().remove(&id).map_err(store_error)?;
    ok(removed)
}

/// Handler for listing loaded datasets.
async fn list_datasets(State(state): State<AppState>) -> ApiResult<Vec<DatasetInfo>> {
    let datasets = state.dataset_store().list().map_err(store_error)?;
    ok(datasets)
}
