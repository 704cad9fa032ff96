//! Query endpoint.
//!
//! Provides an endpoint for executing JSON queries against loaded datasets.

use super::{ok, reject, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use shared::query::{perform_query, ExecutionError, QueryError, QueryErrorKind, ResultRow};

/// Creates the query routes with application state.
pub fn query_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/query", post(post_query))
        .with_state(state)
}

/// Handler for query execution.
///
/// The request body is the query document itself. Rejected queries return
/// 400 with the error category as `error`, except a missing dataset, which
/// returns 404.
async fn post_query(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Vec<ResultRow>> {
    let Json(raw) = payload.map_err(|rejection| {
        reject(
            StatusCode::BAD_REQUEST,
            QueryErrorKind::Structural.as_str(),
            rejection.body_text(),
        )
    })?;

    let rows = perform_query(&raw, state.dataset_store(), state.query_config()).map_err(|e| {
        let kind = e.kind();
        if let QueryError::Execution(ExecutionError::Storage(_)) = e {
            tracing::error!(error = %e, "Failed to execute query");
        } else {
            tracing::debug!(error = %e, %kind, "Query rejected");
        }
        let status = match kind {
            QueryErrorKind::NotFound => StatusCode::NOT_FOUND,
            QueryErrorKind::Structural
            | QueryErrorKind::Semantic
            | QueryErrorKind::ResultTooLarge
            | QueryErrorKind::Execution => StatusCode::BAD_REQUEST,
        };
        reject(status, kind.as_str(), e.to_string())
    })?;

    tracing::debug!(rows = rows.len(), "Query executed successfully");
    ok(rows)
}
