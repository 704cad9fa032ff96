//! Health check endpoint.
//!
//! Reports liveness together with the number of loaded datasets. Returns 503
//! when the dataset registry cannot be read.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the registry is unreadable.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Number of loaded datasets; absent when degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasets: Option<usize>,
}

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, datasets) = match state.dataset_store().list() {
        Ok(loaded) => (StatusCode::OK, "healthy", Some(loaded.len())),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not read dataset registry");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", None)
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            service: "insight-api",
            version: env!("CARGO_PKG_VERSION"),
            datasets,
        }),
    )
}
