//! API route definitions.
//!
//! This module organizes all HTTP routes for the Insight API server.
//! Successful responses wrap their payload as `{"result": ...}`; failures
//! carry `{"error": code, "message": text}`.

mod datasets;
mod health;
mod query;

pub use datasets::dataset_routes;
pub use health::health_routes;
pub use query::query_routes;

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Successful response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultResponse<T> {
    /// The payload.
    pub result: T,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,
    /// Detailed error message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates an error body.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Handler result: a JSON envelope or a status with an error body.
type ApiResult<T> = Result<Json<ResultResponse<T>>, (StatusCode, Json<ErrorResponse>)>;

fn ok<T>(result: T) -> ApiResult<T> {
    Ok(Json(ResultResponse { result }))
}

fn reject(
    status: StatusCode,
    error: impl Into<String>,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse::new(error, message)))
}
