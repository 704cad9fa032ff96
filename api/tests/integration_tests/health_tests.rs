//! Integration tests for health check and general API functionality.
//!
//! Tests cover:
//! - Health check endpoint and dataset count
//! - Empty registry behavior

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, load_courses, post_json, test_app};

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "insight-api");
    assert_eq!(response["datasets"], 0);
}

#[tokio::test]
async fn test_health_counts_uploaded_datasets() {
    let (app, _state) = test_app();
    load_courses(app.clone(), "courses").await;
    load_courses(app.clone(), "archive").await;

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["datasets"], 2);
}

#[tokio::test]
async fn test_empty_registry() {
    let (app, _state) = test_app();

    let (status, response) = get(app.clone(), "/api/v1/datasets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"result": []}));

    let (status, response) = post_json(
        app,
        "/api/v1/query",
        json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["courses_dept"]}}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "not_found");
}
