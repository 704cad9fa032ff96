//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup, HTTP request helpers, and dataset fixtures.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};

/// Creates a test router with a fresh in-memory registry.
///
/// # Returns
///
/// A tuple containing the configured router and the app state.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::with_in_memory_store();
    let router = create_router(state.clone());
    (router, state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Helper to make a POST request with JSON body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, json_request("POST", uri, &body)).await
}

/// Helper to make a PUT request with JSON body.
pub async fn put_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, json_request("PUT", uri, &body)).await
}

/// Helper to make a GET request.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Helper to make a DELETE request.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// A raw course-file row.
pub fn course_row(id: u32, dept: &str, course: &str, year: &str, avg: f64) -> Value {
    json!({
        "id": id,
        "Course": course,
        "Title": format!("{dept} {course}"),
        "Professor": "smith, jane",
        "Subject": dept,
        "Year": year,
        "Avg": avg,
        "Pass": 40,
        "Fail": 2,
        "Audit": 0,
        "Section": "101"
    })
}

/// A small, hand-checked set of course rows.
pub fn course_rows() -> Value {
    json!([
        course_row(1, "cpsc", "310", "2015", 98.0),
        course_row(2, "cpsc", "310", "2016", 91.5),
        course_row(3, "cpsc", "110", "2015", 72.25),
        course_row(4, "math", "100", "2015", 97.5),
        course_row(5, "math", "200", "2016", 64.0),
        course_row(6, "epse", "421", "2014", 99.0),
    ])
}

/// A room object.
pub fn room(shortname: &str, number: &str, seats: u32, furniture: &str) -> Value {
    json!({
        "fullname": format!("{shortname} Building"),
        "shortname": shortname,
        "number": number,
        "name": format!("{shortname}_{number}"),
        "address": "2329 West Mall",
        "lat": 49.264,
        "lon": -123.25,
        "seats": seats,
        "type": "Small Group",
        "furniture": furniture,
        "href": format!("http://example.com/{shortname}-{number}")
    })
}

/// Uploads the course fixture as `id`.
pub async fn load_courses(app: Router, id: &str) {
    let (status, body) = put_json(app, &format!("/api/v1/dataset/{id}/sections"), course_rows()).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {body}");
}
