//! Integration tests for dataset management.
//!
//! Tests cover:
//! - Uploading sections and rooms datasets
//! - Id and kind validation
//! - Listing and removal

use axum::http::StatusCode;
use serde_json::json;

use super::common::{course_rows, delete, get, load_courses, put_json, room, test_app};

#[tokio::test]
async fn test_upload_list_and_remove() {
    let (app, _state) = test_app();

    load_courses(app.clone(), "courses").await;

    let (status, response) = put_json(
        app.clone(),
        "/api/v1/dataset/rooms/rooms",
        json!([room("DMP", "110", 120, "Fixed Tables"), room("DMP", "201", 40, "Movable Chairs")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"result": ["courses", "rooms"]}));

    let (status, response) = get(app.clone(), "/api/v1/datasets").await;
    assert_eq!(status, StatusCode::OK);
    let datasets = response["result"].as_array().unwrap();
    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0]["id"], "courses");
    assert_eq!(datasets[0]["kind"], "sections");
    assert_eq!(datasets[0]["numRows"], 6);
    assert_eq!(datasets[1]["id"], "rooms");
    assert_eq!(datasets[1]["kind"], "rooms");
    assert_eq!(datasets[1]["numRows"], 2);
    assert!(datasets[1]["loadedAt"].is_string());

    let (status, response) = delete(app.clone(), "/api/v1/dataset/courses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"result": "courses"}));

    let (_, response) = get(app, "/api/v1/datasets").await;
    assert_eq!(response["result"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_id_rejected() {
    let (app, _state) = test_app();

    load_courses(app.clone(), "courses").await;

    let (status, response) =
        put_json(app, "/api/v1/dataset/courses/sections", course_rows()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "already_exists");
}

#[tokio::test]
async fn test_invalid_ids_rejected() {
    let (app, _state) = test_app();

    for uri in [
        "/api/v1/dataset/my_courses/sections",
        "/api/v1/dataset/%20/sections",
    ] {
        let (status, response) = put_json(app.clone(), uri, course_rows()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response["error"], "invalid_id", "{uri}");
    }
}

#[tokio::test]
async fn test_room_out_of_range_rejected() {
    let (app, _state) = test_app();

    let mut bad = room("DMP", "110", 120, "Fixed Tables");
    bad["lat"] = json!(123.0);

    let (status, response) = put_json(app, "/api/v1/dataset/rooms/rooms", json!([bad])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_record");
}

#[tokio::test]
async fn test_remove_missing_dataset() {
    let (app, _state) = test_app();

    let (status, response) = delete(app, "/api/v1/dataset/courses").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "not_found");
}

#[tokio::test]
async fn test_overall_sections_load_with_year_1900() {
    let (app, _state) = test_app();

    let mut overall = super::common::course_row(7, "cpsc", "310", "2015", 85.0);
    overall["Section"] = json!("overall");

    let (status, _) = put_json(app.clone(), "/api/v1/dataset/courses/sections", json!([overall])).await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = super::common::post_json(
        app,
        "/api/v1/query",
        json!({"WHERE": {"EQ": {"courses_year": 1900}}, "OPTIONS": {"COLUMNS": ["courses_uuid"]}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"result": [{"courses_uuid": "7"}]}));
}
