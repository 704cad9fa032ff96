//! Integration tests for the query endpoint.
//!
//! Tests cover:
//! - Filtering, projection, and ordering
//! - Grouping with APPLY rules
//! - Error categories and status codes
//! - Result size limits

use api::{create_router, AppState};
use axum::http::StatusCode;
use serde_json::json;
use shared::config::QueryConfig;

use super::common::{delete, load_courses, post_json, put_json, room, test_app};

#[tokio::test]
async fn test_filter_project_and_order() {
    let (app, _state) = test_app();
    load_courses(app.clone(), "courses").await;

    let (status, response) = post_json(
        app,
        "/api/v1/query",
        json!({
            "WHERE": {"GT": {"courses_avg": 97}},
            "OPTIONS": {
                "COLUMNS": ["courses_dept", "courses_avg"],
                "ORDER": "courses_avg"
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({"result": [
            {"courses_dept": "math", "courses_avg": 97.5},
            {"courses_dept": "cpsc", "courses_avg": 98},
            {"courses_dept": "epse", "courses_avg": 99}
        ]})
    );
}

#[tokio::test]
async fn test_logic_and_wildcards() {
    let (app, _state) = test_app();
    load_courses(app.clone(), "courses").await;

    let (status, response) = post_json(
        app,
        "/api/v1/query",
        json!({
            "WHERE": {
                "AND": [
                    {"IS": {"courses_dept": "*sc"}},
                    {"NOT": {"EQ": {"courses_year": 2016}}}
                ]
            },
            "OPTIONS": {
                "COLUMNS": ["courses_id", "courses_year"],
                "ORDER": {"dir": "DOWN", "keys": ["courses_id"]}
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({"result": [
            {"courses_id": "310", "courses_year": 2015},
            {"courses_id": "110", "courses_year": 2015}
        ]})
    );
}

#[tokio::test]
async fn test_grouped_average() {
    let (app, _state) = test_app();
    load_courses(app.clone(), "courses").await;

    let (status, response) = post_json(
        app,
        "/api/v1/query",
        json!({
            "WHERE": {},
            "OPTIONS": {
                "COLUMNS": ["courses_dept", "avgMark", "sections"],
                "ORDER": {"dir": "DOWN", "keys": ["avgMark"]}
            },
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept"],
                "APPLY": [
                    {"avgMark": {"AVG": "courses_avg"}},
                    {"sections": {"COUNT": "courses_uuid"}}
                ]
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({"result": [
            {"courses_dept": "epse", "avgMark": 99, "sections": 1},
            {"courses_dept": "cpsc", "avgMark": 87.25, "sections": 3},
            {"courses_dept": "math", "avgMark": 80.75, "sections": 2}
        ]})
    );
}

#[tokio::test]
async fn test_rooms_max_seats_by_building() {
    let (app, _state) = test_app();

    let (status, _) = put_json(
        app.clone(),
        "/api/v1/dataset/rooms/rooms",
        json!([
            room("DMP", "110", 120, "Tables"),
            room("ANGU", "098", 260, "Tables"),
            room("DMP", "201", 40, "Movable Chairs"),
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = post_json(
        app,
        "/api/v1/query",
        json!({
            "WHERE": {"IS": {"rooms_furniture": "*Tables*"}},
            "OPTIONS": {
                "COLUMNS": ["rooms_shortname", "maxSeats"],
                "ORDER": {"dir": "UP", "keys": ["maxSeats"]}
            },
            "TRANSFORMATIONS": {
                "GROUP": ["rooms_shortname"],
                "APPLY": [{"maxSeats": {"MAX": "rooms_seats"}}]
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({"result": [
            {"rooms_shortname": "DMP", "maxSeats": 120},
            {"rooms_shortname": "ANGU", "maxSeats": 260}
        ]})
    );
}

#[tokio::test]
async fn test_structural_errors() {
    let (app, _state) = test_app();
    load_courses(app.clone(), "courses").await;

    for body in [
        json!([1, 2]),
        json!({"OPTIONS": {"COLUMNS": ["courses_dept"]}}),
        json!({"WHERE": {"LIKE": {"courses_dept": "cpsc"}}, "OPTIONS": {"COLUMNS": ["courses_dept"]}}),
        json!({"WHERE": {"GT": {"courses_avg": "97"}}, "OPTIONS": {"COLUMNS": ["courses_dept"]}}),
    ] {
        let (status, response) = post_json(app.clone(), "/api/v1/query", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response["error"], "structural_error", "{body}");
    }
}

#[tokio::test]
async fn test_semantic_errors() {
    let (app, _state) = test_app();
    load_courses(app.clone(), "courses").await;
    let (status, _) = put_json(
        app.clone(),
        "/api/v1/dataset/rooms/rooms",
        json!([room("DMP", "110", 120, "Tables")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for body in [
        json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["courses_dept", "rooms_shortname"]}}),
        json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["courses_dept"], "ORDER": "courses_avg"}}),
        json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["courses_seats"]}}),
        json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept", "courses_title"]},
            "TRANSFORMATIONS": {"GROUP": ["courses_dept"], "APPLY": []}
        }),
    ] {
        let (status, response) = post_json(app.clone(), "/api/v1/query", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response["error"], "semantic_error", "{body}");
    }
}

#[tokio::test]
async fn test_query_after_removal_is_not_found() {
    let (app, _state) = test_app();
    load_courses(app.clone(), "courses").await;

    let query = json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["courses_uuid"]}});

    let (status, _) = post_json(app.clone(), "/api/v1/query", query.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = delete(app.clone(), "/api/v1/dataset/courses").await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = post_json(app, "/api/v1/query", query).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "not_found");
}

#[tokio::test]
async fn test_result_row_limit() {
    let state = AppState::with_in_memory_store().with_query_config(QueryConfig::new(2));
    let app = create_router(state);
    load_courses(app.clone(), "courses").await;

    let (status, response) = post_json(
        app.clone(),
        "/api/v1/query",
        json!({"WHERE": {"IS": {"courses_dept": "math"}}, "OPTIONS": {"COLUMNS": ["courses_uuid"]}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"].as_array().unwrap().len(), 2);

    let (status, response) = post_json(
        app,
        "/api/v1/query",
        json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["courses_uuid"]}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "result_too_large");
}
