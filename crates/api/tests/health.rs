mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get};

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = build_test_app();

    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["data_source"], "memory");
    assert_eq!(json["store_healthy"], true);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = build_test_app();

    let response = get(app, "/health").await;

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app();

    let response = get(app, "/api/v1/projects").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
