//! HTTP-level integration tests for the top-level `/todos` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create, delete, encode, get, patch_json, post_json, put_json};
use serde_json::json;

#[tokio::test]
async fn create_defaults_is_complete() {
    let app = build_test_app();
    let todo = create(app, "/api/v1/todos", json!({"title": "x"})).await;

    assert_eq!(todo["title"], "x");
    assert_eq!(todo["isComplete"], false);
    assert_eq!(todo["desc"], serde_json::Value::Null);
    assert_eq!(todo["todoListId"], serde_json::Value::Null);
}

#[tokio::test]
async fn create_without_title_returns_422() {
    let app = build_test_app();
    let response = post_json(app.clone(), "/api/v1/todos", json!({"desc": "no title"})).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"][0]["field"], "title");

    let count = body_json(get(app, "/api/v1/todos/count").await).await;
    assert_eq!(count["data"]["count"], 0);
}

#[tokio::test]
async fn create_reports_every_bad_field() {
    let app = build_test_app();
    let response = post_json(
        app,
        "/api/v1/todos",
        json!({"title": 3, "isComplete": "yes", "priority": 1}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    let mut fields: Vec<_> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect();
    fields.sort();
    assert_eq!(fields, vec!["isComplete", "priority", "title"]);
}

#[tokio::test]
async fn create_with_unknown_list_returns_422() {
    let app = build_test_app();
    let response = post_json(app, "/api/v1/todos", json!({"title": "x", "todoListId": 404})).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "todoListId");
    assert_eq!(json["details"][0]["code"], "foreign_key");
}

#[tokio::test]
async fn patch_null_clears_optional_fields() {
    let app = build_test_app();
    let todo = create(
        app.clone(),
        "/api/v1/todos",
        json!({"title": "Buy milk", "desc": "2 litres", "isComplete": true}),
    )
    .await;
    let id = todo["id"].as_i64().unwrap();

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/todos/{id}"),
        json!({"desc": null, "isComplete": null}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app, &format!("/api/v1/todos/{id}")).await).await;
    assert_eq!(json["data"]["title"], "Buy milk");
    assert_eq!(json["data"]["desc"], serde_json::Value::Null);
    assert_eq!(json["data"]["isComplete"], false);
}

#[tokio::test]
async fn patch_with_matching_id_is_accepted() {
    let app = build_test_app();
    let todo = create(app.clone(), "/api/v1/todos", json!({"title": "a"})).await;
    let id = todo["id"].as_i64().unwrap();

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/todos/{id}"),
        json!({"id": id, "title": "b"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = patch_json(
        app,
        &format!("/api/v1/todos/{id}"),
        json!({"id": id + 1, "title": "c"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn replace_resets_omitted_fields() {
    let app = build_test_app();
    let todo = create(
        app.clone(),
        "/api/v1/todos",
        json!({"title": "Buy milk", "desc": "2 litres", "isComplete": true}),
    )
    .await;
    let id = todo["id"].as_i64().unwrap();

    let response = put_json(app.clone(), &format!("/api/v1/todos/{id}"), json!({"title": "Buy oat milk"})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app, &format!("/api/v1/todos/{id}")).await).await;
    assert_eq!(
        json["data"],
        json!({"id": id, "title": "Buy oat milk", "desc": null, "isComplete": false, "todoListId": null})
    );
}

#[tokio::test]
async fn missing_todo_returns_404_everywhere() {
    let app = build_test_app();
    assert_eq!(get(app.clone(), "/api/v1/todos/7").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        put_json(app.clone(), "/api/v1/todos/7", json!({"title": "x"})).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        patch_json(app.clone(), "/api/v1/todos/7", json!({"title": "x"})).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(delete(app, "/api/v1/todos/7").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn count_then_delete_all() {
    let app = build_test_app();
    create(app.clone(), "/api/v1/todos", json!({"title": "a"})).await;
    create(app.clone(), "/api/v1/todos", json!({"title": "b"})).await;

    let json = body_json(get(app.clone(), "/api/v1/todos/count").await).await;
    assert_eq!(json["data"]["count"], 2);

    let response = delete(app.clone(), "/api/v1/todos").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app, "/api/v1/todos/count").await).await;
    assert_eq!(json["data"]["count"], 0);
}

#[tokio::test]
async fn bulk_patch_and_delete_honour_where() {
    let app = build_test_app();
    for title in ["Buy milk", "Buy bread", "Walk dog"] {
        create(app.clone(), "/api/v1/todos", json!({"title": title})).await;
    }

    let buying = encode(&json!({"title": {"like": "Buy%"}}));
    let response = patch_json(
        app.clone(),
        &format!("/api/v1/todos?where={buying}"),
        json!({"isComplete": true}),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["count"], 2);

    let done = encode(&json!({"isComplete": true}));
    let response = delete(app.clone(), &format!("/api/v1/todos?where={done}")).await;
    assert_eq!(body_json(response).await["data"]["count"], 2);

    let json = body_json(get(app, "/api/v1/todos").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["title"], "Walk dog");
}

#[tokio::test]
async fn list_orders_and_pages() {
    let app = build_test_app();
    for title in ["c", "a", "b", "d"] {
        create(app.clone(), "/api/v1/todos", json!({"title": title})).await;
    }

    let filter = encode(&json!({"order": ["title ASC"], "skip": 1, "limit": 2}));
    let json = body_json(get(app, &format!("/api/v1/todos?filter={filter}")).await).await;
    let titles: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["b", "c"]);
}
