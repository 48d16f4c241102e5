//! Handlers for the top-level `/todos` resource.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use todolist_core::entity::Entity;
use todolist_core::validation::{parse_payload, Mode};
use todolist_db::models::todo::{CreateTodo, Todo, UpdateTodo};

use crate::error::AppResult;
use crate::extract::{IdPath, JsonPayload};
use crate::query::{FilterParams, WhereParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// POST /api/v1/todos
pub async fn create_todo(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> AppResult<impl IntoResponse> {
    let input: CreateTodo = parse_payload(Todo::FIELDS, body, Mode::Create)?;
    let todo = state.service.create_child(&input).await?;

    Ok(Json(DataResponse { data: todo }))
}

/// GET /api/v1/todos?filter=
pub async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> AppResult<impl IntoResponse> {
    let filter = params.parse(Todo::FIELDS)?;
    let todos = state.service.find_children(&filter).await?;

    Ok(Json(DataResponse { data: todos }))
}

/// GET /api/v1/todos/count?where=
pub async fn count_todos(
    State(state): State<AppState>,
    Query(params): Query<WhereParams>,
) -> AppResult<impl IntoResponse> {
    let predicate = params.parse(Todo::FIELDS)?;
    let count = state.service.count_children(predicate.as_ref()).await?;

    Ok(Json(DataResponse::count(count)))
}

/// PATCH /api/v1/todos?where=
pub async fn update_todos(
    State(state): State<AppState>,
    Query(params): Query<WhereParams>,
    JsonPayload(body): JsonPayload,
) -> AppResult<impl IntoResponse> {
    let predicate = params.parse(Todo::FIELDS)?;
    let patch: UpdateTodo = parse_payload(Todo::FIELDS, body, Mode::Patch { id: None })?;
    let count = state
        .service
        .update_children(&patch, predicate.as_ref())
        .await?;

    Ok(Json(DataResponse::count(count)))
}

/// DELETE /api/v1/todos?where=
pub async fn delete_todos(
    State(state): State<AppState>,
    Query(params): Query<WhereParams>,
) -> AppResult<impl IntoResponse> {
    let predicate = params.parse(Todo::FIELDS)?;
    let count = state.service.delete_children(predicate.as_ref()).await?;

    Ok(Json(DataResponse::count(count)))
}

// ---------------------------------------------------------------------------
// Single todo
// ---------------------------------------------------------------------------

/// GET /api/v1/todos/{id}
pub async fn get_todo(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<impl IntoResponse> {
    let todo = state.service.find_child(id).await?;

    Ok(Json(DataResponse { data: todo }))
}

/// PUT /api/v1/todos/{id}
pub async fn replace_todo(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonPayload(body): JsonPayload,
) -> AppResult<impl IntoResponse> {
    let input: CreateTodo = parse_payload(Todo::FIELDS, body, Mode::Replace { id })?;
    state.service.replace_child(id, &input).await?;

    Ok(StatusCode::OK)
}

/// PATCH /api/v1/todos/{id}
pub async fn update_todo(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonPayload(body): JsonPayload,
) -> AppResult<impl IntoResponse> {
    let patch: UpdateTodo = parse_payload(Todo::FIELDS, body, Mode::Patch { id: Some(id) })?;
    state.service.update_child(id, &patch).await?;

    Ok(StatusCode::OK)
}

/// DELETE /api/v1/todos/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<impl IntoResponse> {
    state.service.delete_child(id).await?;

    Ok(StatusCode::OK)
}
