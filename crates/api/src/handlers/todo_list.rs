//! Handlers for the `/todo-lists` resource.
//!
//! Single-list routes address one list by id; the collection routes take a
//! `?filter=` (list) or `?where=` (count, bulk patch, bulk delete) query.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use todolist_core::entity::Entity;
use todolist_core::validation::{parse_payload, Mode};
use todolist_db::models::todo_list::{CreateTodoList, TodoList, UpdateTodoList};

use crate::error::AppResult;
use crate::extract::{IdPath, JsonPayload};
use crate::query::{FilterParams, WhereParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// POST /api/v1/todo-lists
pub async fn create_todo_list(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> AppResult<impl IntoResponse> {
    let input: CreateTodoList = parse_payload(TodoList::FIELDS, body, Mode::Create)?;
    let list = state.service.create_parent(&input).await?;

    Ok(Json(DataResponse { data: list }))
}

/// GET /api/v1/todo-lists?filter=
pub async fn list_todo_lists(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> AppResult<impl IntoResponse> {
    let filter = params.parse(TodoList::FIELDS)?;
    let lists = state.service.find_parents(&filter).await?;

    Ok(Json(DataResponse { data: lists }))
}

/// GET /api/v1/todo-lists/count?where=
pub async fn count_todo_lists(
    State(state): State<AppState>,
    Query(params): Query<WhereParams>,
) -> AppResult<impl IntoResponse> {
    let predicate = params.parse(TodoList::FIELDS)?;
    let count = state.service.count_parents(predicate.as_ref()).await?;

    Ok(Json(DataResponse::count(count)))
}

/// PATCH /api/v1/todo-lists?where=
///
/// Merge the body into every matching list.
pub async fn update_todo_lists(
    State(state): State<AppState>,
    Query(params): Query<WhereParams>,
    JsonPayload(body): JsonPayload,
) -> AppResult<impl IntoResponse> {
    let predicate = params.parse(TodoList::FIELDS)?;
    let patch: UpdateTodoList = parse_payload(TodoList::FIELDS, body, Mode::Patch { id: None })?;
    let count = state
        .service
        .update_parents(&patch, predicate.as_ref())
        .await?;

    Ok(Json(DataResponse::count(count)))
}

/// DELETE /api/v1/todo-lists?where=
///
/// Deletes every matching list; todos follow the delete policy.
pub async fn delete_todo_lists(
    State(state): State<AppState>,
    Query(params): Query<WhereParams>,
) -> AppResult<impl IntoResponse> {
    let predicate = params.parse(TodoList::FIELDS)?;
    let count = state.service.delete_parents(predicate.as_ref()).await?;

    Ok(Json(DataResponse::count(count)))
}

// ---------------------------------------------------------------------------
// Single list
// ---------------------------------------------------------------------------

/// GET /api/v1/todo-lists/{id}
pub async fn get_todo_list(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<impl IntoResponse> {
    let list = state.service.find_parent(id).await?;

    Ok(Json(DataResponse { data: list }))
}

/// PUT /api/v1/todo-lists/{id}
///
/// Full replace: omitted optional fields are cleared.
pub async fn replace_todo_list(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonPayload(body): JsonPayload,
) -> AppResult<impl IntoResponse> {
    let input: CreateTodoList = parse_payload(TodoList::FIELDS, body, Mode::Replace { id })?;
    state.service.replace_parent(id, &input).await?;

    Ok(StatusCode::OK)
}

/// PATCH /api/v1/todo-lists/{id}
pub async fn update_todo_list(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonPayload(body): JsonPayload,
) -> AppResult<impl IntoResponse> {
    let patch: UpdateTodoList =
        parse_payload(TodoList::FIELDS, body, Mode::Patch { id: Some(id) })?;
    state.service.update_parent(id, &patch).await?;

    Ok(StatusCode::OK)
}

/// DELETE /api/v1/todo-lists/{id}
pub async fn delete_todo_list(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<impl IntoResponse> {
    state.service.delete_parent(id).await?;

    Ok(StatusCode::OK)
}
