//! Handlers for todos scoped to one list: `/todo-lists/{id}/todos`.
//!
//! Every route 404s when the list does not exist.

use axum::extract::{Query, State};
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

/// POST /api/v1/todo-lists/{id}/todos
///
/// `todoListId` may be omitted; if present it must equal the path id.
pub async fn create_list_todo(
    State(state): State<AppState>,
    IdPath(list_id): IdPath,
    JsonPayload(body): JsonPayload,
) -> AppResult<impl IntoResponse> {
    let input: CreateTodo = parse_payload(Todo::FIELDS, body, Mode::Create)?;
    let todo = state.service.children_of(list_id).create(input).await?;

    tracing::info!(list_id, todo_id = todo.id, "Todo created in list");

    Ok(Json(DataResponse { data: todo }))
}

/// GET /api/v1/todo-lists/{id}/todos?filter=
pub async fn list_list_todos(
    State(state): State<AppState>,
    IdPath(list_id): IdPath,
    Query(params): Query<FilterParams>,
) -> AppResult<impl IntoResponse> {
    let filter = params.parse(Todo::FIELDS)?;
    let todos = state.service.children_of(list_id).find(filter).await?;

    Ok(Json(DataResponse { data: todos }))
}

/// PATCH /api/v1/todo-lists/{id}/todos?where=
pub async fn update_list_todos(
    State(state): State<AppState>,
    IdPath(list_id): IdPath,
    Query(params): Query<WhereParams>,
    JsonPayload(body): JsonPayload,
) -> AppResult<impl IntoResponse> {
    let predicate = params.parse(Todo::FIELDS)?;
    let patch: UpdateTodo = parse_payload(Todo::FIELDS, body, Mode::Patch { id: None })?;
    let count = state
        .service
        .children_of(list_id)
        .patch(&patch, predicate)
        .await?;

    tracing::info!(list_id, count, "Todos in list updated");

    Ok(Json(DataResponse::count(count)))
}

/// DELETE /api/v1/todo-lists/{id}/todos?where=
pub async fn delete_list_todos(
    State(state): State<AppState>,
    IdPath(list_id): IdPath,
    Query(params): Query<WhereParams>,
) -> AppResult<impl IntoResponse> {
    let predicate = params.parse(Todo::FIELDS)?;
    let count = state
        .service
        .children_of(list_id)
        .delete(predicate)
        .await?;

    tracing::info!(list_id, count, "Todos in list deleted");

    Ok(Json(DataResponse::count(count)))
}
