pub mod health;
pub mod todo;
pub mod todo_list;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /todo-lists                      list, create, bulk patch, bulk delete
/// /todo-lists/count                count
/// /todo-lists/{id}                 get, replace, update, delete
/// /todo-lists/{id}/todos           list, create, bulk patch, bulk delete (scoped)
///
/// /todos                           list, create, bulk patch, bulk delete
/// /todos/count                     count
/// /todos/{id}                      get, replace, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/todo-lists", todo_list::router())
        .nest("/todos", todo::router())
}
