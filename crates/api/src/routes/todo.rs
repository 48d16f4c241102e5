//! Route definitions for top-level todos.

use axum::routing::get;
use axum::Router;

use crate::handlers::todo;
use crate::state::AppState;

/// Routes mounted at `/todos`.
///
/// ```text
/// GET    /        -> list_todos
/// POST   /        -> create_todo
/// PATCH  /        -> update_todos
/// DELETE /        -> delete_todos
/// GET    /count   -> count_todos
/// GET    /{id}    -> get_todo
/// PUT    /{id}    -> replace_todo
/// PATCH  /{id}    -> update_todo
/// DELETE /{id}    -> delete_todo
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(todo::list_todos)
                .post(todo::create_todo)
                .patch(todo::update_todos)
                .delete(todo::delete_todos),
        )
        .route("/count", get(todo::count_todos))
        .route(
            "/{id}",
            get(todo::get_todo)
                .put(todo::replace_todo)
                .patch(todo::update_todo)
                .delete(todo::delete_todo),
        )
}
