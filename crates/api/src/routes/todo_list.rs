//! Route definitions for todo lists and their nested todos.

use axum::routing::get;
use axum::Router;

use crate::handlers::{todo_list, todo_list_todo};
use crate::state::AppState;

/// Routes mounted at `/todo-lists`.
///
/// ```text
/// GET    /               -> list_todo_lists
/// POST   /               -> create_todo_list
/// PATCH  /               -> update_todo_lists
/// DELETE /               -> delete_todo_lists
/// GET    /count          -> count_todo_lists
/// GET    /{id}           -> get_todo_list
/// PUT    /{id}           -> replace_todo_list
/// PATCH  /{id}           -> update_todo_list
/// DELETE /{id}           -> delete_todo_list
/// GET    /{id}/todos     -> list_list_todos
/// POST   /{id}/todos     -> create_list_todo
/// PATCH  /{id}/todos     -> update_list_todos
/// DELETE /{id}/todos     -> delete_list_todos
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(todo_list::list_todo_lists)
                .post(todo_list::create_todo_list)
                .patch(todo_list::update_todo_lists)
                .delete(todo_list::delete_todo_lists),
        )
        .route("/count", get(todo_list::count_todo_lists))
        .route(
            "/{id}",
            get(todo_list::get_todo_list)
                .put(todo_list::replace_todo_list)
                .patch(todo_list::update_todo_list)
                .delete(todo_list::delete_todo_list),
        )
        .route(
            "/{id}/todos",
            get(todo_list_todo::list_list_todos)
                .post(todo_list_todo::create_list_todo)
                .patch(todo_list_todo::update_list_todos)
                .delete(todo_list_todo::delete_list_todos),
        )
}
