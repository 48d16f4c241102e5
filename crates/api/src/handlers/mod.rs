pub mod todo;
pub mod todo_list;
pub mod todo_list_todo;
