//! Todo entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use todolist_core::entity::{ChildOf, Entity, FieldSource, Record};
use todolist_core::schema::{FieldKind, FieldSpec, FieldValue};
use todolist_core::types::DbId;
use validator::Validate;

use crate::models::nullable;
use crate::models::todo_list::TodoList;

/// Field schema for [`Todo`]. `desc` is stored as `description` since
/// `DESC` is an SQL keyword.
pub const TODO_FIELDS: &[FieldSpec] = &[
    FieldSpec::id(),
    FieldSpec::required("title", "title", FieldKind::Text),
    FieldSpec::optional("desc", "description", FieldKind::Text),
    FieldSpec::optional("isComplete", "is_complete", FieldKind::Bool),
    FieldSpec::optional("todoListId", "todo_list_id", FieldKind::Integer),
];

/// A row from the `todos` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: DbId,
    pub title: String,
    #[sqlx(rename = "description")]
    pub desc: Option<String>,
    pub is_complete: bool,
    pub todo_list_id: Option<DbId>,
}

/// DTO for creating or replacing a todo.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    #[validate(length(min = 1, message = "`title` must not be empty"))]
    pub title: String,
    pub desc: Option<String>,
    /// Defaults to `false` if omitted.
    pub is_complete: Option<bool>,
    pub todo_list_id: Option<DbId>,
}

impl CreateTodo {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            desc: None,
            is_complete: None,
            todo_list_id: None,
        }
    }
}

/// DTO for patching a todo. Absent fields are left untouched; `null`
/// clears `desc` / `todoListId` and resets `isComplete` to `false`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[validate(length(min = 1, message = "`title` must not be empty"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub desc: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub is_complete: Option<Option<bool>>,
    #[serde(default, deserialize_with = "nullable")]
    pub todo_list_id: Option<Option<DbId>>,
}

impl Record for CreateTodo {
    fn columns(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("title", self.title.clone().into()),
            ("description", self.desc.clone().into()),
            ("is_complete", self.is_complete.unwrap_or(false).into()),
            ("todo_list_id", self.todo_list_id.into()),
        ]
    }
}

impl Record for UpdateTodo {
    fn columns(&self) -> Vec<(&'static str, FieldValue)> {
        let mut columns = Vec::new();
        if let Some(title) = &self.title {
            columns.push(("title", title.clone().into()));
        }
        if let Some(desc) = &self.desc {
            columns.push(("description", desc.clone().into()));
        }
        if let Some(is_complete) = self.is_complete {
            columns.push(("is_complete", is_complete.unwrap_or(false).into()));
        }
        if let Some(todo_list_id) = self.todo_list_id {
            columns.push(("todo_list_id", todo_list_id.into()));
        }
        columns
    }
}

impl FieldSource for Todo {
    fn field_value(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => self.id.into(),
            "title" => self.title.as_str().into(),
            "desc" => self.desc.clone().into(),
            "isComplete" => self.is_complete.into(),
            "todoListId" => self.todo_list_id.into(),
            _ => return None,
        })
    }
}

impl Entity for Todo {
    const NAME: &'static str = "Todo";
    const TABLE: &'static str = "todos";
    const FIELDS: &'static [FieldSpec] = TODO_FIELDS;

    type Create = CreateTodo;
    type Update = UpdateTodo;

    fn id(&self) -> DbId {
        self.id
    }

    fn from_create(id: DbId, input: &CreateTodo) -> Self {
        Self {
            id,
            title: input.title.clone(),
            desc: input.desc.clone(),
            is_complete: input.is_complete.unwrap_or(false),
            todo_list_id: input.todo_list_id,
        }
    }

    fn apply_update(&mut self, patch: &UpdateTodo) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(desc) = &patch.desc {
            self.desc = desc.clone();
        }
        if let Some(is_complete) = patch.is_complete {
            self.is_complete = is_complete.unwrap_or(false);
        }
        if let Some(todo_list_id) = patch.todo_list_id {
            self.todo_list_id = todo_list_id;
        }
    }
}

impl ChildOf<TodoList> for Todo {
    const FOREIGN_KEY: &'static str = "todoListId";

    fn parent_id(&self) -> Option<DbId> {
        self.todo_list_id
    }

    fn create_parent_id(input: &CreateTodo) -> Option<DbId> {
        input.todo_list_id
    }

    fn set_create_parent_id(input: &mut CreateTodo, parent_id: DbId) {
        input.todo_list_id = Some(parent_id);
    }

    fn update_parent_id(patch: &UpdateTodo) -> Option<Option<DbId>> {
        patch.todo_list_id
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use todolist_core::validation::{parse_payload, Mode};

    use super::*;

    #[test]
    fn create_defaults_is_complete_to_false() {
        let input: CreateTodo =
            parse_payload(TODO_FIELDS, json!({"title": "x"}), Mode::Create).unwrap();
        let todo = Todo::from_create(1, &input);
        assert!(!todo.is_complete);
        assert_eq!(todo.desc, None);
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let mut todo = Todo {
            id: 1,
            title: "Buy milk".into(),
            desc: Some("2 litres".into()),
            is_complete: true,
            todo_list_id: Some(4),
        };

        let untouched: UpdateTodo =
            parse_payload(TODO_FIELDS, json!({"title": "Buy oat milk"}), Mode::Patch { id: Some(1) })
                .unwrap();
        todo.apply_update(&untouched);
        assert_eq!(todo.title, "Buy oat milk");
        assert_eq!(todo.desc.as_deref(), Some("2 litres"));
        assert_eq!(todo.todo_list_id, Some(4));

        let cleared: UpdateTodo = parse_payload(
            TODO_FIELDS,
            json!({"desc": null, "isComplete": null, "todoListId": null}),
            Mode::Patch { id: Some(1) },
        )
        .unwrap();
        todo.apply_update(&cleared);
        assert_eq!(todo.desc, None);
        assert!(!todo.is_complete);
        assert_eq!(todo.todo_list_id, None);
    }

    #[test]
    fn update_columns_only_cover_supplied_fields() {
        let patch = UpdateTodo {
            is_complete: Some(Some(true)),
            ..UpdateTodo::default()
        };
        assert_eq!(
            patch.columns(),
            vec![("is_complete", FieldValue::Bool(true))]
        );
    }

    #[test]
    fn serializes_camel_case() {
        let todo = Todo::from_create(7, &CreateTodo::titled("x"));
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(
            json,
            json!({"id": 7, "title": "x", "desc": null, "isComplete": false, "todoListId": null})
        );
    }
}
