//! TodoList entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use todolist_core::entity::{Entity, FieldSource, Record};
use todolist_core::schema::{FieldKind, FieldSpec, FieldValue};
use todolist_core::types::DbId;
use validator::Validate;

use crate::models::nullable;

pub const TODO_LIST_FIELDS: &[FieldSpec] = &[
    FieldSpec::id(),
    FieldSpec::required("title", "title", FieldKind::Text),
    FieldSpec::optional("color", "color", FieldKind::Text),
];

/// A row from the `todo_lists` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TodoList {
    pub id: DbId,
    pub title: String,
    pub color: Option<String>,
}

/// DTO for creating or replacing a todo list.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTodoList {
    #[validate(length(min = 1, message = "`title` must not be empty"))]
    pub title: String,
    pub color: Option<String>,
}

impl CreateTodoList {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            color: None,
        }
    }
}

/// DTO for patching a todo list. `null` clears `color`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTodoList {
    #[validate(length(min = 1, message = "`title` must not be empty"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub color: Option<Option<String>>,
}

impl Record for CreateTodoList {
    fn columns(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("title", self.title.clone().into()),
            ("color", self.color.clone().into()),
        ]
    }
}

impl Record for UpdateTodoList {
    fn columns(&self) -> Vec<(&'static str, FieldValue)> {
        let mut columns = Vec::new();
        if let Some(title) = &self.title {
            columns.push(("title", title.clone().into()));
        }
        if let Some(color) = &self.color {
            columns.push(("color", color.clone().into()));
        }
        columns
    }
}

impl FieldSource for TodoList {
    fn field_value(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => self.id.into(),
            "title" => self.title.as_str().into(),
            "color" => self.color.clone().into(),
            _ => return None,
        })
    }
}

impl Entity for TodoList {
    const NAME: &'static str = "TodoList";
    const TABLE: &'static str = "todo_lists";
    const FIELDS: &'static [FieldSpec] = TODO_LIST_FIELDS;

    type Create = CreateTodoList;
    type Update = UpdateTodoList;

    fn id(&self) -> DbId {
        self.id
    }

    fn from_create(id: DbId, input: &CreateTodoList) -> Self {
        Self {
            id,
            title: input.title.clone(),
            color: input.color.clone(),
        }
    }

    fn apply_update(&mut self, patch: &UpdateTodoList) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
    }
}
