//! Shared helpers for the db integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use todolist_core::filter::{Filter, Where};
use todolist_core::types::DbId;
use todolist_db::models::todo::{CreateTodo, Todo, UpdateTodo};
use todolist_db::models::todo_list::TodoList;
use todolist_db::store::{EntityStore, MemoryStore, StoreResult};

/// Todo store that deletes one list right before every write, the way a
/// concurrent `DELETE /todo-lists/{id}` can land between a parent check
/// and the child write.
pub struct RacingTodos {
    pub inner: MemoryStore<Todo>,
    lists: Arc<dyn EntityStore<TodoList>>,
    list_id: DbId,
}

impl RacingTodos {
    pub fn new(lists: Arc<dyn EntityStore<TodoList>>, list_id: DbId) -> Self {
        Self {
            inner: MemoryStore::new(),
            lists,
            list_id,
        }
    }

    async fn drop_list(&self) {
        let _ = self.lists.delete_by_id(self.list_id).await;
    }
}

#[async_trait]
impl EntityStore<Todo> for RacingTodos {
    async fn create(&self, input: &CreateTodo) -> StoreResult<Todo> {
        self.drop_list().await;
        self.inner.create(input).await
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Todo> {
        self.inner.find_by_id(id).await
    }

    async fn exists(&self, id: DbId) -> StoreResult<bool> {
        self.inner.exists(id).await
    }

    async fn find(&self, filter: &Filter) -> StoreResult<Vec<Todo>> {
        self.inner.find(filter).await
    }

    async fn update_by_id(&self, id: DbId, patch: &UpdateTodo) -> StoreResult<()> {
        self.drop_list().await;
        self.inner.update_by_id(id, patch).await
    }

    async fn update_all(&self, patch: &UpdateTodo, predicate: Option<&Where>) -> StoreResult<u64> {
        self.drop_list().await;
        self.inner.update_all(patch, predicate).await
    }

    async fn replace_by_id(&self, id: DbId, input: &CreateTodo) -> StoreResult<()> {
        self.drop_list().await;
        self.inner.replace_by_id(id, input).await
    }

    async fn delete_by_id(&self, id: DbId) -> StoreResult<()> {
        self.inner.delete_by_id(id).await
    }

    async fn delete_all(&self, predicate: Option<&Where>) -> StoreResult<u64> {
        self.inner.delete_all(predicate).await
    }

    async fn count(&self, predicate: Option<&Where>) -> StoreResult<u64> {
        self.inner.count(predicate).await
    }
}
