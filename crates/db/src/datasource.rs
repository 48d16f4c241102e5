//! Backend selection: builds a [`TodoService`] over the configured store.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::models::todo::Todo;
use crate::models::todo_list::TodoList;
use crate::service::{DeletePolicy, TodoService};
use crate::store::{EntityStore, MemoryStore, PgStore, StoreResult};

/// File names used by the memory backend inside its data directory.
pub const TODO_LISTS_FILE: &str = "todo_lists.json";
pub const TODOS_FILE: &str = "todos.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// In-process tables, mirrored to JSON files when `data_dir` is set.
    Memory { data_dir: Option<PathBuf> },
    Postgres { database_url: String },
}

impl DataSource {
    pub fn name(&self) -> &'static str {
        match self {
            DataSource::Memory { .. } => "memory",
            DataSource::Postgres { .. } => "postgres",
        }
    }

    /// Open the stores and wire them into a service.
    ///
    /// For Postgres this connects, verifies the connection and applies
    /// pending migrations. For memory with a data directory, the directory
    /// is created if needed and existing files are loaded.
    pub async fn connect(&self, policy: DeletePolicy) -> StoreResult<TodoService> {
        let (lists, todos): (Arc<dyn EntityStore<TodoList>>, Arc<dyn EntityStore<Todo>>) =
            match self {
                DataSource::Memory { data_dir: None } => {
                    tracing::info!("Using volatile in-memory data source");
                    (Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
                }
                DataSource::Memory {
                    data_dir: Some(dir),
                } => {
                    tokio::fs::create_dir_all(dir).await?;
                    let lists = MemoryStore::<TodoList>::open(dir.join(TODO_LISTS_FILE)).await?;
                    let todos = MemoryStore::<Todo>::open(dir.join(TODOS_FILE)).await?;
                    tracing::info!(dir = %dir.display(), "Using file-backed in-memory data source");
                    (Arc::new(lists), Arc::new(todos))
                }
                DataSource::Postgres { database_url } => {
                    let pool = crate::create_pool(database_url).await?;
                    tracing::info!("Database connection pool created");

                    crate::health_check(&pool).await?;
                    tracing::info!("Database health check passed");

                    crate::run_migrations(&pool).await?;
                    tracing::info!("Database migrations applied");

                    (
                        Arc::new(PgStore::<TodoList>::new(pool.clone())),
                        Arc::new(PgStore::<Todo>::new(pool)),
                    )
                }
            };

        Ok(TodoService::new(lists, todos, policy))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
