use std::sync::Arc;

use todolist_db::service::TodoService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the service holds its stores behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Todo list / todo resource service over the configured data source.
    pub service: TodoService,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(service: TodoService, config: ServerConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }
}
