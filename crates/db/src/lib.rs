//! Persistence for todo lists and todos.
//!
//! - [`models`]: entity structs, DTOs and field schemas
//! - [`store`]: the [`EntityStore`](store::EntityStore) contract with memory
//!   and PostgreSQL implementations
//! - [`relation`]: parent-scoped access to child entities
//! - [`service`]: the resource service the HTTP layer talks to
//! - [`datasource`]: selection and wiring of the configured backend

pub mod datasource;
pub mod models;
pub mod relation;
pub mod service;
pub mod store;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the pool can reach the server.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
