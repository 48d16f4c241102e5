//! Entity store layer.
//!
//! [`EntityStore`] is the per-entity persistence contract. Every operation
//! is atomic with respect to other operations on the same store. Two
//! implementations are provided:
//!
//! - [`MemoryStore`]: lock-guarded in-process table, optionally mirrored to
//!   a JSON file.
//! - [`PgStore`]: PostgreSQL via `sqlx`, rendering filters to bound SQL.

pub mod memory;
pub mod postgres;
pub mod sql;

use async_trait::async_trait;
use todolist_core::entity::Entity;
use todolist_core::error::CoreError;
use todolist_core::filter::{Filter, Where};
use todolist_core::schema::FieldSpec;
use todolist_core::types::DbId;
use todolist_core::validation::ValidationErrors;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by entity stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain error (not found, validation, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Data file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        StoreError::Core(CoreError::Validation(errors))
    }
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

/// `NotFound` for entity `E` with the given id.
pub(crate) fn not_found<E: Entity>(id: DbId) -> StoreError {
    StoreError::Core(CoreError::NotFound {
        entity: E::NAME,
        id,
    })
}

/// The `id` field of `E`; schemas list it first.
pub(crate) fn id_field<E: Entity>() -> &'static FieldSpec {
    let fields: &'static [FieldSpec] = E::FIELDS;
    &fields[0]
}

pub(crate) fn id_predicate<E: Entity>(id: DbId) -> Where {
    Where::equals(id_field::<E>(), id)
}

/// Delete `id` from `store`, treating an already-missing row as done.
pub(crate) async fn discard<E: Entity>(store: &dyn EntityStore<E>, id: DbId) -> StoreResult<()> {
    match store.delete_by_id(id).await {
        Err(StoreError::Core(CoreError::NotFound { .. })) => Ok(()),
        other => other,
    }
}

/// Persistence contract for a single entity type.
///
/// Write operations validate their DTO (`validator` rules) before touching
/// storage and report `CoreError::Validation` on failure. Operations
/// addressing a single id report `CoreError::NotFound` when it is absent.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Assign a fresh id, persist, and return the new entity.
    async fn create(&self, input: &E::Create) -> StoreResult<E>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<E>;

    async fn exists(&self, id: DbId) -> StoreResult<bool>;

    /// All rows matching `filter`, in filter order (id order by default).
    async fn find(&self, filter: &Filter) -> StoreResult<Vec<E>>;

    /// Merge `patch` into the row with `id`.
    async fn update_by_id(&self, id: DbId, patch: &E::Update) -> StoreResult<()>;

    /// Merge `patch` into every matching row; returns the number updated.
    async fn update_all(&self, patch: &E::Update, predicate: Option<&Where>) -> StoreResult<u64>;

    /// Overwrite every field of the row with `id` except the id itself.
    async fn replace_by_id(&self, id: DbId, input: &E::Create) -> StoreResult<()>;

    async fn delete_by_id(&self, id: DbId) -> StoreResult<()>;

    /// Delete every matching row (all rows when `predicate` is `None`);
    /// returns the number removed.
    async fn delete_all(&self, predicate: Option<&Where>) -> StoreResult<u64>;

    async fn count(&self, predicate: Option<&Where>) -> StoreResult<u64>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
