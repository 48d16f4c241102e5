//! PostgreSQL-backed entity store.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use todolist_core::entity::Entity;
use todolist_core::filter::{Filter, Where};
use todolist_core::types::DbId;
use todolist_core::validation::validate_dto;

use crate::store::{id_predicate, not_found, sql, EntityStore, StoreResult};
use crate::DbPool;

/// Generic store over one table, rendering every operation through
/// [`sql`] with bound parameters.
pub struct PgStore<E> {
    pool: DbPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgStore<E> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl<E> Clone for PgStore<E> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

#[async_trait]
impl<E> EntityStore<E> for PgStore<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow> + Unpin,
{
    async fn create(&self, input: &E::Create) -> StoreResult<E> {
        validate_dto(E::FIELDS, input)?;

        let mut qb = sql::insert::<E>(input);
        let entity = qb.build_query_as::<E>().fetch_one(&self.pool).await?;
        Ok(entity)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<E> {
        let filter = Filter::with_predicate(Some(id_predicate::<E>(id)));
        let mut qb = sql::select::<E>(&filter);
        qb.build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found::<E>(id))
    }

    async fn exists(&self, id: DbId) -> StoreResult<bool> {
        let predicate = id_predicate::<E>(id);
        let mut qb = sql::count::<E>(Some(&predicate));
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count > 0)
    }

    async fn find(&self, filter: &Filter) -> StoreResult<Vec<E>> {
        let mut qb = sql::select::<E>(filter);
        let rows = qb.build_query_as::<E>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn update_by_id(&self, id: DbId, patch: &E::Update) -> StoreResult<()> {
        validate_dto(E::FIELDS, patch)?;

        let predicate = id_predicate::<E>(id);
        let affected = match sql::update::<E>(patch, Some(&predicate)) {
            Some(mut qb) => qb.build().execute(&self.pool).await?.rows_affected(),
            None => u64::from(self.exists(id).await?),
        };
        if affected == 0 {
            return Err(not_found::<E>(id));
        }
        Ok(())
    }

    async fn update_all(&self, patch: &E::Update, predicate: Option<&Where>) -> StoreResult<u64> {
        validate_dto(E::FIELDS, patch)?;

        match sql::update::<E>(patch, predicate) {
            Some(mut qb) => Ok(qb.build().execute(&self.pool).await?.rows_affected()),
            None => self.count(predicate).await,
        }
    }

    async fn replace_by_id(&self, id: DbId, input: &E::Create) -> StoreResult<()> {
        validate_dto(E::FIELDS, input)?;

        let predicate = id_predicate::<E>(id);
        let affected = match sql::update::<E>(input, Some(&predicate)) {
            Some(mut qb) => qb.build().execute(&self.pool).await?.rows_affected(),
            None => u64::from(self.exists(id).await?),
        };
        if affected == 0 {
            return Err(not_found::<E>(id));
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: DbId) -> StoreResult<()> {
        let predicate = id_predicate::<E>(id);
        let mut qb = sql::delete::<E>(Some(&predicate));
        let affected = qb.build().execute(&self.pool).await?.rows_affected();
        if affected == 0 {
            return Err(not_found::<E>(id));
        }
        Ok(())
    }

    async fn delete_all(&self, predicate: Option<&Where>) -> StoreResult<u64> {
        let mut qb = sql::delete::<E>(predicate);
        Ok(qb.build().execute(&self.pool).await?.rows_affected())
    }

    async fn count(&self, predicate: Option<&Where>) -> StoreResult<u64> {
        let mut qb = sql::count::<E>(predicate);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
