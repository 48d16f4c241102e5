//! Parent-scoped access to child entities.
//!
//! [`HasMany`] closes over a parent id and both stores. Every operation
//! first checks that the parent exists, then confines itself to children
//! whose foreign key equals that id.

use std::sync::Arc;

use todolist_core::entity::{ChildOf, Entity};
use todolist_core::error::CoreError;
use todolist_core::filter::{Filter, Where};
use todolist_core::schema::{self, FieldSpec};
use todolist_core::types::DbId;
use todolist_core::validation::ValidationErrors;

use crate::store::{discard, not_found, EntityStore, StoreResult};

/// The foreign-key field of `C`, looked up in its schema.
pub fn foreign_key<P: Entity, C: ChildOf<P>>() -> Result<&'static FieldSpec, CoreError> {
    schema::field(C::FIELDS, C::FOREIGN_KEY).ok_or_else(|| {
        CoreError::Internal(format!(
            "{} has no foreign key field `{}`",
            C::NAME,
            C::FOREIGN_KEY
        ))
    })
}

fn fk_mismatch<P: Entity, C: ChildOf<P>>(parent_id: DbId, given: Option<DbId>) -> ValidationErrors {
    let given = given.map_or_else(|| "null".to_string(), |id| id.to_string());
    ValidationErrors::single(
        C::FOREIGN_KEY,
        "fk_mismatch",
        format!(
            "`{}` is {given} but the {} in the path is {parent_id}",
            C::FOREIGN_KEY,
            P::NAME
        ),
    )
}

/// Children of one parent.
pub struct HasMany<P: Entity, C: ChildOf<P>> {
    parent_id: DbId,
    parents: Arc<dyn EntityStore<P>>,
    children: Arc<dyn EntityStore<C>>,
}

impl<P: Entity, C: ChildOf<P>> HasMany<P, C> {
    pub fn new(
        parent_id: DbId,
        parents: Arc<dyn EntityStore<P>>,
        children: Arc<dyn EntityStore<C>>,
    ) -> Self {
        Self {
            parent_id,
            parents,
            children,
        }
    }

    pub fn parent_id(&self) -> DbId {
        self.parent_id
    }

    async fn ensure_parent(&self) -> StoreResult<()> {
        if self.parents.exists(self.parent_id).await? {
            Ok(())
        } else {
            Err(not_found::<P>(self.parent_id))
        }
    }

    fn scope(&self) -> StoreResult<Where> {
        Ok(Where::equals(foreign_key::<P, C>()?, self.parent_id))
    }

    /// Create a child attached to this parent.
    ///
    /// A payload foreign key naming a different parent is rejected; an
    /// absent one is filled in. If the parent is deleted while the child is
    /// being written, the child is removed again and `NotFound` returned.
    pub async fn create(&self, mut input: C::Create) -> StoreResult<C> {
        self.ensure_parent().await?;
        if let Some(given) = C::create_parent_id(&input) {
            if given != self.parent_id {
                return Err(fk_mismatch::<P, C>(self.parent_id, Some(given)).into());
            }
        }
        C::set_create_parent_id(&mut input, self.parent_id);
        let created = self.children.create(&input).await?;

        if !self.parents.exists(self.parent_id).await? {
            discard(&*self.children, created.id()).await?;
            tracing::warn!(
                entity = C::NAME,
                id = created.id(),
                parent_id = self.parent_id,
                "Parent deleted during create, child discarded"
            );
            return Err(not_found::<P>(self.parent_id));
        }
        Ok(created)
    }

    pub async fn find(&self, filter: Filter) -> StoreResult<Vec<C>> {
        self.ensure_parent().await?;
        let filter = filter.scoped(self.scope()?);
        self.children.find(&filter).await
    }

    /// Patch matching children of this parent. Moving them to another
    /// parent (or detaching them) is not allowed here.
    pub async fn patch(&self, patch: &C::Update, predicate: Option<Where>) -> StoreResult<u64> {
        self.ensure_parent().await?;
        match C::update_parent_id(patch) {
            None => {}
            Some(Some(given)) if given == self.parent_id => {}
            Some(given) => return Err(fk_mismatch::<P, C>(self.parent_id, given).into()),
        }
        let predicate = Where::scoped(self.scope()?, predicate);
        self.children.update_all(patch, Some(&predicate)).await
    }

    pub async fn delete(&self, predicate: Option<Where>) -> StoreResult<u64> {
        self.ensure_parent().await?;
        let predicate = Where::scoped(self.scope()?, predicate);
        self.children.delete_all(Some(&predicate)).await
    }
}
