//! Resource service over a parent entity and its children.
//!
//! [`ResourceService`] is the single entry point the HTTP layer uses. It
//! owns both stores, applies the configured [`DeletePolicy`] when parents
//! are removed, and checks that every foreign key written through the
//! top-level child operations points at an existing parent.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use todolist_core::entity::{ChildOf, Entity};
use todolist_core::filter::{Filter, Where};
use todolist_core::schema::FieldValue;
use todolist_core::types::DbId;
use todolist_core::validation::ValidationErrors;

use crate::models::todo::Todo;
use crate::models::todo_list::TodoList;
use crate::relation::{foreign_key, HasMany};
use crate::store::{discard, id_field, EntityStore, StoreError, StoreResult};

/// What happens to children when their parent is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Children stay, still pointing at the removed parent id.
    #[default]
    Orphan,
    /// Children are deleted along with the parent.
    Cascade,
}

impl DeletePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DeletePolicy::Orphan => "orphan",
            DeletePolicy::Cascade => "cascade",
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown delete policy `{0}` (expected `orphan` or `cascade`)")]
pub struct UnknownDeletePolicy(pub String);

impl FromStr for DeletePolicy {
    type Err = UnknownDeletePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orphan" => Ok(DeletePolicy::Orphan),
            "cascade" => Ok(DeletePolicy::Cascade),
            _ => Err(UnknownDeletePolicy(s.to_string())),
        }
    }
}

pub struct ResourceService<P: Entity, C: ChildOf<P>> {
    parents: Arc<dyn EntityStore<P>>,
    children: Arc<dyn EntityStore<C>>,
    policy: DeletePolicy,
}

/// The todo list / todo service.
pub type TodoService = ResourceService<TodoList, Todo>;

impl<P: Entity, C: ChildOf<P>> Clone for ResourceService<P, C> {
    fn clone(&self) -> Self {
        Self {
            parents: Arc::clone(&self.parents),
            children: Arc::clone(&self.children),
            policy: self.policy,
        }
    }
}

impl<P: Entity, C: ChildOf<P>> ResourceService<P, C> {
    pub fn new(
        parents: Arc<dyn EntityStore<P>>,
        children: Arc<dyn EntityStore<C>>,
        policy: DeletePolicy,
    ) -> Self {
        Self {
            parents,
            children,
            policy,
        }
    }

    pub fn policy(&self) -> DeletePolicy {
        self.policy
    }

    /// Ping both stores.
    pub async fn health_check(&self) -> StoreResult<()> {
        self.parents.ping().await?;
        self.children.ping().await
    }

    // ---------------------------------------------------------------------
    // Parents
    // ---------------------------------------------------------------------

    pub async fn create_parent(&self, input: &P::Create) -> StoreResult<P> {
        let created = self.parents.create(input).await?;
        tracing::info!(entity = P::NAME, id = created.id(), "Entity created");
        Ok(created)
    }

    pub async fn find_parent(&self, id: DbId) -> StoreResult<P> {
        self.parents.find_by_id(id).await
    }

    pub async fn find_parents(&self, filter: &Filter) -> StoreResult<Vec<P>> {
        let items = self.parents.find(filter).await?;
        tracing::debug!(entity = P::NAME, count = items.len(), "Listed entities");
        Ok(items)
    }

    pub async fn count_parents(&self, predicate: Option<&Where>) -> StoreResult<u64> {
        self.parents.count(predicate).await
    }

    pub async fn replace_parent(&self, id: DbId, input: &P::Create) -> StoreResult<()> {
        self.parents.replace_by_id(id, input).await?;
        tracing::info!(entity = P::NAME, id, "Entity replaced");
        Ok(())
    }

    pub async fn update_parent(&self, id: DbId, patch: &P::Update) -> StoreResult<()> {
        self.parents.update_by_id(id, patch).await?;
        tracing::info!(entity = P::NAME, id, "Entity updated");
        Ok(())
    }

    pub async fn update_parents(
        &self,
        patch: &P::Update,
        predicate: Option<&Where>,
    ) -> StoreResult<u64> {
        let count = self.parents.update_all(patch, predicate).await?;
        tracing::info!(entity = P::NAME, count, "Entities updated");
        Ok(count)
    }

    /// Delete one parent, then its children under [`DeletePolicy::Cascade`].
    pub async fn delete_parent(&self, id: DbId) -> StoreResult<()> {
        self.parents.delete_by_id(id).await?;
        tracing::info!(entity = P::NAME, id, policy = %self.policy, "Entity deleted");

        if self.policy == DeletePolicy::Cascade {
            let scope = Where::equals(foreign_key::<P, C>()?, id);
            let removed = self.children.delete_all(Some(&scope)).await?;
            tracing::info!(entity = C::NAME, parent_id = id, count = removed, "Cascaded delete");
        }
        Ok(())
    }

    /// Delete every matching parent; returns how many were removed.
    pub async fn delete_parents(&self, predicate: Option<&Where>) -> StoreResult<u64> {
        if self.policy == DeletePolicy::Orphan {
            let count = self.parents.delete_all(predicate).await?;
            tracing::info!(entity = P::NAME, count, "Entities deleted");
            return Ok(count);
        }

        let doomed: Vec<FieldValue> = self
            .parents
            .find(&Filter::with_predicate(predicate.cloned()))
            .await?
            .iter()
            .map(|p| FieldValue::Int(p.id()))
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        let count = self
            .parents
            .delete_all(Some(&Where::one_of(id_field::<P>(), doomed.clone())))
            .await?;
        let removed = self
            .children
            .delete_all(Some(&Where::one_of(foreign_key::<P, C>()?, doomed)))
            .await?;
        tracing::info!(
            entity = P::NAME,
            count,
            children_removed = removed,
            "Entities deleted with cascade"
        );
        Ok(count)
    }

    // ---------------------------------------------------------------------
    // Nested children
    // ---------------------------------------------------------------------

    pub fn children_of(&self, parent_id: DbId) -> HasMany<P, C> {
        HasMany::new(
            parent_id,
            Arc::clone(&self.parents),
            Arc::clone(&self.children),
        )
    }

    // ---------------------------------------------------------------------
    // Top-level children
    // ---------------------------------------------------------------------

    /// Reject a foreign key that names a missing parent.
    async fn check_parent_ref(&self, parent_id: Option<DbId>) -> StoreResult<()> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        if self.parents.exists(parent_id).await? {
            return Ok(());
        }
        Err(missing_parent::<P, C>(parent_id))
    }

    /// Re-check the parent after a write that pointed children at it.
    ///
    /// A cascade delete that ran between [`Self::check_parent_ref`] and the
    /// write has missed the rows just attached, so they are removed here.
    /// Under the orphan policy the write stands, as if it had happened
    /// before the delete.
    async fn settle_parent_ref(&self, parent_id: Option<DbId>) -> StoreResult<()> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        if self.policy != DeletePolicy::Cascade || self.parents.exists(parent_id).await? {
            return Ok(());
        }
        let removed = self
            .children
            .delete_all(Some(&Where::equals(foreign_key::<P, C>()?, parent_id)))
            .await?;
        tracing::warn!(
            entity = C::NAME,
            parent_id,
            removed,
            "Parent deleted during write, children removed"
        );
        Err(missing_parent::<P, C>(parent_id))
    }

    /// Create a child. A parent deleted while the child is written makes the
    /// create fail and the new row is discarded, whatever the policy.
    pub async fn create_child(&self, input: &C::Create) -> StoreResult<C> {
        let parent_id = C::create_parent_id(input);
        self.check_parent_ref(parent_id).await?;
        let created = self.children.create(input).await?;

        if let Some(parent_id) = parent_id {
            if !self.parents.exists(parent_id).await? {
                discard(&*self.children, created.id()).await?;
                tracing::warn!(
                    entity = C::NAME,
                    id = created.id(),
                    parent_id,
                    "Parent deleted during create, child discarded"
                );
                return Err(missing_parent::<P, C>(parent_id));
            }
        }

        tracing::info!(
            entity = C::NAME,
            id = created.id(),
            parent_id = ?created.parent_id(),
            "Entity created"
        );
        Ok(created)
    }

    pub async fn find_child(&self, id: DbId) -> StoreResult<C> {
        self.children.find_by_id(id).await
    }

    pub async fn find_children(&self, filter: &Filter) -> StoreResult<Vec<C>> {
        let items = self.children.find(filter).await?;
        tracing::debug!(entity = C::NAME, count = items.len(), "Listed entities");
        Ok(items)
    }

    pub async fn count_children(&self, predicate: Option<&Where>) -> StoreResult<u64> {
        self.children.count(predicate).await
    }

    pub async fn replace_child(&self, id: DbId, input: &C::Create) -> StoreResult<()> {
        let parent_id = C::create_parent_id(input);
        self.check_parent_ref(parent_id).await?;
        self.children.replace_by_id(id, input).await?;
        self.settle_parent_ref(parent_id).await?;
        tracing::info!(entity = C::NAME, id, "Entity replaced");
        Ok(())
    }

    pub async fn update_child(&self, id: DbId, patch: &C::Update) -> StoreResult<()> {
        let parent_id = C::update_parent_id(patch).flatten();
        self.check_parent_ref(parent_id).await?;
        self.children.update_by_id(id, patch).await?;
        self.settle_parent_ref(parent_id).await?;
        tracing::info!(entity = C::NAME, id, "Entity updated");
        Ok(())
    }

    pub async fn update_children(
        &self,
        patch: &C::Update,
        predicate: Option<&Where>,
    ) -> StoreResult<u64> {
        let parent_id = C::update_parent_id(patch).flatten();
        self.check_parent_ref(parent_id).await?;
        let count = self.children.update_all(patch, predicate).await?;
        self.settle_parent_ref(parent_id).await?;
        tracing::info!(entity = C::NAME, count, "Entities updated");
        Ok(count)
    }

    pub async fn delete_child(&self, id: DbId) -> StoreResult<()> {
        self.children.delete_by_id(id).await?;
        tracing::info!(entity = C::NAME, id, "Entity deleted");
        Ok(())
    }

    pub async fn delete_children(&self, predicate: Option<&Where>) -> StoreResult<u64> {
        let count = self.children.delete_all(predicate).await?;
        tracing::info!(entity = C::NAME, count, "Entities deleted");
        Ok(count)
    }
}

/// `todoListId`-style validation error for a reference to a missing parent.
fn missing_parent<P: Entity, C: ChildOf<P>>(parent_id: DbId) -> StoreError {
    ValidationErrors::single(
        C::FOREIGN_KEY,
        "foreign_key",
        format!("{} {parent_id} does not exist", P::NAME),
    )
    .into()
}
