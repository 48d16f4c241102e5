//! Traits every persisted entity type implements.
//!
//! Stores are generic over [`Entity`]; the relation resolver is generic over
//! a parent [`Entity`] and a child implementing [`ChildOf`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::schema::{FieldSpec, FieldValue};
use crate::types::DbId;

/// Read access to an entity's fields by JSON name, used to evaluate filters
/// in memory.
pub trait FieldSource {
    /// Current value of `name`, or `None` if the entity has no such field.
    fn field_value(&self, name: &str) -> Option<FieldValue>;
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn field_value(&self, name: &str) -> Option<FieldValue> {
        (**self).field_value(name)
    }
}

/// Column/value pairs of a write DTO, used to render SQL writes.
pub trait Record {
    /// For create DTOs every column (defaults applied); for update DTOs
    /// only the columns the patch touches.
    fn columns(&self) -> Vec<(&'static str, FieldValue)>;
}

/// A persisted entity type with a generated integer id.
pub trait Entity:
    Clone + Serialize + DeserializeOwned + FieldSource + Send + Sync + 'static
{
    /// Entity name used in errors and logs (`"Todo"`).
    const NAME: &'static str;
    /// SQL table name.
    const TABLE: &'static str;
    /// Field schema, `id` first.
    const FIELDS: &'static [FieldSpec];

    /// Full write payload (create / replace).
    type Create: Record + Validate + DeserializeOwned + Clone + Send + Sync;
    /// Partial write payload (patch).
    type Update: Record + Validate + DeserializeOwned + Clone + Send + Sync;

    fn id(&self) -> DbId;

    /// Build the entity a create (or replace) of `input` produces under `id`.
    fn from_create(id: DbId, input: &Self::Create) -> Self;

    /// Merge the supplied fields of `patch` into `self`.
    fn apply_update(&mut self, patch: &Self::Update);
}

/// A child entity that references parent `P` through a foreign key.
pub trait ChildOf<P: Entity>: Entity {
    /// JSON name of the foreign-key field (`"todoListId"`).
    const FOREIGN_KEY: &'static str;

    fn parent_id(&self) -> Option<DbId>;

    /// Foreign key carried by a create payload.
    fn create_parent_id(input: &Self::Create) -> Option<DbId>;

    /// Point a create payload at `parent_id`.
    fn set_create_parent_id(input: &mut Self::Create, parent_id: DbId);

    /// Foreign-key change carried by a patch: `None` when untouched,
    /// `Some(None)` when cleared.
    fn update_parent_id(patch: &Self::Update) -> Option<Option<DbId>>;
}
