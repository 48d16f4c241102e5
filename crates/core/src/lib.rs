//! Domain building blocks shared by the store and HTTP layers.
//!
//! Nothing in this crate touches a database or a socket: it defines the
//! identifiers, the error taxonomy, the per-entity field schemas, payload
//! validation and the closed filter grammar used by every store.

pub mod entity;
pub mod error;
pub mod filter;
pub mod schema;
pub mod types;
pub mod validation;
