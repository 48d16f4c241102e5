//! Shared query parameter types for API handlers.
//!
//! Filters travel as JSON strings in the query: `?filter={...}` on list
//! endpoints, `?where={...}` on count, bulk patch and bulk delete.

use serde::Deserialize;
use todolist_core::error::CoreError;
use todolist_core::filter::{Filter, Where};
use todolist_core::schema::FieldSpec;

/// `?filter=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub filter: Option<String>,
}

impl FilterParams {
    pub fn parse(&self, fields: &'static [FieldSpec]) -> Result<Filter, CoreError> {
        Filter::from_query(fields, self.filter.as_deref())
    }
}

/// `?where=` on count and bulk endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct WhereParams {
    #[serde(rename = "where")]
    pub predicate: Option<String>,
}

impl WhereParams {
    pub fn parse(&self, fields: &'static [FieldSpec]) -> Result<Option<Where>, CoreError> {
        Where::from_query(fields, self.predicate.as_deref())
    }
}
