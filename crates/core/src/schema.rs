//! Per-entity field schemas and scalar field values.
//!
//! Every entity declares a static `&[FieldSpec]` describing its JSON field
//! names, SQL columns and value kinds. Payload validation, filter parsing,
//! in-memory filter evaluation and SQL rendering all work from that table,
//! so the four never disagree about which fields exist.

use serde::Serialize;
use serde_json::Value;

/// Scalar kind of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Bool,
}

impl FieldKind {
    /// Human-readable name used in validation messages.
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Text => "string",
            FieldKind::Bool => "boolean",
        }
    }

    /// Convert a non-null JSON value into a [`FieldValue`] of this kind.
    ///
    /// Returns `None` when the JSON type does not match.
    pub fn coerce(self, value: &Value) -> Option<FieldValue> {
        match (self, value) {
            (FieldKind::Integer, Value::Number(n)) => n.as_i64().map(FieldValue::Int),
            (FieldKind::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
            (FieldKind::Bool, Value::Bool(b)) => Some(FieldValue::Bool(*b)),
            _ => None,
        }
    }
}

/// Static description of one entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name in JSON payloads and filters (camelCase).
    pub name: &'static str,
    /// Column name in SQL tables (snake_case).
    pub column: &'static str,
    pub kind: FieldKind,
    /// Must be present and non-null on create / replace.
    pub required: bool,
    /// Assigned by the store; clients may not write it.
    pub generated: bool,
}

impl FieldSpec {
    /// An optional, client-writable field.
    pub const fn optional(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            required: false,
            generated: false,
        }
    }

    /// A required, client-writable field.
    pub const fn required(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            required: true,
            generated: false,
        }
    }

    /// The store-generated integer primary key.
    pub const fn id() -> Self {
        Self {
            name: "id",
            column: "id",
            kind: FieldKind::Integer,
            required: false,
            generated: true,
        }
    }
}

/// Look up a field by its JSON name.
pub fn field<'a>(fields: &'a [FieldSpec], name: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|f| f.name == name)
}

/// Look up a field by JSON name or SQL column.
pub fn field_by_any_name<'a>(fields: &'a [FieldSpec], name: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|f| f.name == name || f.column == name)
}

/// A scalar field value, as stored and compared.
///
/// The variant order defines the cross-kind sort order used by in-memory
/// ordering: `Null < Bool < Int < Text`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}
