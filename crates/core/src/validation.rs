//! Payload validation against an entity field schema.
//!
//! Validation runs in two passes:
//!
//! 1. [`check_payload`] walks the raw JSON object against the entity's
//!    [`FieldSpec`] table: unknown fields, read-only `id`, missing required
//!    fields and JSON type mismatches.
//! 2. The typed DTO is deserialized and its `validator` rules (non-empty
//!    strings and the like) are run through [`validate_dto`].
//!
//! Both passes report a [`ValidationErrors`] list so callers see every
//! offending field at once.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::schema::{self, FieldSpec};
use crate::types::DbId;

/// Pseudo field name used for errors about the payload as a whole.
pub const BODY_FIELD: &str = "(body)";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Ordered list of field errors produced by one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a list holding exactly one error.
    pub fn single(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            errors: vec![FieldError::new(field, code, message)],
        }
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the offending fields, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// `Ok(())` when no errors were collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Which write the payload is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// New entity; required fields enforced, `id` rejected.
    Create,
    /// Full overwrite of entity `id`; required fields enforced.
    Replace { id: DbId },
    /// Partial merge; only supplied fields are checked. `id` is `None`
    /// for bulk patches, which may not carry an `id` at all.
    Patch { id: Option<DbId> },
}

impl Mode {
    fn target_id(self) -> Option<DbId> {
        match self {
            Mode::Create => None,
            Mode::Replace { id } => Some(id),
            Mode::Patch { id } => id,
        }
    }

    fn enforces_required(self) -> bool {
        !matches!(self, Mode::Patch { .. })
    }
}

/// Check a raw JSON payload against `fields`.
///
/// On success returns the object with generated fields (`id`) removed,
/// ready for typed deserialization.
pub fn check_payload(
    fields: &[FieldSpec],
    payload: &Value,
    mode: Mode,
) -> Result<Map<String, Value>, ValidationErrors> {
    let Value::Object(object) = payload else {
        return Err(ValidationErrors::single(
            BODY_FIELD,
            "invalid_type",
            "payload must be a JSON object",
        ));
    };

    let mut errors = ValidationErrors::new();
    let mut accepted = Map::new();

    for (name, value) in object {
        let Some(spec) = schema::field(fields, name) else {
            errors.push(FieldError::new(
                name,
                "unknown_field",
                format!("unknown field `{name}`"),
            ));
            continue;
        };

        if spec.generated {
            match mode.target_id() {
                None => errors.push(FieldError::new(
                    name,
                    "read_only",
                    format!("`{name}` is assigned by the server"),
                )),
                Some(target) if value.as_i64() != Some(target) => {
                    errors.push(FieldError::new(
                        name,
                        "id_mismatch",
                        format!("`{name}` must match the target id {target}"),
                    ))
                }
                Some(_) => {}
            }
            continue;
        }

        if value.is_null() {
            if spec.required {
                errors.push(FieldError::new(
                    name,
                    "required",
                    format!("`{name}` must not be null"),
                ));
            } else {
                accepted.insert(name.clone(), Value::Null);
            }
            continue;
        }

        if spec.kind.coerce(value).is_none() {
            errors.push(FieldError::new(
                name,
                "invalid_type",
                format!("`{name}` must be a {}", spec.kind.label()),
            ));
            continue;
        }

        accepted.insert(name.clone(), value.clone());
    }

    if mode.enforces_required() {
        for spec in fields.iter().filter(|f| f.required && !f.generated) {
            if !object.contains_key(spec.name) {
                errors.push(FieldError::new(
                    spec.name,
                    "required",
                    format!("`{}` is required", spec.name),
                ));
            }
        }
    }

    errors.into_result().map(|()| accepted)
}

/// Run a DTO's `validator` rules, mapping failures onto schema field names.
pub fn validate_dto<T: Validate>(fields: &[FieldSpec], dto: &T) -> Result<(), ValidationErrors> {
    dto.validate().map_err(|e| from_validator(fields, &e))
}

/// Full two-pass validation: schema check, typed deserialization, DTO rules.
pub fn parse_payload<T>(fields: &[FieldSpec], payload: Value, mode: Mode) -> Result<T, ValidationErrors>
where
    T: DeserializeOwned + Validate,
{
    let object = check_payload(fields, &payload, mode)?;
    let dto: T = serde_json::from_value(Value::Object(object))
        .map_err(|e| ValidationErrors::single(BODY_FIELD, "invalid_payload", e.to_string()))?;
    validate_dto(fields, &dto)?;
    Ok(dto)
}

fn from_validator(fields: &[FieldSpec], errors: &validator::ValidationErrors) -> ValidationErrors {
    let mut entries: Vec<(String, Vec<validator::ValidationError>)> = errors
        .field_errors()
        .into_iter()
        .map(|(key, errs)| (key.to_string(), errs.clone()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = ValidationErrors::new();
    for (key, errs) in entries {
        let field = schema::field_by_any_name(fields, &key)
            .map(|f| f.name.to_string())
            .unwrap_or(key);
        for err in errs {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("`{field}` failed the `{}` check", err.code));
            out.push(FieldError::new(field.clone(), err.code.to_string(), message));
        }
    }
    out
}
