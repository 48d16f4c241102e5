//! Custom request extractors.

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde_json::Value;
use todolist_core::types::DbId;

use crate::error::AppError;

/// Raw JSON request body.
///
/// Unlike `Json<T>`, malformed or non-JSON bodies are reported through
/// [`AppError::BadRequest`] so they share the API's error envelope. Schema
/// and type checks happen afterwards in `parse_payload`.
///
/// ```ignore
/// async fn handler(JsonPayload(body): JsonPayload) -> AppResult<impl IntoResponse> {
///     let input: CreateTodo = parse_payload(Todo::FIELDS, body, Mode::Create)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonPayload(pub Value);

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Entity id taken from the `{id}` path segment.
///
/// A non-numeric segment is a [`AppError::BadRequest`] rather than axum's
/// plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub DbId);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<DbId>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}
