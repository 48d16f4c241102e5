//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })` to get
//! compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Payload of count, bulk patch and bulk delete responses:
/// `{ "data": { "count": n } }`.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

impl DataResponse<CountResponse> {
    pub fn count(count: u64) -> Self {
        Self {
            data: CountResponse { count },
        }
    }
}
