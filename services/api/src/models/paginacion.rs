//! Pagination parameters and the paginated response

use axum::{
    Json,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Response header carrying the size of the whole filtered collection
pub static TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Query parameters for paginated listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Paginacion {
    /// Number of records to skip
    pub skip: Option<i64>,
    /// Page size
    pub limit: Option<i64>,
}

/// A resolved offset/limit pair, always within the configured bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ventana {
    pub offset: i64,
    pub limit: i64,
}

impl Ventana {
    /// Resolve raw `skip`/`limit` values; `limit` is clamped to `[1, max_limit]`
    pub fn resolver(
        skip: Option<i64>,
        limit: Option<i64>,
        default_limit: i64,
        max_limit: i64,
    ) -> Result<Self, ApiError> {
        let offset = skip.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::BadRequest("skip must not be negative".to_string()));
        }

        let limit = limit.unwrap_or(default_limit);
        if limit < 0 {
            return Err(ApiError::BadRequest("limit must not be negative".to_string()));
        }

        Ok(Self {
            offset,
            limit: limit.clamp(1, max_limit.max(1)),
        })
    }
}

/// A bounded slice of a collection plus the collection's total size
///
/// Serialised as a plain JSON array; the total travels in `X-Total-Count`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagina<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T: Serialize> IntoResponse for Pagina<T> {
    fn into_response(self) -> Response {
        let total = HeaderValue::from(self.total);
        let mut response = Json(self.items).into_response();
        response
            .headers_mut()
            .insert(TOTAL_COUNT_HEADER.clone(), total);
        response
    }
}
