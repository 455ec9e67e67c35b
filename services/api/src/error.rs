//! Custom error types for the API service

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use musica_common::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validation::ValidationError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Structurally invalid request (bad JSON, bad parameters)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Well-formed input that breaks a validation rule
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage failure, reported as an internal error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl ApiError {
    pub fn not_found(entidad: &str, id: i64) -> Self {
        ApiError::NotFound(format!("{} con id {} no encontrado", entidad, id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Database(DatabaseError::Query(e))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::BadRequest(msg) => json!({
                "error": "Bad request",
                "detail": msg,
            }),
            ApiError::NotFound(msg) => json!({
                "error": "Not found",
                "detail": msg,
            }),
            ApiError::Validation(e) => json!({
                "error": "Validation error",
                "detail": e.to_string(),
                "campo": e.campo,
            }),
            ApiError::Database(e) => {
                error!("Database failure: {}", e);
                json!({
                    "error": "Internal server error",
                    "detail": "Database error",
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
