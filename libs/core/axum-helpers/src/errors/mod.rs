pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1008,
///   "error": "CONFLICT",
///   "message": "Insufficient stock for product 7: requested 3, available 1",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Numeric code for logging and monitoring
    pub code: i32,
    /// Machine-readable identifier
    pub error: String,
    pub message: String,
    /// Structured details such as per-field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error rendered as an [`ErrorResponse`].
///
/// Domain error enums convert into this type so every endpoint answers
/// with the same envelope.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn parts(self) -> (StatusCode, ErrorCode, String, Option<serde_json::Value>) {
        match self {
            AppError::Database(e) => map_db_error(e),
            AppError::JsonExtractorRejection(e) => {
                (e.status(), ErrorCode::JsonExtraction, e.body_text(), None)
            }
            AppError::ValidationError(e) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::ValidationError,
                ErrorCode::ValidationError.default_message().to_string(),
                Some(validation_details(&e)),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Conflict, msg, None),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::UnprocessableEntity,
                msg,
                None,
            ),
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                msg,
                None,
            ),
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                msg,
                None,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!(error_code = code.code(), status = status.as_u16(), "{}", message);
        } else {
            tracing::info!(error_code = code.code(), status = status.as_u16(), "{}", message);
        }

        let mut body = ErrorResponse::new(code, message);
        body.details = details;
        (status, Json(body)).into_response()
    }
}

/// Storage errors never leak driver text to clients; the original error is logged.
fn map_db_error(error: DbErr) -> (StatusCode, ErrorCode, String, Option<serde_json::Value>) {
    match error {
        DbErr::RecordNotFound(what) => {
            tracing::info!(error_code = ErrorCode::DatabaseNotFound.code(), "Record not found: {}", what);
            (
                StatusCode::NOT_FOUND,
                ErrorCode::DatabaseNotFound,
                ErrorCode::DatabaseNotFound.default_message().to_string(),
                None,
            )
        }
        DbErr::ConnectionAcquire(e) => {
            tracing::warn!(error_code = ErrorCode::DatabaseUnavailable.code(), "Connection acquire failed: {:?}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::DatabaseUnavailable,
                ErrorCode::DatabaseUnavailable.default_message().to_string(),
                None,
            )
        }
        other => {
            tracing::error!(error_code = ErrorCode::DatabaseError.code(), "Database error: {:?}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
                ErrorCode::DatabaseError.default_message().to_string(),
                None,
            )
        }
    }
}

/// `{ "field": [{ "code", "message", "params" }] }` from validator errors.
pub fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let fields = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let entries: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(entries))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(fields)
}
