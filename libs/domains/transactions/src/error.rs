use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use chrono::NaiveDate;
use domain_products::ProductError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Product {0} not found")]
    UnknownProduct(i32),

    #[error("Transaction {0} not found")]
    NotFound(i32),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i32,
        requested: i32,
        available: i32,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDateFormat { field: &'static str, value: String },

    #[error("Invalid date range: start_date {start} is after end_date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

pub type TransactionResult<T> = Result<T, TransactionError>;

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            e @ (TransactionError::UnknownProduct(_) | TransactionError::NotFound(_)) => {
                AppError::NotFound(e.to_string())
            }
            e @ TransactionError::InsufficientStock { .. } => AppError::Conflict(e.to_string()),
            TransactionError::Validation(msg) => AppError::BadRequest(msg),
            e @ (TransactionError::InvalidDateFormat { .. } | TransactionError::InvalidDateRange { .. }) => {
                AppError::BadRequest(e.to_string())
            }
            TransactionError::Persistence(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for TransactionError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<sea_orm::DbErr> for TransactionError {
    fn from(err: sea_orm::DbErr) -> Self {
        TransactionError::Persistence(format!("Database error: {}", err))
    }
}

impl From<ProductError> for TransactionError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => TransactionError::UnknownProduct(id),
            ProductError::InsufficientStock {
                product_id,
                requested,
                available,
            } => TransactionError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            ProductError::Validation(msg) => TransactionError::Validation(msg),
            ProductError::Internal(msg) => TransactionError::Persistence(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status(err: TransactionError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(TransactionError::UnknownProduct(3)), StatusCode::NOT_FOUND);
        assert_eq!(status(TransactionError::NotFound(3)), StatusCode::NOT_FOUND);
        assert_eq!(
            status(TransactionError::InsufficientStock {
                product_id: 1,
                requested: 2,
                available: 1
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(TransactionError::InvalidDateFormat {
                field: "end_date",
                value: "2024-13-01".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(TransactionError::Persistence("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unknown_product_message() {
        assert_eq!(TransactionError::UnknownProduct(42).to_string(), "Product 42 not found");
    }
}
