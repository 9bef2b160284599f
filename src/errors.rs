use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug)]
pub enum AppError {
    InvalidKind,
    InvalidAmount,
    InvalidCategory,
    InvalidDate,
    InvalidIdentifier,
    InvalidSortKey,
    InvalidOrder,
    InvalidGroupKey,
    InvalidDateRange,
    /// Any other malformed input (bad JSON, bad query string, length limits)
    ValidationError(String),
    EntryNotFound,
    /// Backend failure, surfaced unchanged after the store gave up retrying
    StoreFailure(String),
    /// Broken internal invariant
    InternalError(String),
}

/// Standard error response format
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type code (e.g., "INVALID_KIND", "NOT_FOUND")
    #[schema(example = "INVALID_DATE_RANGE")]
    pub error: String,
    /// Human-readable error message
    #[schema(example = "'from' date must not be after 'to' date")]
    pub message: String,
}

impl AppError {
    /// True for every client-fault kind (bad input), false for not-found and backend faults.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            AppError::EntryNotFound | AppError::StoreFailure(_) | AppError::InternalError(_)
        )
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidKind => "INVALID_KIND",
            AppError::InvalidAmount => "INVALID_AMOUNT",
            AppError::InvalidCategory => "INVALID_CATEGORY",
            AppError::InvalidDate => "INVALID_DATE",
            AppError::InvalidIdentifier => "INVALID_IDENTIFIER",
            AppError::InvalidSortKey => "INVALID_SORT_KEY",
            AppError::InvalidOrder => "INVALID_ORDER",
            AppError::InvalidGroupKey => "INVALID_GROUP_KEY",
            AppError::InvalidDateRange => "INVALID_DATE_RANGE",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::EntryNotFound => "NOT_FOUND",
            AppError::StoreFailure(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidKind => write!(f, "kind must be 'income' or 'expense'"),
            AppError::InvalidAmount => write!(
                f,
                "amount must be greater than zero, below 10^13, with at most two decimal places"
            ),
            AppError::InvalidCategory => {
                write!(f, "category must not be empty and at most 100 characters")
            }
            AppError::InvalidDate => write!(f, "'from' and 'to' dates are required"),
            AppError::InvalidIdentifier => write!(f, "id must be a valid UUID"),
            AppError::InvalidSortKey => {
                write!(f, "sort_by must be one of: date, amount, category, type")
            }
            AppError::InvalidOrder => write!(f, "order must be 'asc' or 'desc'"),
            AppError::InvalidGroupKey => {
                write!(f, "group_by must be one of: day, week, month, category")
            }
            AppError::InvalidDateRange => write!(f, "'from' date must not be after 'to' date"),
            AppError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            AppError::EntryNotFound => write!(f, "Entry not found"),
            AppError::StoreFailure(msg) => write!(f, "Store failure: {msg}"),
            AppError::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, message) = match self {
            AppError::EntryNotFound => (actix_web::http::StatusCode::NOT_FOUND, self.to_string()),
            AppError::StoreFailure(msg) | AppError::InternalError(msg) => {
                // Log the actual error for debugging, but don't expose to client
                error!(code = self.code(), "Request failed: {msg}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::ValidationError(msg) => (actix_web::http::StatusCode::BAD_REQUEST, msg.clone()),
            _ => (actix_web::http::StatusCode::BAD_REQUEST, self.to_string()),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message,
        })
    }
}

// Convenience conversion from sqlx::Error
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::EntryNotFound,
            _ => AppError::StoreFailure(err.to_string()),
        }
    }
}
