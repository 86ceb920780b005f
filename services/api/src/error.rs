//! services/api/src/error.rs
//!
//! Defines the startup error type for the API service and the JSON error body
//! returned by handlers.

use axum::{http::StatusCode, Json};
use ozonxt_core::{ports::PortError, validation::FieldErrors, BookingError};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub errors: Option<FieldErrors>,
}

pub type HandlerError = (StatusCode, Json<ErrorBody>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
            errors: None,
        }),
    )
}

pub fn validation_response(message: impl Into<String>, errors: FieldErrors) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            message: message.into(),
            errors: Some(errors),
        }),
    )
}

/// Maps a booking failure to a status code and a sanitized message. Raw store
/// detail has already been logged by the booking service.
pub fn booking_error_response(err: BookingError) -> HandlerError {
    let message = err.user_message();
    match err {
        BookingError::Validation(errors) => validation_response(message, errors),
        BookingError::Unauthorized => error_response(StatusCode::FORBIDDEN, message),
        BookingError::NotFound => error_response(StatusCode::NOT_FOUND, message),
        BookingError::InvalidStatus(_) => error_response(StatusCode::UNPROCESSABLE_ENTITY, message),
        BookingError::Store(PortError::Contention(_)) => {
            error_response(StatusCode::CONFLICT, message)
        }
        BookingError::Store(PortError::PermissionDenied(_))
        | BookingError::Store(PortError::MissingIndex(_)) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, message)
        }
        BookingError::Store(_) => error_response(StatusCode::INTERNAL_SERVER_ERROR, message),
    }
}
