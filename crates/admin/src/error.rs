//! Unified error handling for admin.
//!
//! Every handler returns `Result<_, AppError>`; the error renders as a JSON
//! body `{"error": "<message>"}` with the matching status code.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::services::{AdminAuthError, InvoiceError, ReferenceError, TimerError};

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unique constraint violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Build a `NotFound` error for a resource kind and ID.
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{kind} {id}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(detail)) => format!("Conflict: {detail}"),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e.0)
    }
}

impl From<ReferenceError> for AppError {
    fn from(e: ReferenceError) -> Self {
        match e {
            ReferenceError::Repository(e) => Self::Database(e),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<InvoiceError> for AppError {
    fn from(e: InvoiceError) -> Self {
        match e {
            InvoiceError::NotFound => Self::NotFound("invoice".to_string()),
            InvoiceError::DuplicateNumber(_) | InvoiceError::NumbersExhausted(_) => {
                Self::Conflict(e.to_string())
            }
            InvoiceError::Reference(e) => e.into(),
            InvoiceError::Repository(e) => Self::Database(e),
            InvoiceError::EmptyBillables
            | InvoiceError::UnknownBillables(_)
            | InvoiceError::NotBillable(_)
            | InvoiceError::MixedClients
            | InvoiceError::ClientMismatch { .. }
            | InvoiceError::NegativeRate
            | InvoiceError::AmountOverflow => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<TimerError> for AppError {
    fn from(e: TimerError) -> Self {
        match e {
            TimerError::NotFound => Self::NotFound("work session".to_string()),
            TimerError::Reference(e) => e.into(),
            TimerError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<AdminAuthError> for AppError {
    fn from(e: AdminAuthError) -> Self {
        match e {
            AdminAuthError::InvalidCredentials => Self::Unauthorized(e.to_string()),
            AdminAuthError::UserAlreadyExists => Self::Conflict(e.to_string()),
            AdminAuthError::InvalidEmail(_)
            | AdminAuthError::WeakPassword(_)
            | AdminAuthError::MissingName => Self::BadRequest(e.to_string()),
            AdminAuthError::PasswordHash => Self::Internal(e.to_string()),
            AdminAuthError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {e}"))
    }
}

/// Set the Sentry user context for the logged-in admin.
pub fn set_sentry_user(admin_user_id: impl std::fmt::Display, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
