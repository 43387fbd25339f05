//! Unified error handling for the invoke API.
//!
//! Every failure reaches the caller as a status code plus a plain-text
//! message; the message is what the client shows to the user.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use caja_core::Permission;

use crate::db::RepositoryError;
use crate::services::{AuthError, ReportError, SaleError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// No user is signed in.
    #[error("Not logged in")]
    NotLoggedIn,

    /// `login` called on a session that already holds a user.
    #[error("Already logged in")]
    AlreadyLoggedIn,

    /// Unknown username or wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The user or its profile is disabled.
    #[error("Account is inactive")]
    AccountInactive,

    /// The session lacks a permission code.
    #[error("Permission denied: {0}")]
    PermissionDenied(Permission),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness or reference rule violated.
    #[error("{0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code sent for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotLoggedIn | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AccountInactive | Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::AlreadyLoggedIn | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Map a repository error, naming the missing resource on `NotFound`.
    #[must_use]
    pub fn from_repository(err: RepositoryError, resource: &str) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound(resource.to_owned()),
            other => other.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Invoke request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, message).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("resource".to_string()),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Database(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::AccountInactive => Self::AccountInactive,
            AuthError::UsernameTaken | AuthError::EmailTaken => Self::Conflict(err.to_string()),
            AuthError::UserNotFound => Self::NotFound("user".to_string()),
            AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::Validation(_)
            | AuthError::ProfileUnavailable => Self::BadRequest(err.to_string()),
            AuthError::Repository(e) => e.into(),
            AuthError::PasswordHash => Self::Internal(err.to_string()),
        }
    }
}

impl From<SaleError> for AppError {
    fn from(err: SaleError) -> Self {
        match err {
            SaleError::InsufficientStock { .. } => Self::Conflict(err.to_string()),
            SaleError::Repository(e) => e.into(),
            SaleError::EmptySale
            | SaleError::InvalidQuantity(_)
            | SaleError::InvalidAmount(_)
            | SaleError::InvalidTotals
            | SaleError::PaymentMethodUnavailable(_)
            | SaleError::ProductUnavailable(_) => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidRange(e) => Self::BadRequest(e.to_string()),
            ReportError::Repository(e) => e.into(),
        }
    }
}

/// Set the Sentry user context from the signed-in user.
pub fn set_sentry_user(user_id: &str, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_string()),
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

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        assert_eq!(AppError::NotLoggedIn.to_string(), "Not logged in");
        assert_eq!(
            AppError::PermissionDenied(Permission::UsersEdit).to_string(),
            "Permission denied: users.edit"
        );
        assert_eq!(
            AppError::Conflict("barcode already exists".to_string()).to_string(),
            "barcode already exists"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(get_status(AppError::NotLoggedIn), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(AppError::PermissionDenied(Permission::SalesView)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(get_status(AppError::AlreadyLoggedIn), StatusCode::CONFLICT);
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_mapping() {
        assert!(matches!(
            AppError::from(RepositoryError::Conflict("code taken".to_string())),
            AppError::Conflict(m) if m == "code taken"
        ));
        assert!(matches!(
            AppError::from_repository(RepositoryError::NotFound, "product"),
            AppError::NotFound(m) if m == "product"
        ));
        assert!(matches!(
            AppError::from(RepositoryError::DataCorruption("x".to_string())),
            AppError::Database(_)
        ));
    }

    #[test]
    fn test_auth_mapping() {
        assert!(matches!(
            AppError::from(AuthError::UsernameTaken),
            AppError::Conflict(m) if m == "username already exists"
        ));
        assert!(matches!(
            AppError::from(AuthError::EmailTaken),
            AppError::Conflict(m) if m == "email already exists"
        ));
        assert!(matches!(
            AppError::from(AuthError::WeakPassword("short".to_string())),
            AppError::BadRequest(_)
        ));
    }

    #[test]
    fn test_sale_amount_errors_are_bad_requests() {
        assert_eq!(
            get_status(SaleError::InvalidAmount(caja_core::ProductId::new(4)).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(SaleError::InvalidTotals.into()), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = AppError::Internal("pool exhausted".to_string()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        assert_eq!(&body[..], b"Internal server error");
    }
}
