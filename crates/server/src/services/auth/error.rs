//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication and account management.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password. Deliberately indistinguishable.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The user or its profile is disabled.
    #[error("account is inactive")]
    AccountInactive,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] caja_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// Username belongs to another user.
    #[error("username already exists")]
    UsernameTaken,

    /// Email belongs to another user.
    #[error("email already exists")]
    EmailTaken,

    /// Profile does not exist or is inactive.
    #[error("profile does not exist or is inactive")]
    ProfileUnavailable,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
