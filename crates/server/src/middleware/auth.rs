//! Authentication guards.
//!
//! The signed-in [`caja_core::Session`] lives in the tower-sessions store.
//! Handlers call [`require_permission`] before touching data; with no
//! session the request fails with `NotLoggedIn`.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use caja_core::{Permission, PermissionGate};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::session_keys;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireSession(user): RequireSession) -> Json<caja_core::Session> {
///     Json(user)
/// }
/// ```
pub struct RequireSession(pub caja_core::Session);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        require_session(session).await.map(Self)
    }
}

/// The signed-in user, if any.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn current_session(session: &Session) -> Result<Option<caja_core::Session>, AppError> {
    Ok(session
        .get::<caja_core::Session>(session_keys::CURRENT_SESSION)
        .await?)
}

/// The signed-in user.
///
/// # Errors
///
/// Returns `AppError::NotLoggedIn` with no signed-in user.
pub async fn require_session(session: &Session) -> Result<caja_core::Session, AppError> {
    let user = current_session(session)
        .await?
        .ok_or(AppError::NotLoggedIn)?;
    set_sentry_user(user.user_id.as_str(), &user.username);
    Ok(user)
}

/// The signed-in user, provided they hold `permission`.
///
/// # Errors
///
/// Returns `AppError::NotLoggedIn` with no signed-in user and
/// `AppError::PermissionDenied` when the permission is missing.
pub async fn require_permission(
    session: &Session,
    permission: Permission,
) -> Result<caja_core::Session, AppError> {
    let user = require_session(session).await?;
    if !user.has_permission(permission.as_str()) {
        tracing::warn!(
            user_id = %user.user_id,
            permission = %permission,
            "Permission denied"
        );
        return Err(AppError::PermissionDenied(permission));
    }
    Ok(user)
}

/// Store a freshly authenticated user under a new session id.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn set_current_session(
    session: &Session,
    user: &caja_core::Session,
) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_SESSION, user).await?;
    set_sentry_user(user.user_id.as_str(), &user.username);
    Ok(())
}

/// Drop the signed-in user and delete the session record.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn clear_current_session(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    clear_sentry_user();
    Ok(())
}
