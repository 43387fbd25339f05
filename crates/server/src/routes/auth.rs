//! Session commands: `login`, `logout`, `get_session`.

use axum::{Json, Router, extract::State, routing::post};
use tower_sessions::Session;
use tracing::instrument;

use caja_core::dto::auth::LoginArgs;

use crate::error::AppError;
use crate::middleware::{
    RequireSession, clear_current_session, current_session, login_rate_limiter,
    set_current_session,
};
use crate::services::AuthService;
use crate::state::AppState;

/// Build the session command router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/invoke/login",
            post(login).layer(login_rate_limiter()),
        )
        .route("/invoke/logout", post(logout))
        .route("/invoke/get_session", post(get_session))
}

/// Authenticate and start a session.
///
/// # Errors
///
/// Returns `AppError::AlreadyLoggedIn` if the session already holds a user,
/// `AppError::InvalidCredentials` or `AppError::AccountInactive` on a failed
/// login.
#[instrument(skip_all, fields(username = %args.user_data.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<LoginArgs>,
) -> Result<Json<caja_core::Session>, AppError> {
    if current_session(&session).await?.is_some() {
        return Err(AppError::AlreadyLoggedIn);
    }

    let auth = AuthService::new(state.pool());
    let user = auth
        .login(&args.user_data.username, &args.user_data.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

    set_current_session(&session, &user).await?;
    tracing::info!(user_id = %user.user_id, "User logged in");

    Ok(Json(user))
}

/// End the current session.
///
/// # Errors
///
/// Returns `AppError::NotLoggedIn` with no signed-in user.
pub async fn logout(
    RequireSession(user): RequireSession,
    session: Session,
) -> Result<Json<()>, AppError> {
    clear_current_session(&session).await?;
    tracing::info!(user_id = %user.user_id, "User logged out");
    Ok(Json(()))
}

/// Return the signed-in user.
///
/// # Errors
///
/// Returns `AppError::NotLoggedIn` with no signed-in user.
pub async fn get_session(
    RequireSession(user): RequireSession,
) -> Result<Json<caja_core::Session>, AppError> {
    Ok(Json(user))
}
