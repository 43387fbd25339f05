//! Staff account commands.

use axum::{Json, Router, extract::State, routing::post};
use tower_sessions::Session;
use tracing::instrument;

use caja_core::dto::users::{
    CreateUserArgs, GetUsersArgs, Profile, UpdateUserArgs, UserIdArgs, UserListResponse,
    UserRecord,
};
use caja_core::{Permission, pagination};

use crate::db::{ProfileRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::require_permission;
use crate::services::AuthService;
use crate::state::AppState;

/// Build the user command router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invoke/get_users", post(get_users))
        .route("/invoke/get_user", post(get_user))
        .route("/invoke/create_user", post(create_user))
        .route("/invoke/update_user", post(update_user))
        .route("/invoke/toggle_user_status", post(toggle_user_status))
        .route("/invoke/get_profiles", post(get_profiles))
}

/// # Errors
///
/// Returns `AppError::BadRequest` for a zero page size.
pub async fn get_users(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<GetUsersArgs>,
) -> Result<Json<UserListResponse>, AppError> {
    require_permission(&session, Permission::UsersView).await?;

    if args.filters.limit == 0 {
        return Err(AppError::BadRequest("limit must be at least 1".to_string()));
    }

    let (users, total_items) = UserRepository::new(state.pool())
        .list(&args.filters)
        .await?;

    Ok(Json(UserListResponse {
        users,
        total_pages: pagination::total_pages(total_items, args.filters.limit),
        total_items,
    }))
}

/// # Errors
///
/// Returns `AppError::NotFound` if the user doesn't exist.
pub async fn get_user(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<UserIdArgs>,
) -> Result<Json<UserRecord>, AppError> {
    require_permission(&session, Permission::UsersView).await?;

    let user = UserRepository::new(state.pool())
        .get_by_id(&args.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", args.user_id)))?;
    Ok(Json(user))
}

/// # Errors
///
/// Returns `AppError::BadRequest` for invalid fields and `AppError::Conflict`
/// when the username or email is taken.
#[instrument(skip_all, fields(username = %args.user_data.username))]
pub async fn create_user(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<CreateUserArgs>,
) -> Result<Json<UserRecord>, AppError> {
    let admin = require_permission(&session, Permission::UsersCreate).await?;

    let user = AuthService::new(state.pool())
        .create_user(&args.user_data, Some(&admin.user_id))
        .await?;
    Ok(Json(user))
}

/// # Errors
///
/// Returns `AppError::NotFound` if the user doesn't exist, plus the same
/// errors as [`create_user`].
#[instrument(skip_all, fields(user_id = %args.user_id))]
pub async fn update_user(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<UpdateUserArgs>,
) -> Result<Json<UserRecord>, AppError> {
    let admin = require_permission(&session, Permission::UsersEdit).await?;

    let user = AuthService::new(state.pool())
        .update_user(&args.user_id, &args.update_data, &admin.user_id)
        .await?;
    Ok(Json(user))
}

/// Flip a user between active and inactive.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the user doesn't exist.
#[instrument(skip_all, fields(user_id = %args.user_id))]
pub async fn toggle_user_status(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<UserIdArgs>,
) -> Result<Json<UserRecord>, AppError> {
    let admin = require_permission(&session, Permission::UsersEdit).await?;

    if admin.user_id == args.user_id {
        return Err(AppError::BadRequest(
            "you cannot change your own status".to_string(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .toggle_status(&args.user_id, &admin.user_id)
        .await
        .map_err(|e| AppError::from_repository(e, &format!("user {}", args.user_id)))?;
    tracing::info!(user_id = %user.id, is_active = user.is_active, "User status toggled");
    Ok(Json(user))
}

/// Active profiles ordered by name.
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn get_profiles(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Profile>>, AppError> {
    require_permission(&session, Permission::UsersView).await?;

    let profiles = ProfileRepository::new(state.pool()).list_active().await?;
    Ok(Json(profiles))
}
