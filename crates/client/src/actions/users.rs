//! Staff account actions.

use serde_json::json;

use caja_core::UserId;
use caja_core::dto::users::{NewUser, Profile, UpdateUser, UserListResponse, UserRecord};

use super::{Api, keys};
use crate::invoke::{InvokeError, Invoker};

/// `get_users`. `status: None` lists everyone.
///
/// # Errors
///
/// Returns the backend's error message.
pub async fn list<I: Invoker + 'static>(
    api: &Api<I>,
    page: u64,
    limit: u64,
    status: Option<bool>,
) -> Result<UserListResponse, InvokeError> {
    let key = format!("{}list:{status:?}:{page}:{limit}", keys::USERS);
    api.cached(
        key,
        "get_users",
        json!({ "filters": { "status": status, "page": page, "limit": limit } }),
    )
    .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn toggle_status<I: Invoker + 'static>(
    api: &Api<I>,
    id: &UserId,
) -> Result<UserRecord, InvokeError> {
    api.mutate("toggle_user_status", json!({ "userId": id }), keys::USERS)
        .await
}

/// Active profiles for the user form.
///
/// # Errors
///
/// Returns the backend's error message.
pub async fn profiles<I: Invoker + 'static>(api: &Api<I>) -> Result<Vec<Profile>, InvokeError> {
    let key = format!("{}active", keys::PROFILES);
    api.cached(key, "get_profiles", json!({})).await
}

/// # Errors
///
/// Returns the backend's error message, e.g. a taken username.
pub async fn create<I: Invoker + 'static>(
    api: &Api<I>,
    user: &NewUser,
) -> Result<UserRecord, InvokeError> {
    api.mutate("create_user", json!({ "userData": user }), keys::USERS)
        .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn update<I: Invoker + 'static>(
    api: &Api<I>,
    id: &UserId,
    changes: &UpdateUser,
) -> Result<UserRecord, InvokeError> {
    api.mutate(
        "update_user",
        json!({ "userId": id, "updateData": changes }),
        keys::USERS,
    )
    .await
}
