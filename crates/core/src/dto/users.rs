//! User and profile DTOs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, ProfileId, UserId};

/// A user as listed by the back office. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub profile_id: ProfileId,
    pub profile_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Listing filter. `status: None` lists active and inactive users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    #[serde(default)]
    pub status: Option<bool>,
    pub page: u64,
    pub limit: u64,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            status: None,
            page: 1,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserRecord>,
    pub total_pages: u64,
    pub total_items: u64,
}

/// An access profile (role) that groups permission codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Fields for a new user. `email` is validated server-side.
#[derive(Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_id: ProfileId,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("profile_id", &self.profile_id)
            .finish()
    }
}

/// Partial update. An empty `password` leaves the current one in place.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// The new password, if one was given and is non-empty.
    #[must_use]
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

impl fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("profile_id", &self.profile_id)
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// Arguments of `get_users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUsersArgs {
    pub filters: UserFilter,
}

/// Arguments of `toggle_user_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdArgs {
    pub user_id: UserId,
}

/// Arguments of `create_user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserArgs {
    pub user_data: NewUser,
}

/// Arguments of `update_user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserArgs {
    pub user_id: UserId,
    pub update_data: UpdateUser,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_passwords() {
        let user = NewUser {
            username: "cajero2".to_owned(),
            email: "cajero2@tienda.mx".to_owned(),
            password: "hunter2hunter2".to_owned(),
            first_name: "Ana".to_owned(),
            last_name: "López".to_owned(),
            profile_id: ProfileId::new(2),
        };
        let debug = format!("{user:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));

        let update = UpdateUser {
            password: Some("s3cret-pass".to_owned()),
            ..UpdateUser::default()
        };
        assert!(!format!("{update:?}").contains("s3cret"));
    }

    #[test]
    fn test_empty_password_is_ignored() {
        let mut update = UpdateUser {
            password: Some(String::new()),
            ..UpdateUser::default()
        };
        assert_eq!(update.new_password(), None);
        update.password = Some("another-pass".to_owned());
        assert_eq!(update.new_password(), Some("another-pass"));
    }

    #[test]
    fn test_filter_status_is_optional() {
        let filter: UserFilter = serde_json::from_str(r#"{"page":2,"limit":5}"#).unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.page, 2);
    }
}
