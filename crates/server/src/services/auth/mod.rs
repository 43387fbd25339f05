//! Authentication service.
//!
//! Provides password login and staff account management.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use caja_core::dto::users::{NewUser, UpdateUser, UserRecord};
use caja_core::{Email, ProfileId, Session, UserId};

use crate::db::users::{UserInsert, UserRepository};
use crate::db::{ProfileRepository, RepositoryError};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles login and the creation and editing of staff accounts.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    profiles: ProfileRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            profiles: ProfileRepository::new(pool),
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Login with username and password and build the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or
    /// the password is wrong. Both cases run one password verification.
    /// Returns `AuthError::AccountInactive` if the user or its profile is
    /// disabled.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let Some(candidate) = self.users.find_login_candidate(username.trim()).await? else {
            return Err(reject_unknown_user(password));
        };

        verify_password(password, &candidate.password_hash)?;

        if !candidate.is_active || !candidate.profile_is_active {
            return Err(AuthError::AccountInactive);
        }

        let permissions = self.users.permission_codes(candidate.profile_id).await?;
        let email = Email::parse(&candidate.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Session {
            user_id: candidate.id,
            username: candidate.username,
            profile_id: candidate.profile_id,
            profile_name: candidate.profile_name,
            email,
            permissions,
        })
    }

    // =========================================================================
    // Account Management
    // =========================================================================

    /// Create a staff account.
    ///
    /// `created_by` is `None` only when bootstrapping from the CLI.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` for bad input.
    /// Returns `AuthError::UsernameTaken` / `AuthError::EmailTaken` on duplicates.
    /// Returns `AuthError::ProfileUnavailable` if the profile is missing or inactive.
    pub async fn create_user(
        &self,
        new_user: &NewUser,
        created_by: Option<&UserId>,
    ) -> Result<UserRecord, AuthError> {
        let username = required("username", &new_user.username)?;
        let first_name = required("first_name", &new_user.first_name)?;
        let last_name = required("last_name", &new_user.last_name)?;
        let email = Email::parse(&new_user.email)?;
        validate_password(&new_user.password)?;

        if self.users.username_taken(username, None).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.email_taken(&email, None).await? {
            return Err(AuthError::EmailTaken);
        }
        self.ensure_profile(new_user.profile_id).await?;

        let password_hash = hash_password(&new_user.password)?;
        let id = UserId::generate();

        let user = self
            .users
            .create(
                &UserInsert {
                    id: &id,
                    username,
                    email: &email,
                    password_hash: &password_hash,
                    first_name,
                    last_name,
                    profile_id: new_user.profile_id,
                },
                created_by,
            )
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Apply a partial update to a staff account.
    ///
    /// An empty password leaves the stored hash untouched.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist, plus the
    /// same validation and uniqueness errors as [`Self::create_user`].
    pub async fn update_user(
        &self,
        id: &UserId,
        changes: &UpdateUser,
        updated_by: &UserId,
    ) -> Result<UserRecord, AuthError> {
        if self.users.get_by_id(id).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        let mut changes = changes.clone();
        if let Some(username) = changes.username.as_deref() {
            let username = required("username", username)?.to_owned();
            if self.users.username_taken(&username, Some(id)).await? {
                return Err(AuthError::UsernameTaken);
            }
            changes.username = Some(username);
        }
        if let Some(first_name) = changes.first_name.as_deref() {
            changes.first_name = Some(required("first_name", first_name)?.to_owned());
        }
        if let Some(last_name) = changes.last_name.as_deref() {
            changes.last_name = Some(required("last_name", last_name)?.to_owned());
        }

        let email = match changes.email.as_deref() {
            Some(raw) => {
                let email = Email::parse(raw)?;
                if self.users.email_taken(&email, Some(id)).await? {
                    return Err(AuthError::EmailTaken);
                }
                Some(email)
            }
            None => None,
        };

        let password_hash = match changes.new_password() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        if let Some(profile_id) = changes.profile_id {
            self.ensure_profile(profile_id).await?;
        }

        let user = self
            .users
            .update(
                id,
                &changes,
                email.as_ref(),
                password_hash.as_deref(),
                updated_by,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    async fn ensure_profile(&self, profile_id: ProfileId) -> Result<(), AuthError> {
        if self.profiles.is_active(profile_id).await? {
            Ok(())
        } else {
            Err(AuthError::ProfileUnavailable)
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Trim `value` and reject it when empty.
fn required<'v>(field: &str, value: &'v str) -> Result<&'v str, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if shorter than [`MIN_PASSWORD_LENGTH`].
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Hash verified against when the username is unknown.
static UNKNOWN_USER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no-such-user-password").ok());

/// Spend one verification on the placeholder hash and reject.
fn reject_unknown_user(password: &str) -> AuthError {
    if let Some(hash) = UNKNOWN_USER_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    AuthError::InvalidCredentials
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct-horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_unknown_user_verifies_against_placeholder() {
        let hash = UNKNOWN_USER_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(matches!(
            reject_unknown_user("correct-horse"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            reject_unknown_user("no-such-user-password"),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("ñññññññ").is_err());
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("username", "  cajero1 ").unwrap(), "cajero1");
        assert!(matches!(
            required("username", "   "),
            Err(AuthError::Validation(_))
        ));
    }
}
