//! Staff account management.
//!
//! # Usage
//!
//! ```bash
//! caja-cli user create -u gerente -e gerente@tienda.mx -p 'long-password' --profile Manager
//! ```

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use caja_core::dto::users::{NewUser, UserRecord};
use caja_server::db::{self, ProfileRepository, RepositoryError};
use caja_server::services::{AuthError, AuthService};

/// Errors that can occur during user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Missing environment variable: CAJA_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unknown profile: {0}. Run `caja-cli seed` first")]
    UnknownProfile(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Account details as given on the command line.
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub profile: String,
    pub first_name: String,
    pub last_name: String,
}

/// Connect and create a staff account.
///
/// # Errors
///
/// Returns `UserError` if the profile is unknown or the account is rejected
/// (duplicate username or email, weak password, invalid email).
pub async fn create(account: NewAccount) -> Result<UserRecord, UserError> {
    let database_url = super::database_url().ok_or(UserError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let user = create_with_pool(&pool, &account).await?;
    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Profile: {}",
        user.id,
        user.username,
        account.profile
    );
    Ok(user)
}

/// Create a staff account on an existing pool. Used by `seed` as well.
///
/// # Errors
///
/// See [`create`].
pub async fn create_with_pool(pool: &PgPool, account: &NewAccount) -> Result<UserRecord, UserError> {
    let profile = ProfileRepository::new(pool)
        .find_by_name(&account.profile)
        .await?
        .ok_or_else(|| UserError::UnknownProfile(account.profile.clone()))?;

    let new_user = NewUser {
        username: account.username.clone(),
        email: account.email.clone(),
        password: account.password.expose_secret().to_owned(),
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        profile_id: profile.id,
    };

    tracing::info!(username = %account.username, profile = %profile.name, "Creating user");
    let user = AuthService::new(pool).create_user(&new_user, None).await?;
    Ok(user)
}
