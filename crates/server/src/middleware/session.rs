//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The cookie is
//! signed with `CAJA_SESSION_SECRET`.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::{ConfigError, ServerConfig};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "caja_session";

/// Session expiry time in seconds (a 12 hour shift).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Session layer type produced by [`create_session_layer`].
pub type PgSessionLayer = SessionManagerLayer<PostgresStore, SignedCookie>;

/// Create the session layer with the `PostgreSQL` store.
///
/// Uses the `tower_sessions.session` table created by the migrations.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the session secret cannot be
/// used as a signing key.
pub fn create_session_layer(
    pool: &PgPool,
    config: &ServerConfig,
) -> Result<PgSessionLayer, ConfigError> {
    session_layer(PostgresStore::new(pool.clone()), config)
}

/// Build a signed session layer over any store.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the session secret cannot be
/// used as a signing key.
pub fn session_layer<S>(
    store: S,
    config: &ServerConfig,
) -> Result<SessionManagerLayer<S, SignedCookie>, ConfigError>
where
    S: SessionStore + Clone,
{
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes()).map_err(|e| {
        ConfigError::InsecureSecret("CAJA_SESSION_SECRET".to_string(), e.to_string())
    })?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
