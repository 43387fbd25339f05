//! Integration tests for Caja POS.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and seed a database, then start the server
//! caja-cli migrate && caja-cli seed
//! cargo run -p caja-server
//!
//! # Run the ignored tests against it
//! cargo test -p caja-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `CAJA_BASE_URL` - server under test (default `http://127.0.0.1:3030`)
//! - `CAJA_TEST_USERNAME` / `CAJA_TEST_PASSWORD` - an administrator account;
//!   fall back to `SEED_USERNAME` / `SEED_PASSWORD`

use std::sync::Arc;

use caja_client::{Api, AuthStore, HttpInvoker};
use caja_core::dto::auth::LoginData;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("CAJA_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3030".to_owned())
}

/// Administrator credentials for the server under test.
#[must_use]
pub fn admin_credentials() -> LoginData {
    let var = |primary: &str, fallback: &str, default: &str| {
        std::env::var(primary)
            .or_else(|_| std::env::var(fallback))
            .unwrap_or_else(|_| default.to_owned())
    };
    LoginData {
        username: var("CAJA_TEST_USERNAME", "SEED_USERNAME", "admin"),
        password: var("CAJA_TEST_PASSWORD", "SEED_PASSWORD", "admin-password"),
    }
}

/// A fresh invoker with its own cookie jar, i.e. its own session.
///
/// # Panics
///
/// Panics if `CAJA_BASE_URL` is not a valid URL.
#[must_use]
#[allow(clippy::expect_used)]
pub fn invoker() -> Arc<HttpInvoker> {
    Arc::new(HttpInvoker::new(&base_url()).expect("CAJA_BASE_URL must be a valid URL"))
}

/// Sign in as `credentials` and return the store and an [`Api`] sharing its session.
///
/// # Panics
///
/// Panics if the login fails.
#[allow(clippy::expect_used)]
pub async fn signed_in(credentials: LoginData) -> (AuthStore<HttpInvoker>, Api<HttpInvoker>) {
    let api = Api::new(invoker());
    let auth = AuthStore::with_cache(Arc::clone(api.invoker()), api.cache().clone());
    auth.login(credentials).await.expect("login should succeed");
    (auth, api)
}

/// Sign in as the administrator.
pub async fn admin() -> (AuthStore<HttpInvoker>, Api<HttpInvoker>) {
    signed_in(admin_credentials()).await
}

/// A code unlikely to collide with existing rows.
#[must_use]
pub fn unique(prefix: &str) -> String {
    let id: String = uuid::Uuid::new_v4().simple().to_string().chars().take(12).collect();
    format!("{prefix}-{id}")
}
