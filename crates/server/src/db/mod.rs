//! Database access for the Caja backend.
//!
//! ## Tables
//!
//! - `profiles`, `permissions`, `profile_permissions` - Access control
//! - `users` - Staff accounts (argon2 password hashes)
//! - `categories`, `products` - Catalogue
//! - `payment_methods`, `sales`, `sale_details`, `sale_payments` - Sales
//! - `refunds`, `refund_details` - Refunds (read by reports)
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p caja-cli -- migrate
//! ```

pub mod categories;
pub mod products;
pub mod profiles;
pub mod reports;
pub mod sales;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use products::ProductRepository;
pub use profiles::ProfileRepository;
pub use reports::ReportRepository;
pub use sales::SaleRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique barcode).
    #[error("{0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique violations to [`RepositoryError::Conflict`] with `unique` and
    /// foreign-key violations with `reference`; every other error passes through.
    pub(crate) fn from_constraint(err: sqlx::Error, unique: &str, reference: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(unique.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::Conflict(reference.to_owned());
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Clamp a `u64` page parameter into the `BIGINT` range used by `LIMIT`/`OFFSET`.
pub(crate) fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Convert a `COUNT(*)` result to `u64`. Counts are never negative.
pub(crate) fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}
