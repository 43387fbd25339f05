//! Seed reference data.
//!
//! Every insert is `ON CONFLICT DO NOTHING` (or an upsert for permission
//! metadata), so the command can be re-run after upgrades.
//!
//! # Environment Variables
//!
//! - `CAJA_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SEED_USERNAME`, `SEED_EMAIL`, `SEED_PASSWORD` - initial administrator;
//!   skipped when any of them is unset
//! - `SEED_FIRST_NAME`, `SEED_LAST_NAME` - optional, default `Admin` / `Caja`

use secrecy::SecretString;
use sqlx::PgPool;
use tracing::{info, warn};

use caja_core::Permission;
use caja_server::db;
use caja_server::services::AuthError;

use super::user::{NewAccount, UserError, create_with_pool};

/// Profile name used for the seeded administrator.
pub const ADMIN_PROFILE: &str = "Administrator";

/// `(name, description)` of every seeded profile.
pub const PROFILES: [(&str, &str); 3] = [
    (ADMIN_PROFILE, "Full access to every module"),
    ("Cashier", "Point of sale and catalogue lookup"),
    ("Manager", "Sales, inventory and reports"),
];

/// `(name, SAT key)` of every seeded payment method.
pub const PAYMENT_METHODS: [(&str, &str); 4] = [
    ("Efectivo", "01"),
    ("Tarjeta de Débito", "28"),
    ("Tarjeta de Crédito", "04"),
    ("Transferencia Electrónica", "03"),
];

pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Abarrotes",
    "Bebidas",
    "Lácteos",
    "Limpieza",
    "Botanas",
    "Higiene Personal",
];

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Missing environment variable: CAJA_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Could not create admin user: {0}")]
    Admin(#[from] UserError),
}

/// What a seed run inserted. Rows that already existed are not counted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub profiles: u64,
    pub permissions: u64,
    pub grants: u64,
    pub payment_methods: u64,
    pub categories: u64,
    pub admin_created: bool,
}

/// Permissions granted to a seeded profile.
#[must_use]
pub fn grants_for(profile: &str) -> Vec<Permission> {
    match profile {
        ADMIN_PROFILE => Permission::ALL.to_vec(),
        "Cashier" => vec![
            Permission::SalesCreate,
            Permission::SalesView,
            Permission::ProductsView,
            Permission::CategoriesView,
        ],
        "Manager" => Permission::ALL
            .into_iter()
            .filter(|p| {
                let code = p.as_str();
                ["sales.", "products.", "categories.", "reports."]
                    .iter()
                    .any(|prefix| code.starts_with(prefix))
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Connect and seed everything.
///
/// # Errors
///
/// Returns `SeedError` if the URL is unset or a query fails. A duplicate
/// admin user is logged and skipped.
pub async fn run() -> Result<SeedSummary, SeedError> {
    let database_url = super::database_url().ok_or(SeedError::MissingDatabaseUrl)?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let mut summary = seed_reference_data(&pool).await?;

    match admin_account_from_env() {
        Some(account) => match create_with_pool(&pool, &account).await {
            Ok(user) => {
                info!(username = %user.username, "Admin user created");
                summary.admin_created = true;
            }
            Err(UserError::Auth(AuthError::UsernameTaken | AuthError::EmailTaken)) => {
                info!(username = %account.username, "Admin user already exists, skipping");
            }
            Err(e) => return Err(e.into()),
        },
        None => warn!("SEED_USERNAME, SEED_EMAIL or SEED_PASSWORD not set; skipping admin user"),
    }

    info!("Seeding complete!");
    info!("  Profiles inserted: {}", summary.profiles);
    info!("  Permissions inserted: {}", summary.permissions);
    info!("  Grants inserted: {}", summary.grants);
    info!("  Payment methods inserted: {}", summary.payment_methods);
    info!("  Categories inserted: {}", summary.categories);

    Ok(summary)
}

/// Insert profiles, permissions, grants, payment methods and categories in
/// one transaction.
///
/// # Errors
///
/// Returns `SeedError::Database` if any insert fails.
pub async fn seed_reference_data(pool: &PgPool) -> Result<SeedSummary, SeedError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for (name, description) in PROFILES {
        summary.profiles += sqlx::query(
            "INSERT INTO profiles (name, description) VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for permission in Permission::ALL {
        // xmax = 0 only for freshly inserted rows
        let inserted = sqlx::query_scalar::<_, bool>(
            "INSERT INTO permissions (code, name, module) VALUES ($1, $2, $3)
             ON CONFLICT (code) DO UPDATE SET name = EXCLUDED.name, module = EXCLUDED.module
             RETURNING (xmax = 0)",
        )
        .bind(permission.as_str())
        .bind(permission.name())
        .bind(permission.module().as_str())
        .fetch_one(&mut *tx)
        .await?;
        summary.permissions += u64::from(inserted);
    }

    for (profile, _) in PROFILES {
        let codes: Vec<&str> = grants_for(profile).iter().map(|p| p.as_str()).collect();
        summary.grants += sqlx::query(
            "INSERT INTO profile_permissions (profile_id, permission_id)
             SELECT pr.id, pe.id
             FROM profiles pr
             JOIN permissions pe ON pe.code = ANY($2)
             WHERE pr.name = $1
             ON CONFLICT DO NOTHING",
        )
        .bind(profile)
        .bind(&codes)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for (name, sat_key) in PAYMENT_METHODS {
        summary.payment_methods += sqlx::query(
            "INSERT INTO payment_methods (name, sat_key) VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(sat_key)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for name in DEFAULT_CATEGORIES {
        summary.categories += sqlx::query(
            "INSERT INTO categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    Ok(summary)
}

fn admin_account_from_env() -> Option<NewAccount> {
    let username = std::env::var("SEED_USERNAME").ok()?;
    let email = std::env::var("SEED_EMAIL").ok()?;
    let password = std::env::var("SEED_PASSWORD").ok().map(SecretString::from)?;

    Some(NewAccount {
        username,
        email,
        password,
        profile: ADMIN_PROFILE.to_owned(),
        first_name: std::env::var("SEED_FIRST_NAME").unwrap_or_else(|_| "Admin".to_owned()),
        last_name: std::env::var("SEED_LAST_NAME").unwrap_or_else(|_| "Caja".to_owned()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_gets_everything() {
        assert_eq!(grants_for(ADMIN_PROFILE).len(), Permission::ALL.len());
    }

    #[test]
    fn test_cashier_grants() {
        let codes: Vec<&str> = grants_for("Cashier").iter().map(|p| p.as_str()).collect();
        assert_eq!(
            codes,
            ["sales.create", "sales.view", "products.view", "categories.view"]
        );
    }

    #[test]
    fn test_manager_excludes_administration() {
        let grants = grants_for("Manager");
        assert_eq!(grants.len(), 15);
        assert!(grants.contains(&Permission::ReportsFinancial));
        assert!(grants.contains(&Permission::SalesRefund));
        assert!(!grants.contains(&Permission::UsersView));
        assert!(!grants.contains(&Permission::ProfilesManage));
    }

    #[test]
    fn test_unknown_profile_has_no_grants() {
        assert!(grants_for("Auditor").is_empty());
    }

    #[test]
    fn test_seed_tables_are_unique() {
        let mut names: Vec<&str> = PAYMENT_METHODS.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PAYMENT_METHODS.len());
        assert!(PROFILES.iter().all(|(name, _)| !grants_for(name).is_empty()));
    }
}
