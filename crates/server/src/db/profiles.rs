//! Profile repository.

use sqlx::PgPool;

use caja_core::ProfileId;
use caja_core::dto::users::Profile;

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: ProfileId,
    name: String,
    description: Option<String>,
    is_active: bool,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

/// Repository for profile (role) lookups.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active profiles ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Profile>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, name, description, is_active FROM profiles WHERE is_active ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Whether an active profile with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_active(&self, id: ProfileId) -> Result<bool, RepositoryError> {
        let active = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE id = $1 AND is_active)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(active)
    }

    /// Look up a profile by its exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, name, description, is_active FROM profiles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
