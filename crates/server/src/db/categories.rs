//! Category repository.

use sqlx::PgPool;

use caja_core::dto::categories::{Category, CategoryFilter, UpdateCategory};
use caja_core::{CategoryId, UserId};

use super::{RepositoryError, to_u64};

const DUPLICATE_NAME: &str = "a category with this name already exists";
const IN_USE: &str = "category still has products";

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    is_active: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            is_active: row.is_active,
        }
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Categories matching the filter, ordered by name, plus their count.
    ///
    /// `search` is a case-insensitive substring match on the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &CategoryFilter,
    ) -> Result<(Vec<Category>, u64), RepositoryError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, is_active
            FROM categories
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
              AND ($2::TEXT IS NULL OR name ILIKE $2)
            ORDER BY name
            ",
        )
        .bind(filter.status)
        .bind(search)
        .fetch_all(self.pool)
        .await?;

        let total = u64::try_from(rows.len()).unwrap_or(u64::MAX);
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, is_active FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Whether another category (not `except`) already uses `name`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_taken(
        &self,
        name: &str,
        except: Option<CategoryId>,
    ) -> Result<bool, RepositoryError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1 AND ($2::INTEGER IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(except)
        .fetch_one(self.pool)
        .await?;
        Ok(taken)
    }

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, name: &str, created_by: &UserId) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO categories (name, created_by, updated_by)
            VALUES ($1, $2, $2)
            RETURNING id, name, is_active
            ",
        )
        .bind(name)
        .bind(created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, DUPLICATE_NAME, DUPLICATE_NAME))?;
        Ok(row.into())
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        changes: &UpdateCategory,
        updated_by: &UserId,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            UPDATE categories SET
                name       = COALESCE($2, name),
                is_active  = COALESCE($3, is_active),
                updated_by = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, is_active
            ",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.is_active)
        .bind(updated_by)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, DUPLICATE_NAME, DUPLICATE_NAME))?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Soft delete: mark the category inactive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn deactivate(
        &self,
        id: CategoryId,
        updated_by: &UserId,
    ) -> Result<Category, RepositoryError> {
        self.update(
            id,
            &UpdateCategory {
                name: None,
                is_active: Some(false),
            },
            updated_by,
        )
        .await
    }

    /// Number of products referencing the category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_count(&self, id: CategoryId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(to_u64(count))
    }

    /// Remove the category row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Conflict` if products still reference it.
    pub async fn delete(&self, id: CategoryId) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "DELETE FROM categories WHERE id = $1 RETURNING id, name, is_active",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, IN_USE, IN_USE))?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("bebidas"), "bebidas");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }
}
