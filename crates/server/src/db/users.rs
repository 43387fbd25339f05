//! User repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use caja_core::dto::users::{UpdateUser, UserFilter, UserRecord};
use caja_core::pagination;
use caja_core::{Email, ProfileId, UserId};

use super::{RepositoryError, to_i64, to_u64};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    is_active: bool,
    profile_id: ProfileId,
    profile_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            username: row.username,
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            is_active: row.is_active,
            profile_id: row.profile_id,
            profile_name: row.profile_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A user with its password hash and profile state, as needed by login.
#[derive(Debug, sqlx::FromRow)]
pub struct LoginCandidate {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub profile_id: ProfileId,
    pub profile_name: String,
    pub profile_is_active: bool,
}

/// Validated fields for a new user row.
#[derive(Debug)]
pub struct UserInsert<'a> {
    pub id: &'a UserId,
    pub username: &'a str,
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub profile_id: ProfileId,
}

const USER_TAKEN: &str = "username or email already exists";
const PROFILE_MISSING: &str = "profile does not exist";

const SELECT_USER: &str = r"
    SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.is_active,
           u.profile_id, p.name AS profile_name, u.created_at, u.updated_at
    FROM users u
    LEFT JOIN profiles p ON p.id = u.profile_id
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a user by username together with its password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_login_candidate(
        &self,
        username: &str,
    ) -> Result<Option<LoginCandidate>, RepositoryError> {
        let row = sqlx::query_as::<_, LoginCandidate>(
            r"
            SELECT u.id, u.username, u.email, u.password_hash, u.is_active,
                   u.profile_id, p.name AS profile_name, p.is_active AS profile_is_active
            FROM users u
            JOIN profiles p ON p.id = u.profile_id
            WHERE u.username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Permission codes granted to a profile, sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn permission_codes(
        &self,
        profile_id: ProfileId,
    ) -> Result<Vec<String>, RepositoryError> {
        let codes = sqlx::query_scalar::<_, String>(
            r"
            SELECT perm.code
            FROM profile_permissions pp
            JOIN permissions perm ON perm.id = pp.permission_id
            WHERE pp.profile_id = $1
            ORDER BY perm.code
            ",
        )
        .bind(profile_id)
        .fetch_all(self.pool)
        .await?;

        Ok(codes)
    }

    /// One page of users ordered by username, plus the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(
        &self,
        filter: &UserFilter,
    ) -> Result<(Vec<UserRecord>, u64), RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE ($1::BOOLEAN IS NULL OR is_active = $1)",
        )
        .bind(filter.status)
        .fetch_one(self.pool)
        .await?;

        let sql = format!(
            "{SELECT_USER} WHERE ($1::BOOLEAN IS NULL OR u.is_active = $1)
             ORDER BY u.username LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(filter.status)
            .bind(to_i64(filter.limit))
            .bind(to_i64(pagination::offset(filter.page, filter.limit)))
            .fetch_all(self.pool)
            .await?;

        let users = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((users, to_u64(total)))
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, RepositoryError> {
        let sql = format!("{SELECT_USER} WHERE u.id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Whether `username` belongs to a user other than `except`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_taken(
        &self,
        username: &str,
        except: Option<&UserId>,
    ) -> Result<bool, RepositoryError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND ($2::VARCHAR IS NULL OR id <> $2))",
        )
        .bind(username)
        .bind(except)
        .fetch_one(self.pool)
        .await?;
        Ok(taken)
    }

    /// Whether `email` belongs to a user other than `except`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_taken(
        &self,
        email: &Email,
        except: Option<&UserId>,
    ) -> Result<bool, RepositoryError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::VARCHAR IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except)
        .fetch_one(self.pool)
        .await?;
        Ok(taken)
    }

    /// Insert a user. `created_by` is `None` only for bootstrap accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    /// Returns `RepositoryError::Database` if the insert fails otherwise.
    pub async fn create(
        &self,
        user: &UserInsert<'_>,
        created_by: Option<&UserId>,
    ) -> Result<UserRecord, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO users (id, profile_id, username, email, password_hash,
                               first_name, last_name, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            ",
        )
        .bind(user.id)
        .bind(user.profile_id)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(created_by)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, USER_TAKEN, PROFILE_MISSING))?;

        self.get_by_id(user.id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update. `password_hash` replaces the stored hash when set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    pub async fn update(
        &self,
        id: &UserId,
        changes: &UpdateUser,
        email: Option<&Email>,
        password_hash: Option<&str>,
        updated_by: &UserId,
    ) -> Result<UserRecord, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                username      = COALESCE($2, username),
                email         = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                first_name    = COALESCE($5, first_name),
                last_name     = COALESCE($6, last_name),
                profile_id    = COALESCE($7, profile_id),
                is_active     = COALESCE($8, is_active),
                updated_by    = $9,
                updated_at    = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(changes.username.as_deref())
        .bind(email)
        .bind(password_hash)
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.profile_id)
        .bind(changes.is_active)
        .bind(updated_by)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, USER_TAKEN, PROFILE_MISSING))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Flip `is_active`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn toggle_status(
        &self,
        id: &UserId,
        updated_by: &UserId,
    ) -> Result<UserRecord, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET is_active = NOT is_active, updated_by = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(updated_by)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }
}
