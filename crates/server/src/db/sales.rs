//! Sale repository.
//!
//! Reads go through the pool. Writes take a `&mut PgConnection` so that the
//! whole sale is recorded inside one caller-owned transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use caja_core::dto::sales::{LineAmounts, PaymentMethod, Sale, SaleItemRequest};
use caja_core::{PaymentMethodId, ProductId, SaleId, UserId};

use super::{RepositoryError, to_i64, to_u64};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: SaleId,
    subtotal: Decimal,
    total: Decimal,
    status: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: UserId,
    updated_by: UserId,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Self {
            id: row.id,
            subtotal: row.subtotal,
            total: row.total,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            created_by: row.created_by,
            updated_by: row.updated_by,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentMethodRow {
    id: PaymentMethodId,
    name: String,
    sat_key: String,
}

/// Stock row of a product locked for the current transaction.
#[derive(Debug, sqlx::FromRow)]
pub struct LockedProduct {
    pub id: ProductId,
    pub name: String,
    pub stock: i32,
    pub is_active: bool,
}

/// Parsed listing query. `limit: None` returns every row.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaleQuery {
    pub status: Option<bool>,
    pub limit: Option<u64>,
    pub offset: u64,
    pub date_from: Option<NaiveDate>,
    /// Inclusive: the whole day is matched.
    pub date_to: Option<NaiveDate>,
}

/// Repository for sale database operations.
pub struct SaleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SaleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Sales matching `query`, newest first, plus the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, query: &SaleQuery) -> Result<(Vec<Sale>, u64), RepositoryError> {
        const FILTER: &str = r"
            ($1::BOOLEAN IS NULL OR status = $1)
            AND ($2::DATE IS NULL OR created_at >= $2::DATE)
            AND ($3::DATE IS NULL OR created_at < $3::DATE + 1)
        ";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM sales WHERE {FILTER}"))
            .bind(query.status)
            .bind(query.date_from)
            .bind(query.date_to)
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT id, subtotal, total, status, created_at, updated_at, created_by, updated_by
             FROM sales WHERE {FILTER}
             ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, SaleRow>(&sql)
            .bind(query.status)
            .bind(query.date_from)
            .bind(query.date_to)
            .bind(query.limit.map(to_i64))
            .bind(to_i64(query.offset))
            .fetch_all(self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), to_u64(total)))
    }

    /// Active payment methods ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn payment_methods(&self) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentMethodRow>(
            "SELECT id, name, sat_key FROM payment_methods WHERE is_active ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PaymentMethod {
                id: row.id,
                name: row.name,
                sat_key: row.sat_key,
            })
            .collect())
    }

    // =========================================================================
    // Transactional writes
    // =========================================================================

    /// Whether the payment method exists and is active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn payment_method_is_active(
        conn: &mut PgConnection,
        id: PaymentMethodId,
    ) -> Result<bool, RepositoryError> {
        let active = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM payment_methods WHERE id = $1 AND is_active)",
        )
        .bind(id)
        .fetch_one(conn)
        .await?;
        Ok(active)
    }

    /// Lock a product row (`FOR UPDATE`) until the transaction ends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_product(
        conn: &mut PgConnection,
        id: ProductId,
    ) -> Result<Option<LockedProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, LockedProduct>(
            "SELECT id, name, stock, is_active FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(row)
    }

    /// Insert the sale header and return its creation time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_sale(
        conn: &mut PgConnection,
        id: &SaleId,
        subtotal: Decimal,
        total: Decimal,
        created_by: &UserId,
    ) -> Result<DateTime<Utc>, RepositoryError> {
        let created_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            r"
            INSERT INTO sales (id, subtotal, total, status, created_by, updated_by)
            VALUES ($1, $2, $3, TRUE, $4, $4)
            RETURNING created_at
            ",
        )
        .bind(id)
        .bind(subtotal)
        .bind(total)
        .bind(created_by)
        .fetch_one(conn)
        .await?;
        Ok(created_at)
    }

    /// Insert one detail row with its precomputed amounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_detail(
        conn: &mut PgConnection,
        sale_id: &SaleId,
        item: &SaleItemRequest,
        amounts: &LineAmounts,
    ) -> Result<(), RepositoryError> {

        sqlx::query(
            r"
            INSERT INTO sale_details (sale_id, product_id, quantity, unit_price, subtotal,
                                      tax_rate, tax_amount, total)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(sale_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(amounts.subtotal)
        .bind(item.tax_rate)
        .bind(amounts.tax_amount)
        .bind(amounts.total)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Subtract `quantity` from a locked product's stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn decrement_stock(
        conn: &mut PgConnection,
        id: ProductId,
        quantity: i32,
        updated_by: &UserId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE products
            SET stock = stock - $2, updated_by = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(quantity)
        .bind(updated_by)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Record the payment for a sale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_payment(
        conn: &mut PgConnection,
        sale_id: &SaleId,
        payment_method_id: PaymentMethodId,
        amount: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO sale_payments (sale_id, payment_method_id, amount) VALUES ($1, $2, $3)",
        )
        .bind(sale_id)
        .bind(payment_method_id)
        .bind(amount)
        .execute(conn)
        .await?;
        Ok(())
    }
}
