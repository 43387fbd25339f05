//! Aggregate queries behind the reports.
//!
//! Every query covers `[date_from 00:00, date_to + 1 day)` and only counts
//! sales with `status = TRUE`. Shares and averages are computed by the
//! report service, not in SQL.

use rust_decimal::Decimal;
use sqlx::PgPool;

use caja_core::dto::reports::{DateRange, TimeGrouping};
use caja_core::{CategoryId, PaymentMethodId, ProductId};

use super::RepositoryError;

/// Gross sales and number of sales.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SalesTotals {
    pub gross_sales: Decimal,
    pub sales_count: i64,
}

/// Refunded amount and number of refunds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefundTotals {
    pub total_refunded: Decimal,
    pub refunds_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NamedAmount {
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NamedQuantity {
    pub name: String,
    pub quantity: i64,
}

/// Per-period sales sums, labelled with the grouping's format.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PeriodSales {
    pub period: String,
    pub amount: Decimal,
    pub sales_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PeriodRefunds {
    pub period: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductMovement {
    pub product_id: ProductId,
    pub product_name: String,
    pub category_name: Option<String>,
    pub quantity_sold: i64,
    pub gross_revenue: Decimal,
    pub quantity_refunded: i64,
    pub refunded_amount: Decimal,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategorySales {
    pub category_id: Option<CategoryId>,
    pub category_name: String,
    pub net_sales: Decimal,
    pub quantity_sold: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentMethodSales {
    pub payment_method_id: PaymentMethodId,
    pub payment_method_name: String,
    pub total_amount: Decimal,
    pub transaction_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefundedProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_refunded: i64,
    pub amount_refunded: Decimal,
}

/// Label used for products without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Repository for report aggregates.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_totals(&self, range: &DateRange) -> Result<SalesTotals, RepositoryError> {
        let row = sqlx::query_as::<_, SalesTotals>(
            r"
            SELECT COALESCE(SUM(total), 0) AS gross_sales, COUNT(*) AS sales_count
            FROM sales
            WHERE status AND created_at >= $1::DATE AND created_at < $2::DATE + 1
            ",
        )
        .bind(range.date_from)
        .bind(range.date_to)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn refund_totals(&self, range: &DateRange) -> Result<RefundTotals, RepositoryError> {
        let row = sqlx::query_as::<_, RefundTotals>(
            r"
            SELECT COALESCE(SUM(amount), 0) AS total_refunded, COUNT(*) AS refunds_count
            FROM refunds
            WHERE created_at >= $1::DATE AND created_at < $2::DATE + 1
            ",
        )
        .bind(range.date_from)
        .bind(range.date_to)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Payment method with the largest collected amount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn dominant_payment_method(
        &self,
        range: &DateRange,
    ) -> Result<Option<NamedAmount>, RepositoryError> {
        let row = sqlx::query_as::<_, NamedAmount>(
            r"
            SELECT pm.name, SUM(sp.amount) AS amount
            FROM sale_payments sp
            JOIN sales s ON s.id = sp.sale_id
            JOIN payment_methods pm ON pm.id = sp.payment_method_id
            WHERE s.status AND s.created_at >= $1::DATE AND s.created_at < $2::DATE + 1
            GROUP BY pm.id, pm.name
            ORDER BY amount DESC, pm.name
            LIMIT 1
            ",
        )
        .bind(range.date_from)
        .bind(range.date_to)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Product with the most units sold.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_product(
        &self,
        range: &DateRange,
    ) -> Result<Option<NamedQuantity>, RepositoryError> {
        let row = sqlx::query_as::<_, NamedQuantity>(
            r"
            SELECT p.name, SUM(sd.quantity)::BIGINT AS quantity
            FROM sale_details sd
            JOIN sales s ON s.id = sd.sale_id
            JOIN products p ON p.id = sd.product_id
            WHERE s.status AND s.created_at >= $1::DATE AND s.created_at < $2::DATE + 1
            GROUP BY p.id, p.name
            ORDER BY quantity DESC, p.name
            LIMIT 1
            ",
        )
        .bind(range.date_from)
        .bind(range.date_to)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Sales per period, ordered by period.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_by_period(
        &self,
        range: &DateRange,
        grouping: TimeGrouping,
    ) -> Result<Vec<PeriodSales>, RepositoryError> {
        let rows = sqlx::query_as::<_, PeriodSales>(
            r"
            SELECT to_char(date_trunc($3, created_at), $4) AS period,
                   SUM(total) AS amount,
                   COUNT(*) AS sales_count
            FROM sales
            WHERE status AND created_at >= $1::DATE AND created_at < $2::DATE + 1
            GROUP BY 1
            ORDER BY 1
            ",
        )
        .bind(range.date_from)
        .bind(range.date_to)
        .bind(grouping.trunc_unit())
        .bind(grouping.label_format())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Refunds per period, ordered by period.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn refunds_by_period(
        &self,
        range: &DateRange,
        grouping: TimeGrouping,
    ) -> Result<Vec<PeriodRefunds>, RepositoryError> {
        let rows = sqlx::query_as::<_, PeriodRefunds>(
            r"
            SELECT to_char(date_trunc($3, created_at), $4) AS period,
                   SUM(amount) AS amount
            FROM refunds
            WHERE created_at >= $1::DATE AND created_at < $2::DATE + 1
            GROUP BY 1
            ORDER BY 1
            ",
        )
        .bind(range.date_from)
        .bind(range.date_to)
        .bind(grouping.trunc_unit())
        .bind(grouping.label_format())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Units and revenue sold and refunded per product, by gross revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_movements(
        &self,
        range: &DateRange,
        product_id: Option<ProductId>,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<ProductMovement>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductMovement>(
            r"
            WITH sold AS (
                SELECT sd.product_id, SUM(sd.quantity) AS qty, SUM(sd.total) AS revenue
                FROM sale_details sd
                JOIN sales s ON s.id = sd.sale_id
                WHERE s.status AND s.created_at >= $1::DATE AND s.created_at < $2::DATE + 1
                GROUP BY sd.product_id
            ),
            refunded AS (
                SELECT rd.product_id, SUM(rd.quantity) AS qty,
                       SUM(rd.quantity * rd.unit_price) AS amount
                FROM refund_details rd
                JOIN refunds r ON r.id = rd.refund_id
                WHERE r.created_at >= $1::DATE AND r.created_at < $2::DATE + 1
                GROUP BY rd.product_id
            )
            SELECT p.id AS product_id,
                   p.name AS product_name,
                   c.name AS category_name,
                   COALESCE(sold.qty, 0)::BIGINT AS quantity_sold,
                   COALESCE(sold.revenue, 0) AS gross_revenue,
                   COALESCE(refunded.qty, 0)::BIGINT AS quantity_refunded,
                   COALESCE(refunded.amount, 0) AS refunded_amount
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            LEFT JOIN sold ON sold.product_id = p.id
            LEFT JOIN refunded ON refunded.product_id = p.id
            WHERE (sold.product_id IS NOT NULL OR refunded.product_id IS NOT NULL)
              AND ($3::INTEGER IS NULL OR p.id = $3)
              AND ($4::INTEGER IS NULL OR p.category_id = $4)
            ORDER BY gross_revenue DESC, p.name
            ",
        )
        .bind(range.date_from)
        .bind(range.date_to)
        .bind(product_id)
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Net sales and units per category, by net sales.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category_sales(
        &self,
        range: &DateRange,
    ) -> Result<Vec<CategorySales>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategorySales>(
            r"
            WITH sold AS (
                SELECT p.category_id, SUM(sd.total) AS amount, SUM(sd.quantity) AS qty
                FROM sale_details sd
                JOIN sales s ON s.id = sd.sale_id
                JOIN products p ON p.id = sd.product_id
                WHERE s.status AND s.created_at >= $1::DATE AND s.created_at < $2::DATE + 1
                GROUP BY p.category_id
            ),
            refunded AS (
                SELECT p.category_id, SUM(rd.quantity * rd.unit_price) AS amount
                FROM refund_details rd
                JOIN refunds r ON r.id = rd.refund_id
                JOIN products p ON p.id = rd.product_id
                WHERE r.created_at >= $1::DATE AND r.created_at < $2::DATE + 1
                GROUP BY p.category_id
            )
            SELECT sold.category_id,
                   COALESCE(c.name, $3) AS category_name,
                   sold.amount - COALESCE(refunded.amount, 0) AS net_sales,
                   sold.qty::BIGINT AS quantity_sold
            FROM sold
            LEFT JOIN refunded ON refunded.category_id IS NOT DISTINCT FROM sold.category_id
            LEFT JOIN categories c ON c.id = sold.category_id
            ORDER BY net_sales DESC, category_name
            ",
        )
        .bind(range.date_from)
        .bind(range.date_to)
        .bind(UNCATEGORIZED)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Collected amount and transaction count per payment method.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn payment_method_sales(
        &self,
        range: &DateRange,
    ) -> Result<Vec<PaymentMethodSales>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentMethodSales>(
            r"
            SELECT pm.id AS payment_method_id,
                   pm.name AS payment_method_name,
                   SUM(sp.amount) AS total_amount,
                   COUNT(sp.id) AS transaction_count
            FROM sale_payments sp
            JOIN sales s ON s.id = sp.sale_id
            JOIN payment_methods pm ON pm.id = sp.payment_method_id
            WHERE s.status AND s.created_at >= $1::DATE AND s.created_at < $2::DATE + 1
            GROUP BY pm.id, pm.name
            ORDER BY total_amount DESC, pm.name
            ",
        )
        .bind(range.date_from)
        .bind(range.date_to)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// The `limit` most refunded products by units.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_refunded_products(
        &self,
        range: &DateRange,
        limit: i64,
    ) -> Result<Vec<RefundedProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, RefundedProduct>(
            r"
            SELECT p.id AS product_id,
                   p.name AS product_name,
                   SUM(rd.quantity)::BIGINT AS quantity_refunded,
                   SUM(rd.quantity * rd.unit_price) AS amount_refunded
            FROM refund_details rd
            JOIN refunds r ON r.id = rd.refund_id
            JOIN products p ON p.id = rd.product_id
            WHERE r.created_at >= $1::DATE AND r.created_at < $2::DATE + 1
            GROUP BY p.id, p.name
            ORDER BY quantity_refunded DESC, amount_refunded DESC
            LIMIT $3
            ",
        )
        .bind(range.date_from)
        .bind(range.date_to)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}

