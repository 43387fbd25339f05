//! Report assembly.
//!
//! Queries return raw sums; this module derives nets, averages and shares.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use caja_core::dto::reports::{
    CategoryReportItem, CategoryReportResult, DashboardResult, DateRange, DateRangeError,
    PaymentMethodReportItem, PaymentMethodReportResult, ProductReportItem, ProductReportResult,
    RefundsReportResult, SalesOverTimeItem, SalesOverTimeResult, TimeGrouping, TopRefundedProduct,
};
use caja_core::{CategoryId, ProductId, round_cents};

use crate::db::reports::{
    CategorySales, PaymentMethodSales, PeriodRefunds, PeriodSales, ProductMovement,
};
use crate::db::{ReportRepository, RepositoryError};

/// Rows in the refunds report's product ranking.
const TOP_REFUNDED_LIMIT: i64 = 10;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    InvalidRange(#[from] DateRangeError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// `part / total × 100` rounded to cents, `0` unless `total` is positive.
#[must_use]
pub fn share_percentage(part: Decimal, total: Decimal) -> Decimal {
    if total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_cents(part / total * Decimal::ONE_HUNDRED)
}

/// `total / count` rounded to cents, `0` unless `count` is positive.
#[must_use]
pub fn average(total: Decimal, count: i64) -> Decimal {
    if count <= 0 {
        return Decimal::ZERO;
    }
    round_cents(total / Decimal::from(count))
}

/// Report service.
pub struct ReportService<'a> {
    reports: ReportRepository<'a>,
}

impl<'a> ReportService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            reports: ReportRepository::new(pool),
        }
    }

    /// Headline numbers for the range.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidRange` for a reversed range, or a
    /// repository error.
    pub async fn dashboard(&self, range: &DateRange) -> Result<DashboardResult, ReportError> {
        range.validate()?;

        let sales = self.reports.sales_totals(range).await?;
        let refunds = self.reports.refund_totals(range).await?;
        let dominant = self.reports.dominant_payment_method(range).await?;
        let top = self.reports.top_product(range).await?;

        let net_sales = sales.gross_sales - refunds.total_refunded;

        Ok(DashboardResult {
            gross_sales: sales.gross_sales,
            total_refunded: refunds.total_refunded,
            net_sales,
            sales_count: sales.sales_count,
            average_ticket: average(net_sales, sales.sales_count),
            dominant_payment_amount: dominant.as_ref().map_or(Decimal::ZERO, |d| d.amount),
            dominant_payment_method: dominant.map(|d| d.name),
            top_product_quantity: top.as_ref().map_or(0, |t| t.quantity),
            top_product: top.map(|t| t.name),
        })
    }

    /// Net sales per day, ISO week or month.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidRange` for a reversed range, or a
    /// repository error.
    pub async fn sales_over_time(
        &self,
        range: &DateRange,
        grouping: TimeGrouping,
    ) -> Result<SalesOverTimeResult, ReportError> {
        range.validate()?;

        let sales = self.reports.sales_by_period(range, grouping).await?;
        let refunds = self.reports.refunds_by_period(range, grouping).await?;
        Ok(build_sales_over_time(sales, refunds))
    }

    /// Units and revenue per product, optionally narrowed to one product or
    /// one category.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidRange` for a reversed range, or a
    /// repository error.
    pub async fn products(
        &self,
        range: &DateRange,
        product_id: Option<ProductId>,
        category_id: Option<CategoryId>,
    ) -> Result<ProductReportResult, ReportError> {
        range.validate()?;

        let rows = self
            .reports
            .product_movements(range, product_id, category_id)
            .await?;
        Ok(build_product_report(rows))
    }

    /// Net sales per category.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidRange` for a reversed range, or a
    /// repository error.
    pub async fn categories(&self, range: &DateRange) -> Result<CategoryReportResult, ReportError> {
        range.validate()?;

        let rows = self.reports.category_sales(range).await?;
        Ok(build_category_report(rows))
    }

    /// Collected amount per payment method.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidRange` for a reversed range, or a
    /// repository error.
    pub async fn payment_methods(
        &self,
        range: &DateRange,
    ) -> Result<PaymentMethodReportResult, ReportError> {
        range.validate()?;

        let rows = self.reports.payment_method_sales(range).await?;
        Ok(build_payment_method_report(rows))
    }

    /// Refund totals and the most refunded products.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidRange` for a reversed range, or a
    /// repository error.
    pub async fn refunds(&self, range: &DateRange) -> Result<RefundsReportResult, ReportError> {
        range.validate()?;

        let refunds = self.reports.refund_totals(range).await?;
        let sales = self.reports.sales_totals(range).await?;
        let top = self
            .reports
            .top_refunded_products(range, TOP_REFUNDED_LIMIT)
            .await?;

        Ok(RefundsReportResult {
            total_refunded: refunds.total_refunded,
            refunds_count: refunds.refunds_count,
            refund_percentage: share_percentage(refunds.total_refunded, sales.gross_sales),
            gross_sales: sales.gross_sales,
            top_refunded_products: top
                .into_iter()
                .map(|row| TopRefundedProduct {
                    product_id: row.product_id,
                    product_name: row.product_name,
                    quantity_refunded: row.quantity_refunded,
                    amount_refunded: row.amount_refunded,
                })
                .collect(),
        })
    }
}

// =============================================================================
// Assembly
// =============================================================================

fn build_sales_over_time(sales: Vec<PeriodSales>, refunds: Vec<PeriodRefunds>) -> SalesOverTimeResult {
    let refunded: HashMap<String, Decimal> =
        refunds.into_iter().map(|r| (r.period, r.amount)).collect();

    let items: Vec<SalesOverTimeItem> = sales
        .into_iter()
        .map(|row| {
            let net_sales = row.amount - refunded.get(&row.period).copied().unwrap_or_default();
            SalesOverTimeItem {
                average_ticket: average(net_sales, row.sales_count),
                period: row.period,
                net_sales,
                sales_count: row.sales_count,
            }
        })
        .collect();

    let total_net_sales: Decimal = items.iter().map(|i| i.net_sales).sum();
    let total_sales_count: i64 = items.iter().map(|i| i.sales_count).sum();

    SalesOverTimeResult {
        items,
        total_net_sales,
        total_sales_count,
        total_average_ticket: average(total_net_sales, total_sales_count),
    }
}

fn build_product_report(rows: Vec<ProductMovement>) -> ProductReportResult {
    let total_net_revenue: Decimal = rows
        .iter()
        .map(|r| r.gross_revenue - r.refunded_amount)
        .sum();

    let items: Vec<ProductReportItem> = rows
        .into_iter()
        .map(|row| {
            let net_revenue = row.gross_revenue - row.refunded_amount;
            ProductReportItem {
                product_id: row.product_id,
                product_name: row.product_name,
                category_name: row.category_name,
                quantity_sold: row.quantity_sold,
                quantity_refunded: row.quantity_refunded,
                net_quantity: row.quantity_sold - row.quantity_refunded,
                gross_revenue: row.gross_revenue,
                net_revenue,
                share_percentage: share_percentage(net_revenue, total_net_revenue),
            }
        })
        .collect();

    ProductReportResult {
        total_quantity_sold: items.iter().map(|i| i.quantity_sold).sum(),
        total_quantity_refunded: items.iter().map(|i| i.quantity_refunded).sum(),
        total_net_quantity: items.iter().map(|i| i.net_quantity).sum(),
        total_gross_revenue: items.iter().map(|i| i.gross_revenue).sum(),
        total_net_revenue,
        items,
    }
}

fn build_category_report(rows: Vec<CategorySales>) -> CategoryReportResult {
    let total_net_sales: Decimal = rows.iter().map(|r| r.net_sales).sum();
    let total_quantity_sold: i64 = rows.iter().map(|r| r.quantity_sold).sum();

    CategoryReportResult {
        items: rows
            .into_iter()
            .map(|row| CategoryReportItem {
                share_percentage: share_percentage(row.net_sales, total_net_sales),
                category_id: row.category_id,
                category_name: row.category_name,
                net_sales: row.net_sales,
                quantity_sold: row.quantity_sold,
            })
            .collect(),
        total_net_sales,
        total_quantity_sold,
    }
}

fn build_payment_method_report(rows: Vec<PaymentMethodSales>) -> PaymentMethodReportResult {
    let total_amount: Decimal = rows.iter().map(|r| r.total_amount).sum();
    let total_transactions: i64 = rows.iter().map(|r| r.transaction_count).sum();

    PaymentMethodReportResult {
        items: rows
            .into_iter()
            .map(|row| PaymentMethodReportItem {
                share_percentage: share_percentage(row.total_amount, total_amount),
                payment_method_id: row.payment_method_id,
                payment_method_name: row.payment_method_name,
                total_amount: row.total_amount,
                transaction_count: row.transaction_count,
            })
            .collect(),
        total_amount,
        total_transactions,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use caja_core::PaymentMethodId;

    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_share_percentage() {
        assert_eq!(share_percentage(dec("25"), dec("100")), dec("25"));
        assert_eq!(share_percentage(dec("1"), dec("3")), dec("33.33"));
        assert_eq!(share_percentage(dec("5"), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(share_percentage(dec("5"), dec("-10")), Decimal::ZERO);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(dec("100"), 3), dec("33.33"));
        assert_eq!(average(dec("100"), 0), Decimal::ZERO);
    }

    #[test]
    fn test_sales_over_time_subtracts_refunds_per_period() {
        let sales = vec![
            PeriodSales {
                period: "2024-01-01".to_owned(),
                amount: dec("300"),
                sales_count: 3,
            },
            PeriodSales {
                period: "2024-01-02".to_owned(),
                amount: dec("100"),
                sales_count: 1,
            },
        ];
        let refunds = vec![PeriodRefunds {
            period: "2024-01-01".to_owned(),
            amount: dec("60"),
        }];

        let result = build_sales_over_time(sales, refunds);
        assert_eq!(result.items[0].net_sales, dec("240"));
        assert_eq!(result.items[0].average_ticket, dec("80"));
        assert_eq!(result.items[1].net_sales, dec("100"));
        assert_eq!(result.total_net_sales, dec("340"));
        assert_eq!(result.total_sales_count, 4);
        assert_eq!(result.total_average_ticket, dec("85"));
    }

    #[test]
    fn test_product_report_shares_of_net_revenue() {
        let row = |id: i32, gross: &str, refunded: &str, sold: i64, back: i64| ProductMovement {
            product_id: ProductId::new(id),
            product_name: format!("P{id}"),
            category_name: None,
            quantity_sold: sold,
            gross_revenue: dec(gross),
            quantity_refunded: back,
            refunded_amount: dec(refunded),
        };

        let result = build_product_report(vec![row(1, "100", "25", 10, 2), row(2, "25", "0", 5, 0)]);
        assert_eq!(result.total_net_revenue, dec("100"));
        assert_eq!(result.items[0].net_revenue, dec("75"));
        assert_eq!(result.items[0].net_quantity, 8);
        assert_eq!(result.items[0].share_percentage, dec("75"));
        assert_eq!(result.items[1].share_percentage, dec("25"));
        assert_eq!(result.total_net_quantity, 13);
        assert_eq!(result.total_gross_revenue, dec("125"));
    }

    #[test]
    fn test_category_report_with_empty_period() {
        let result = build_category_report(vec![]);
        assert!(result.items.is_empty());
        assert_eq!(result.total_net_sales, Decimal::ZERO);
        assert_eq!(result.total_quantity_sold, 0);
    }

    #[test]
    fn test_payment_method_report_totals() {
        let rows = vec![
            PaymentMethodSales {
                payment_method_id: PaymentMethodId::new(1),
                payment_method_name: "Efectivo".to_owned(),
                total_amount: dec("150"),
                transaction_count: 3,
            },
            PaymentMethodSales {
                payment_method_id: PaymentMethodId::new(2),
                payment_method_name: "Tarjeta de crédito".to_owned(),
                total_amount: dec("50"),
                transaction_count: 1,
            },
        ];

        let result = build_payment_method_report(rows);
        assert_eq!(result.total_amount, dec("200"));
        assert_eq!(result.total_transactions, 4);
        assert_eq!(result.items[0].share_percentage, dec("75"));
        assert_eq!(result.items[1].share_percentage, dec("25"));
    }
}
