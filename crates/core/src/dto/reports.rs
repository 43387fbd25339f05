//! Report parameters and results.
//!
//! Every report is computed over a closed date range. Money is [`Decimal`];
//! counts are `i64` as produced by SQL aggregates. Shares are percentages
//! of the report's total, `0` when the total is not positive.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, PaymentMethodId, ProductId};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("date_from ({from}) is after date_to ({to})")]
pub struct DateRangeError {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub const fn new(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self { date_from, date_to }
    }

    /// # Errors
    ///
    /// Returns [`DateRangeError`] when `date_from` is after `date_to`.
    pub fn validate(&self) -> Result<(), DateRangeError> {
        if self.date_from > self.date_to {
            return Err(DateRangeError {
                from: self.date_from,
                to: self.date_to,
            });
        }
        Ok(())
    }
}

/// Bucket size for the sales-over-time report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrouping {
    #[default]
    Day,
    Week,
    Month,
}

impl TimeGrouping {
    /// `date_trunc` unit.
    #[must_use]
    pub const fn trunc_unit(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// `to_char` pattern for the period label: `2024-01-15`, `2024-W03`, `2024-01`.
    #[must_use]
    pub const fn label_format(self) -> &'static str {
        match self {
            Self::Day => "YYYY-MM-DD",
            Self::Week => "IYYY-\"W\"IW",
            Self::Month => "YYYY-MM",
        }
    }
}

/// Wrapper for the `{ params }` argument object of every report command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArgs<P> {
    pub params: P,
}

// Dashboard

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardParams {
    #[serde(flatten)]
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardResult {
    pub gross_sales: Decimal,
    pub total_refunded: Decimal,
    /// `gross_sales − total_refunded`.
    pub net_sales: Decimal,
    pub sales_count: i64,
    /// `net_sales / sales_count`, or `0` with no sales.
    pub average_ticket: Decimal,
    pub dominant_payment_method: Option<String>,
    pub dominant_payment_amount: Decimal,
    pub top_product: Option<String>,
    pub top_product_quantity: i64,
}

// Sales over time

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOverTimeParams {
    #[serde(flatten)]
    pub range: DateRange,
    pub grouping: TimeGrouping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOverTimeItem {
    pub period: String,
    pub net_sales: Decimal,
    pub sales_count: i64,
    pub average_ticket: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOverTimeResult {
    pub items: Vec<SalesOverTimeItem>,
    pub total_net_sales: Decimal,
    pub total_sales_count: i64,
    pub total_average_ticket: Decimal,
}

// Products

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReportParams {
    #[serde(flatten)]
    pub range: DateRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReportItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub category_name: Option<String>,
    pub quantity_sold: i64,
    pub quantity_refunded: i64,
    pub net_quantity: i64,
    pub gross_revenue: Decimal,
    pub net_revenue: Decimal,
    pub share_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReportResult {
    pub items: Vec<ProductReportItem>,
    pub total_quantity_sold: i64,
    pub total_quantity_refunded: i64,
    pub total_net_quantity: i64,
    pub total_gross_revenue: Decimal,
    pub total_net_revenue: Decimal,
}

// Categories

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReportParams {
    #[serde(flatten)]
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReportItem {
    /// `None` for products without a category.
    pub category_id: Option<CategoryId>,
    pub category_name: String,
    pub net_sales: Decimal,
    pub quantity_sold: i64,
    pub share_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReportResult {
    pub items: Vec<CategoryReportItem>,
    pub total_net_sales: Decimal,
    pub total_quantity_sold: i64,
}

// Payment methods

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodReportParams {
    #[serde(flatten)]
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodReportItem {
    pub payment_method_id: PaymentMethodId,
    pub payment_method_name: String,
    pub total_amount: Decimal,
    pub transaction_count: i64,
    pub share_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodReportResult {
    pub items: Vec<PaymentMethodReportItem>,
    pub total_amount: Decimal,
    pub total_transactions: i64,
}

// Refunds

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundsReportParams {
    #[serde(flatten)]
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopRefundedProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_refunded: i64,
    pub amount_refunded: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundsReportResult {
    pub total_refunded: Decimal,
    pub refunds_count: i64,
    /// Refunded amount as a percentage of gross sales.
    pub refund_percentage: Decimal,
    pub gross_sales: Decimal,
    /// At most ten rows, most refunded first.
    pub top_refunded_products: Vec<TopRefundedProduct>,
}
