//! Sale recording.
//!
//! A sale is written inside one transaction: payment method check, row locks
//! on every product, header, details, stock decrements and the payment. Any
//! failure rolls the whole sale back.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use caja_core::dto::sales::{
    CreateSaleRequest, CreateSaleResponse, LineAmounts, SaleFilter, SaleListResponse,
};
use caja_core::{PaymentMethodId, ProductId, SaleId, UserId, pagination};

use crate::db::sales::SaleQuery;
use crate::db::{RepositoryError, SaleRepository};

/// Errors that can occur while recording a sale.
#[derive(Debug, Error)]
pub enum SaleError {
    #[error("a sale needs at least one item")]
    EmptySale,

    #[error("invalid quantity for product {0}")]
    InvalidQuantity(ProductId),

    #[error("invalid price or tax rate for product {0}")]
    InvalidAmount(ProductId),

    #[error("sale totals are out of range")]
    InvalidTotals,

    #[error("payment method {0} is not available")]
    PaymentMethodUnavailable(PaymentMethodId),

    #[error("product {0} is not available")]
    ProductUnavailable(ProductId),

    #[error("insufficient stock for {name}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        available: i32,
        requested: i64,
    },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for SaleError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Sale service.
pub struct SalesService<'a> {
    pool: &'a PgPool,
}

impl<'a> SalesService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Page of sales matching `filter`.
    ///
    /// A `limit` of zero returns every match on a single page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &SaleFilter) -> Result<SaleListResponse, RepositoryError> {
        let query = sale_query(filter);
        let (sales, total_items) = SaleRepository::new(self.pool).list(&query).await?;

        Ok(SaleListResponse {
            sales,
            total_pages: pagination::total_pages(total_items, filter.limit),
            total_items,
        })
    }

    /// Record a sale and decrement stock.
    ///
    /// # Errors
    ///
    /// Returns a [`SaleError`] describing the first rule the request breaks.
    /// Nothing is written in that case.
    #[instrument(skip(self, request), fields(user_id = %created_by, items = request.items.len()))]
    pub async fn create_sale(
        &self,
        request: &CreateSaleRequest,
        created_by: &UserId,
    ) -> Result<CreateSaleResponse, SaleError> {
        let quantities = aggregate_quantities(request)?;
        let amounts = line_amounts(request)?;

        let mut tx = self.pool.begin().await?;

        if !SaleRepository::payment_method_is_active(&mut *tx, request.payment_method_id).await? {
            return Err(SaleError::PaymentMethodUnavailable(request.payment_method_id));
        }

        // Ascending id order keeps concurrent sales from deadlocking.
        for (&product_id, &requested) in &quantities {
            let product = SaleRepository::lock_product(&mut *tx, product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or(SaleError::ProductUnavailable(product_id))?;

            if i64::from(product.stock) < requested {
                return Err(SaleError::InsufficientStock {
                    product_id,
                    name: product.name,
                    available: product.stock,
                    requested,
                });
            }
        }

        let sale_id = SaleId::generate();
        let created_at = SaleRepository::insert_sale(
            &mut *tx,
            &sale_id,
            request.subtotal,
            request.total,
            created_by,
        )
        .await?;

        for (item, amounts) in request.items.iter().zip(&amounts) {
            SaleRepository::insert_detail(&mut *tx, &sale_id, item, amounts).await?;
        }

        for (&product_id, &requested) in &quantities {
            let quantity =
                i32::try_from(requested).map_err(|_| SaleError::InvalidQuantity(product_id))?;
            SaleRepository::decrement_stock(&mut *tx, product_id, quantity, created_by).await?;
        }

        SaleRepository::insert_payment(&mut *tx, &sale_id, request.payment_method_id, request.total)
            .await?;

        tx.commit().await?;

        tracing::info!(sale_id = %sale_id, total = %request.total, "Sale recorded");

        Ok(CreateSaleResponse {
            sale_id,
            subtotal: request.subtotal,
            total: request.total,
            created_at,
        })
    }
}

/// Units requested per product, summed across repeated lines.
fn aggregate_quantities(
    request: &CreateSaleRequest,
) -> Result<BTreeMap<ProductId, i64>, SaleError> {
    if request.items.is_empty() {
        return Err(SaleError::EmptySale);
    }

    let mut quantities = BTreeMap::new();
    for item in &request.items {
        if item.quantity <= 0 {
            return Err(SaleError::InvalidQuantity(item.product_id));
        }
        *quantities.entry(item.product_id).or_insert(0) += i64::from(item.quantity);
    }
    Ok(quantities)
}

/// Largest value of a `numeric(10, 2)` column.
fn max_unit_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Largest value of a `numeric(5, 4)` column.
fn max_tax_rate() -> Decimal {
    Decimal::new(99_999, 4)
}

/// Largest value of a `numeric(12, 2)` column.
fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

fn in_range(value: Decimal, max: Decimal) -> bool {
    !value.is_sign_negative() && value <= max
}

/// Detail amounts per line, in request order.
///
/// Prices and rates must be non-negative and fit their columns, as must
/// every derived amount and the header totals.
fn line_amounts(request: &CreateSaleRequest) -> Result<Vec<LineAmounts>, SaleError> {
    if !in_range(request.subtotal, max_amount()) || !in_range(request.total, max_amount()) {
        return Err(SaleError::InvalidTotals);
    }

    request
        .items
        .iter()
        .map(|item| {
            if !in_range(item.unit_price, max_unit_price())
                || !in_range(item.tax_rate, max_tax_rate())
            {
                return Err(SaleError::InvalidAmount(item.product_id));
            }
            item.amounts()
                .filter(|a| a.total <= max_amount())
                .ok_or(SaleError::InvalidAmount(item.product_id))
        })
        .collect()
}

fn sale_query(filter: &SaleFilter) -> SaleQuery {
    let parse = |raw: Option<&str>| {
        raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
    };

    SaleQuery {
        status: filter.status,
        limit: (filter.limit > 0).then_some(filter.limit),
        offset: pagination::offset(filter.page, filter.limit),
        date_from: parse(filter.date_from.as_deref()),
        date_to: parse(filter.date_to.as_deref()),
    }
}
