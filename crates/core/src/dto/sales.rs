//! Sale and payment DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{PaymentMethodId, ProductId, SaleId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: UserId,
    pub updated_by: UserId,
}

/// Listing filter. Dates are `YYYY-MM-DD`; unparseable dates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleFilter {
    #[serde(default)]
    pub status: Option<bool>,
    pub page: u64,
    pub limit: u64,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleListResponse {
    pub sales: Vec<Sale>,
    pub total_pages: u64,
    pub total_items: u64,
}

/// One line of a sale. `tax_rate` is a fraction (`0.16`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
}

/// Derived amounts of one sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl SaleItemRequest {
    /// `unit_price × quantity`, or `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    /// `subtotal × tax_rate`, or `None` on overflow.
    #[must_use]
    pub fn tax_amount(&self) -> Option<Decimal> {
        self.subtotal()?.checked_mul(self.tax_rate)
    }

    /// Subtotal, tax and total of the line, or `None` on overflow.
    #[must_use]
    pub fn amounts(&self) -> Option<LineAmounts> {
        let subtotal = self.subtotal()?;
        let tax_amount = subtotal.checked_mul(self.tax_rate)?;
        Some(LineAmounts {
            subtotal,
            tax_amount,
            total: subtotal.checked_add(tax_amount)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSaleRequest {
    pub items: Vec<SaleItemRequest>,
    pub payment_method_id: PaymentMethodId,
    pub subtotal: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSaleResponse {
    pub sale_id: SaleId,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// An active payment method with its tax-authority key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub sat_key: String,
}

/// Arguments of `get_sales`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSalesArgs {
    pub filters: SaleFilter,
}

/// Arguments of `create_sale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSaleArgs {
    pub request: CreateSaleRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_amounts() {
        let item = SaleItemRequest {
            product_id: ProductId::new(1),
            quantity: 3,
            unit_price: Decimal::new(2550, 2),
            tax_rate: Decimal::new(16, 2),
        };
        assert_eq!(item.subtotal(), Some(Decimal::new(7650, 2)));
        assert_eq!(item.tax_amount(), Some(Decimal::new(12240, 3)));
        assert_eq!(item.amounts().map(|a| a.total), Some(Decimal::new(88740, 3)));
    }

    #[test]
    fn test_line_amounts_overflow_is_none() {
        let item = SaleItemRequest {
            product_id: ProductId::new(1),
            quantity: 2,
            unit_price: Decimal::MAX,
            tax_rate: Decimal::new(16, 2),
        };
        assert_eq!(item.subtotal(), None);
        assert_eq!(item.tax_amount(), None);
        assert_eq!(item.amounts(), None);
    }
}
