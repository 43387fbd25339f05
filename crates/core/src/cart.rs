//! In-progress sale: line items and totals.
//!
//! The cart is owned by the sales screen and never persisted. Totals are
//! computed on demand from the line items:
//!
//! ```text
//! subtotal = Σ price × qty
//! taxes    = Σ price × qty × tax / 100
//! total    = subtotal + taxes
//! change   = cash tendered − total
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dto::products::Product;
use crate::types::{ProductId, percent_to_rate};

/// A product as offered on the sales screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesProduct {
    pub id: ProductId,
    pub code: String,
    pub name: String,
    pub price: Decimal,
    /// Tax as a percentage, e.g. `16`.
    pub tax: Decimal,
}

impl From<&Product> for SalesProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            code: product.code.clone(),
            name: product.name.clone(),
            price: product.price,
            tax: product.tax,
        }
    }
}

/// One row of the cart. `quantity` is never below 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub code: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    /// Tax as a percentage, e.g. `16`.
    pub tax: Decimal,
}

impl CartItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// `price × quantity × tax / 100`.
    #[must_use]
    pub fn line_tax(&self) -> Decimal {
        self.line_subtotal() * self.tax_rate()
    }

    /// Tax as a fraction, e.g. `0.16`.
    #[must_use]
    pub fn tax_rate(&self) -> Decimal {
        percent_to_rate(self.tax)
    }
}

/// Computed totals of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub taxes: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// `cash − total`; negative when the customer has not paid enough.
    #[must_use]
    pub fn change(&self, cash_tendered: Decimal) -> Decimal {
        cash_tendered - self.total
    }
}

/// Ordered collection of line items, unique by product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add one unit of `product`.
    ///
    /// A product already in the cart has its quantity incremented instead of
    /// gaining a second row.
    pub fn add(&mut self, product: &SalesProduct) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return;
        }
        self.items.push(CartItem {
            id: product.id,
            code: product.code.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
            tax: product.tax,
        });
    }

    /// Change a row's quantity by `delta`, flooring at 1.
    ///
    /// Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: ProductId, delta: i64) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            let next = i64::from(item.quantity).saturating_add(delta).max(1);
            item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
    }

    /// Drop the row for `id`.
    pub fn remove(&mut self, id: ProductId) {
        self.items.retain(|i| i.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total number of units across all rows.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        let subtotal: Decimal = self.items.iter().map(CartItem::line_subtotal).sum();
        let taxes: Decimal = self.items.iter().map(CartItem::line_tax).sum();
        CartTotals {
            subtotal,
            taxes,
            total: subtotal + taxes,
        }
    }

    /// Shorthand for `self.totals().change(cash_tendered)`.
    #[must_use]
    pub fn change(&self, cash_tendered: Decimal) -> Decimal {
        self.totals().change(cash_tendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, price: i64, tax: i64) -> SalesProduct {
        SalesProduct {
            id: ProductId::new(id),
            code: format!("750100000{id}"),
            name: format!("Product {id}"),
            price: Decimal::from(price),
            tax: Decimal::from(tax),
        }
    }

    #[test]
    fn test_known_fixture_totals() {
        let mut cart = Cart::new();
        let p = product(1, 100, 16);
        cart.add(&p);
        cart.add(&p);

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::from(200));
        assert_eq!(totals.taxes, Decimal::from(32));
        assert_eq!(totals.total, Decimal::from(232));
    }

    #[test]
    fn test_duplicate_add_increments() {
        let mut cart = Cart::new();
        cart.add(&product(1, 10, 0));
        cart.add(&product(2, 5, 0));
        cart.add(&product(1, 10, 0));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[1].quantity, 1);
        assert_eq!(cart.unit_count(), 3);
    }

    #[test]
    fn test_quantity_floors_at_one() {
        let mut cart = Cart::new();
        cart.add(&product(1, 10, 0));
        cart.update_quantity(ProductId::new(1), -1);
        assert_eq!(cart.items()[0].quantity, 1);
        cart.update_quantity(ProductId::new(1), -50);
        assert_eq!(cart.items()[0].quantity, 1);
        cart.update_quantity(ProductId::new(1), 4);
        assert_eq!(cart.items()[0].quantity, 5);
        cart.update_quantity(ProductId::new(99), 3);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(&product(1, 10, 0));
        cart.add(&product(2, 10, 0));
        cart.remove(ProductId::new(1));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].id, ProductId::new(2));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }

    #[test]
    fn test_mixed_tax_rates() {
        let mut cart = Cart::new();
        cart.add(&product(1, 50, 16));
        cart.add(&product(2, 20, 0));
        cart.add(&product(2, 20, 0));

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::from(90));
        assert_eq!(totals.taxes, Decimal::from(8));
        assert_eq!(totals.total, Decimal::from(98));
    }

    #[test]
    fn test_change_sign() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100, 16));
        cart.add(&product(1, 100, 16));

        assert_eq!(cart.change(Decimal::from(300)), Decimal::from(68));
        assert_eq!(cart.change(Decimal::from(232)), Decimal::ZERO);
        assert!(cart.change(Decimal::from(200)).is_sign_negative());
    }

    #[test]
    fn test_line_helpers() {
        let item = CartItem {
            id: ProductId::new(1),
            code: "A".to_owned(),
            name: "A".to_owned(),
            price: Decimal::new(1250, 2),
            quantity: 4,
            tax: Decimal::from(8),
        };
        assert_eq!(item.line_subtotal(), Decimal::from(50));
        assert_eq!(item.line_tax(), Decimal::from(4));
        assert_eq!(item.tax_rate(), Decimal::new(8, 2));
    }
}
