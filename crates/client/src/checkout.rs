//! Payment step of a sale.
//!
//! Turns the cart plus the chosen payment kind into a [`CreateSaleRequest`].
//! Cash payments must cover the total; card and voucher payments are taken
//! for the exact amount.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use caja_core::dto::sales::{CreateSaleRequest, PaymentMethod, SaleItemRequest};
use caja_core::{Cart, ProductId, format_money};

/// Bills offered as one-tap cash amounts.
const QUICK_AMOUNTS: [i64; 5] = [20, 50, 100, 200, 500];

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentKind {
    #[default]
    Cash,
    Card,
    Voucher,
}

impl PaymentKind {
    /// Name of the backend payment method this kind is recorded as.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Cash => "Efectivo",
            Self::Card => "Tarjeta de Crédito",
            Self::Voucher => "Vales",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("the cart is empty")]
    EmptyCart,

    #[error("cash received is {} short of the total", format_money(*short))]
    InsufficientCash { short: Decimal },

    #[error("payment method \"{0}\" is not available")]
    PaymentMethodUnavailable(&'static str),

    #[error("quantity too large for product {0}")]
    QuantityOverflow(ProductId),
}

/// State of the payment dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkout {
    kind: PaymentKind,
    cash_received: String,
}

impl Checkout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn kind(&self) -> PaymentKind {
        self.kind
    }

    pub const fn set_kind(&mut self, kind: PaymentKind) {
        self.kind = kind;
    }

    /// Cash field as typed.
    #[must_use]
    pub fn cash_received(&self) -> &str {
        &self.cash_received
    }

    pub fn set_cash_received(&mut self, text: impl Into<String>) {
        self.cash_received = text.into();
    }

    /// Parsed cash amount. Anything unparseable counts as zero.
    #[must_use]
    pub fn cash_amount(&self) -> Decimal {
        Decimal::from_str(self.cash_received.trim()).unwrap_or_default()
    }

    /// `cash − total`.
    #[must_use]
    pub fn change(&self, total: Decimal) -> Decimal {
        self.cash_amount().saturating_sub(total)
    }

    /// Whether the confirm button is enabled.
    #[must_use]
    pub fn can_confirm(&self, total: Decimal) -> bool {
        !(self.kind == PaymentKind::Cash && self.change(total).is_sign_negative())
    }

    #[must_use]
    pub fn quick_amounts() -> [Decimal; 5] {
        QUICK_AMOUNTS.map(Decimal::from)
    }

    /// Fill the cash field with exactly `total`.
    pub fn exact(&mut self, total: Decimal) {
        self.cash_received = format!("{total:.2}");
    }

    /// Build the sale request for `cart`, resolving the payment kind against
    /// the backend's active `methods`.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] when the cart is empty, cash is short, or
    /// the payment method isn't offered.
    pub fn build_request(
        &self,
        cart: &Cart,
        methods: &[PaymentMethod],
    ) -> Result<CreateSaleRequest, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let totals = cart.totals();
        if !self.can_confirm(totals.total) {
            return Err(CheckoutError::InsufficientCash {
                short: self.change(totals.total).abs(),
            });
        }

        let name = self.kind.method_name();
        let method = methods
            .iter()
            .find(|m| m.name == name)
            .ok_or(CheckoutError::PaymentMethodUnavailable(name))?;

        let items = cart
            .items()
            .iter()
            .map(|item| {
                Ok(SaleItemRequest {
                    product_id: item.id,
                    quantity: i32::try_from(item.quantity)
                        .map_err(|_| CheckoutError::QuantityOverflow(item.id))?,
                    unit_price: item.price,
                    tax_rate: item.tax_rate(),
                })
            })
            .collect::<Result<Vec<_>, CheckoutError>>()?;

        Ok(CreateSaleRequest {
            items,
            payment_method_id: method.id,
            subtotal: totals.subtotal,
            total: totals.total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use caja_core::{PaymentMethodId, SalesProduct};

    use super::*;

    fn methods() -> Vec<PaymentMethod> {
        [(1, "Efectivo", "01"), (2, "Tarjeta de Débito", "28"), (3, "Tarjeta de Crédito", "04")]
            .into_iter()
            .map(|(id, name, key)| PaymentMethod {
                id: PaymentMethodId::new(id),
                name: name.to_owned(),
                sat_key: key.to_owned(),
            })
            .collect()
    }

    fn cart() -> Cart {
        let product = SalesProduct {
            id: ProductId::new(7),
            code: "7501000000007".to_owned(),
            name: "Café 500g".to_owned(),
            price: Decimal::from(100),
            tax: Decimal::from(16),
        };
        let mut cart = Cart::new();
        cart.add(&product);
        cart.add(&product);
        cart
    }

    #[test]
    fn test_cash_parsing_and_change() {
        let mut checkout = Checkout::new();
        checkout.set_cash_received(" 300 ");
        assert_eq!(checkout.change(Decimal::from(232)), Decimal::from(68));

        checkout.set_cash_received("abc");
        assert_eq!(checkout.cash_amount(), Decimal::ZERO);
        assert!(!checkout.can_confirm(Decimal::from(232)));

        checkout.set_kind(PaymentKind::Card);
        assert!(checkout.can_confirm(Decimal::from(232)));
    }

    #[test]
    fn test_exact_and_quick_amounts() {
        let mut checkout = Checkout::new();
        checkout.exact(Decimal::from(232));
        assert_eq!(checkout.cash_received(), "232.00");
        assert!(checkout.can_confirm(Decimal::from(232)));
        assert_eq!(Checkout::quick_amounts()[4], Decimal::from(500));
    }

    #[test]
    fn test_build_request() {
        let mut checkout = Checkout::new();
        checkout.set_cash_received("500");

        let request = checkout.build_request(&cart(), &methods()).unwrap();
        assert_eq!(request.payment_method_id, PaymentMethodId::new(1));
        assert_eq!(request.subtotal, Decimal::from(200));
        assert_eq!(request.total, Decimal::from(232));
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.items[0].tax_rate, Decimal::new(16, 2));
    }

    #[test]
    fn test_build_request_errors() {
        let checkout = Checkout::new();
        assert_eq!(
            checkout.build_request(&Cart::new(), &methods()),
            Err(CheckoutError::EmptyCart)
        );
        let short = checkout.build_request(&cart(), &methods()).unwrap_err();
        assert_eq!(
            short,
            CheckoutError::InsufficientCash {
                short: Decimal::from(232)
            }
        );
        assert_eq!(
            short.to_string(),
            "cash received is $232.00 short of the total"
        );

        let mut partial = Checkout::new();
        partial.set_cash_received("200.5");
        assert_eq!(
            partial
                .build_request(&cart(), &methods())
                .unwrap_err()
                .to_string(),
            "cash received is $31.50 short of the total"
        );

        let mut voucher = Checkout::new();
        voucher.set_kind(PaymentKind::Voucher);
        assert_eq!(
            voucher.build_request(&cart(), &methods()),
            Err(CheckoutError::PaymentMethodUnavailable("Vales"))
        );
    }
}
