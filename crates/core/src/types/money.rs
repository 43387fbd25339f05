//! Decimal money helpers.
//!
//! Amounts are plain [`Decimal`]s in pesos. Tax is shown to people as a
//! percentage (`16`) but stored and sent to the sales ledger as a fraction
//! (`0.16`); the conversions live here so both sides agree.

use rust_decimal::{Decimal, RoundingStrategy};

/// One hundred, the percentage scale.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Convert a tax percentage (`16`) to a fraction (`0.16`).
#[must_use]
pub fn percent_to_rate(percent: Decimal) -> Decimal {
    percent / HUNDRED
}

/// Convert a tax fraction (`0.16`) to a percentage (`16`).
#[must_use]
pub fn rate_to_percent(rate: Decimal) -> Decimal {
    (rate * HUNDRED).normalize()
}

/// Round to cents, half away from zero.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount for a receipt, e.g. `$232.00`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rate_round_trip_values() {
        assert_eq!(percent_to_rate(Decimal::from(16)), Decimal::new(16, 2));
        assert_eq!(rate_to_percent(Decimal::new(1600, 4)), Decimal::from(16));
        assert_eq!(rate_to_percent(Decimal::new(8, 2)), Decimal::from(8));
    }

    #[test]
    fn test_round_cents_midpoint() {
        assert_eq!(round_cents(Decimal::new(10005, 3)), Decimal::new(1001, 2));
        assert_eq!(round_cents(Decimal::new(-10005, 3)), Decimal::new(-1001, 2));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::from(232)), "$232.00");
        assert_eq!(format_money(Decimal::new(125, 1)), "$12.50");
        assert_eq!(format_money(Decimal::new(-75, 1)), "-$7.50");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
    }
}
