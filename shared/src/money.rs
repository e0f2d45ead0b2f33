//! Money calculation utilities using rust_decimal for precision
//!
//! Prices and totals are `Decimal` end to end. They travel over JSON as
//! plain numbers (`rust_decimal::serde::float`) but every sum and comparison
//! happens in decimal space, so `8.10 * 3` is exactly `24.30`.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons across the wire (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price (R$1,000,000)
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: u32 = 9999;

/// Round to cents, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Unit price × quantity
#[inline]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Sum of `unit_price × quantity` over `(unit_price, quantity)` pairs
pub fn sum_lines<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, u32)>,
{
    lines
        .into_iter()
        .fold(Decimal::ZERO, |acc, (price, qty)| acc + line_total(price, qty))
}

/// Compare two amounts within [`MONEY_TOLERANCE`]
#[inline]
pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}

/// Convert Decimal to f64 for details/logging
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Format as `12.50`
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}
