//! Money calculation utilities using rust_decimal for precision
//!
//! Models store money as `f64`; every calculation goes through `Decimal`
//! and is rounded half-up to 2 decimal places before conversion back.

use rust_decimal::prelude::*;
use shared::models::Seat;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Round to cents, half-up (midpoint away from zero).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `percentage` percent of `total`, rounded to cents.
pub fn percentage_of(total: f64, percentage: u32) -> f64 {
    let amount = to_decimal(total) * Decimal::from(percentage) / Decimal::from(100u32);
    to_f64(round_money(amount))
}

/// Sum seat prices with decimal precision.
pub fn sum_seat_prices<'a>(seats: impl Iterator<Item = &'a Seat>) -> f64 {
    let total: Decimal = seats.map(|s| to_decimal(s.price)).sum();
    to_f64(round_money(total))
}

/// Even per-seat share of a total (display value on bookings).
pub fn per_seat_price(total: f64, seat_count: usize) -> f64 {
    if seat_count == 0 {
        return 0.0;
    }
    to_f64(round_money(to_decimal(total) / Decimal::from(seat_count as u64)))
}
