//! # Money Module
//!
//! Rounding policy for the counter and the base-currency `Money` type.
//!
//! ## Two Kinds of Amounts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BASE CURRENCY (CZK)                 FOREIGN CURRENCIES                 │
//! │                                                                         │
//! │  Money(i64) in hellers               Decimal + Precision                │
//! │  always 2 decimal places             0, 1 or 2 places, derived from    │
//! │                                      the smallest coin of the currency │
//! │  totalPaid, capital                  counted cash, recorded balances   │
//! │                                                                         │
//! │  Both sides round half away from zero before any comparison.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasa_core::money::{Money, Precision};
//! use rust_decimal::Decimal;
//!
//! let total = Money::from_decimal(Decimal::new(253_755, 4)).unwrap(); // 25.3755
//! assert_eq!(total.hellers(), 2538);
//! assert_eq!(total.to_string(), "25.38 CZK");
//!
//! let dkk = Precision::from_smallest_face(Decimal::new(5, 1)); // 0.50 coin
//! assert_eq!(dkk.places(), 1);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::{BASE_CURRENCY, BASE_PRECISION};

// =============================================================================
// Precision
// =============================================================================

/// Number of decimal places a currency is counted, compared and shown in.
///
/// ## Derivation
/// ```text
/// smallest coin ≥ 1      → 0 places   (CZK, HUF, JPY)
/// smallest coin ≥ 0.1    → 1 place    (DKK: 0.50 coin)
/// otherwise              → 2 places   (EUR, USD, CHF)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Precision(u32);

impl Precision {
    /// Precision of the base currency.
    pub const BASE: Precision = Precision(BASE_PRECISION);

    #[inline]
    pub const fn new(places: u32) -> Self {
        Precision(places)
    }

    /// Derives the precision from the smallest note or coin of a currency.
    pub fn from_smallest_face(face: Decimal) -> Self {
        if face >= Decimal::ONE {
            Precision(0)
        } else if face >= Decimal::new(1, 1) {
            Precision(1)
        } else {
            Precision(2)
        }
    }

    /// Returns the number of decimal places.
    #[inline]
    pub const fn places(&self) -> u32 {
        self.0
    }

    /// Rounds half away from zero to this precision.
    pub fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.0, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Smallest representable step, `10^-places`.
    ///
    /// Differences strictly below this are rounding noise.
    pub fn tolerance(&self) -> Decimal {
        Decimal::new(1, self.0)
    }

    /// Rounds and renders with exactly `places` decimals ("532.50", "15000").
    pub fn format(&self, value: Decimal) -> String {
        let mut rounded = self.round(value);
        rounded.rescale(self.0);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        rounded.to_string()
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision::BASE
    }
}

/// Rounds to two decimal places, the fixed unit of every base-currency total.
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    Precision::BASE.round(value)
}

// =============================================================================
// Money Type
// =============================================================================

/// A base-currency amount in hellers (1/100 CZK).
///
/// ## Design Decisions
/// - **i64 (signed)**: shortfalls and differences can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - Built from a `Decimal` only through [`Money::from_decimal`], which applies
///   the base rounding rule, so an unrounded total can never be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates Money from hellers.
    ///
    /// ## Example
    /// ```rust
    /// use kasa_core::money::Money;
    ///
    /// let capital = Money::from_hellers(99_999); // 999.99 CZK
    /// assert_eq!(capital.hellers(), 99_999);
    /// ```
    #[inline]
    pub const fn from_hellers(hellers: i64) -> Self {
        Money(hellers)
    }

    /// Rounds a decimal CZK amount to 2 places and converts it.
    ///
    /// Returns `None` when the amount does not fit in i64 hellers.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        round2(value)
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_i64()
            .map(Money)
    }

    /// Returns the value in hellers.
    #[inline]
    pub const fn hellers(&self) -> i64 {
        self.0
    }

    /// Returns the amount as a 2-place decimal.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, BASE_PRECISION)
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

/// Shows the amount with the base currency code: `1000.50 CZK`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02} {}",
            sign,
            (self.0 / 100).abs(),
            (self.0 % 100).abs(),
            BASE_CURRENCY
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_precision_from_smallest_face() {
        assert_eq!(Precision::from_smallest_face(dec!(1)).places(), 0);
        assert_eq!(Precision::from_smallest_face(dec!(5)).places(), 0);
        assert_eq!(Precision::from_smallest_face(dec!(0.5)).places(), 1);
        assert_eq!(Precision::from_smallest_face(dec!(0.1)).places(), 1);
        assert_eq!(Precision::from_smallest_face(dec!(0.05)).places(), 2);
        assert_eq!(Precision::from_smallest_face(dec!(0.01)).places(), 2);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        let p = Precision::new(2);
        assert_eq!(p.round(dec!(1.005)), dec!(1.01));
        assert_eq!(p.round(dec!(-1.005)), dec!(-1.01));
        assert_eq!(Precision::new(0).round(dec!(2.5)), dec!(3));
    }

    #[test]
    fn test_tolerance() {
        assert_eq!(Precision::new(0).tolerance(), dec!(1));
        assert_eq!(Precision::new(1).tolerance(), dec!(0.1));
        assert_eq!(Precision::new(2).tolerance(), dec!(0.01));
    }

    #[test]
    fn test_format_pads_and_rounds() {
        assert_eq!(Precision::new(2).format(dec!(532.5)), "532.50");
        assert_eq!(Precision::new(0).format(dec!(15000.00)), "15000");
        assert_eq!(Precision::new(1).format(dec!(12.25)), "12.3");
        assert_eq!(Precision::new(2).format(dec!(-0.001)), "0.00");
    }

    #[test]
    fn test_money_from_decimal_rounds() {
        assert_eq!(Money::from_decimal(dec!(999.994)).unwrap().hellers(), 99_999);
        assert_eq!(Money::from_decimal(dec!(999.995)).unwrap().hellers(), 100_000);
        assert_eq!(Money::from_decimal(dec!(-0.5)).unwrap().hellers(), -50);
    }

    #[test]
    fn test_money_from_decimal_out_of_range() {
        assert_eq!(Money::from_decimal(Decimal::MAX), None);
        assert_eq!(Money::from_decimal(Decimal::from(i64::MAX)), None);
        assert_eq!(Money::from_decimal(Decimal::new(i64::MAX, 2)).unwrap().hellers(), i64::MAX);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_hellers(100_050).to_string(), "1000.50 CZK");
        assert_eq!(Money::from_hellers(1).to_string(), "0.01 CZK");
        assert_eq!(Money::from_hellers(-550).to_string(), "-5.50 CZK");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_hellers(100_000);
        let b = Money::from_hellers(99_999);
        assert_eq!((a - b).hellers(), 1);
        assert_eq!((a - b).to_decimal(), dec!(0.01));
        let mut c = b;
        c += Money::from_hellers(1);
        assert_eq!(c, a);
        c -= a;
        assert!(c.is_zero());
    }
}
