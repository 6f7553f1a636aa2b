//! # Money Module
//!
//! Provides the `Money` type for every price the pipeline produces.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A QUOTE IS A SUM OF MANY SMALL ADDERS                                  │
//! │                                                                         │
//! │  Base + material adder + voltage adder + foot adders + options +        │
//! │  insulator brackets + connection                                        │
//! │                                                                         │
//! │  In floating point the total drifts away from the sum of the printed    │
//! │  line items. In integer cents the total IS the sum, exactly.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use partcode_core::money::Money;
//!
//! let base = Money::from_dollars(455);
//! let per_foot = Money::from_dollars(45);
//!
//! let total = base + per_foot * 2;
//! assert_eq!(total.to_string(), "$545.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: catalog files are validated for negative amounts,
///   the type itself stays signed so a bad value can be detected
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Newtype**: serializes as a plain cent integer in catalog files
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use partcode_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole dollars.
    ///
    /// Catalog prices are whole-dollar amounts, so the built-in tables use
    /// this constructor throughout.
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition. `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use partcode_core::money::Money;
    ///
    /// let a = Money::from_cents(i64::MAX);
    /// assert!(a.checked_add(Money::from_cents(1)).is_none());
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Checked multiplication by a count (foot adders, extra inches).
    #[inline]
    pub const fn checked_mul(self, count: i64) -> Option<Money> {
        match self.0.checked_mul(count) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the plain `$1234.56` form used on breakdown lines.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dollars() {
        let money = Money::from_dollars(455);
        assert_eq!(money.cents(), 45500);
        assert_eq!(money.dollars(), 455);
        assert_eq!(money.cents_part(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
        assert_eq!(format!("{}", Money::from_dollars(1234)), "$1234.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_checked_overflow() {
        let big = Money::from_cents(i64::MAX / 2 + 1);
        assert!(big.checked_add(big).is_none());
        assert!(big.checked_mul(2).is_none());
        assert_eq!(
            Money::from_dollars(45).checked_mul(3),
            Some(Money::from_dollars(135))
        );
    }

    #[test]
    fn test_sum() {
        let total: Money = [175, 350, 50]
            .iter()
            .map(|d| Money::from_dollars(*d))
            .sum();
        assert_eq!(total, Money::from_dollars(575));
    }

    #[test]
    fn test_serde_is_plain_cents() {
        let json = serde_json::to_string(&Money::from_cents(4500)).unwrap();
        assert_eq!(json, "4500");
        let back: Money = serde_json::from_str("17500").unwrap();
        assert_eq!(back, Money::from_dollars(175));
    }
}
