//! # Money Module
//!
//! Provides the `Money` and `DiscountRate` types for handling monetary
//! values and discounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Floating point cannot represent prices exactly:                        │
//! │    19.99 * 0.1 = 1.9990000000000001  → epsilon nudges everywhere        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    1999 cents × 1000 bps → (1999 × 1000 + 5000) / 10000 = 200 cents    │
//! │    One rounding rule, applied in one place, no epsilon                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use playverse_core::money::{DiscountRate, Money};
//!
//! // Create from cents (preferred)
//! let weekly = Money::from_cents(1999); // $19.99
//!
//! // Two weeks of rental
//! let base = weekly * 2;               // $39.98
//!
//! // Premium discount
//! let off = base.discount_part(DiscountRate::from_bps(1000)); // $4.00
//! assert_eq!((base - off).cents(), 3598);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::MAX_DISCOUNT_BPS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the system flows through this type: game prices,
/// pricing breakdowns, payment ledger rows, receipt lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use playverse_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps negative amounts to zero.
    ///
    /// Game prices are non-negative by definition; a corrupt or
    /// miscomputed negative base price must not produce a negative charge.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Calculates the discount amount for this value at the given rate.
    ///
    /// ## Rounding
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ROUND HALF UP AT CENTS                                             │
    /// │                                                                     │
    /// │  Integer math: (cents × bps + 5000) / 10000                         │
    /// │  The +5000 provides rounding (5000/10000 = 0.5)                     │
    /// │                                                                     │
    /// │  $19.99 × 10% = 199.9¢ → 200¢                                       │
    /// │                                                                     │
    /// │  For all non-negative amounts this agrees with rounding the        │
    /// │  fractional price to 2 decimals, half away from zero.              │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use playverse_core::money::{DiscountRate, Money};
    ///
    /// let base = Money::from_cents(1999);            // $19.99
    /// let rate = DiscountRate::from_bps(1000);       // 10%
    /// assert_eq!(base.discount_part(rate).cents(), 200);
    /// ```
    pub fn discount_part(&self, rate: DiscountRate) -> Money {
        // i128 to prevent overflow on large amounts
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A discount rate in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. 1000 bps = 10% (the default premium
/// member discount). Integer bps keep the rate exact; fractional rates
/// (0.1) only appear at the configuration boundary.
///
/// Construction clamps to `[0, MAX_DISCOUNT_BPS]` - an out-of-range rate is
/// a configuration mistake, not a reason to fail a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points, clamped to the allowed
    /// maximum (90%).
    ///
    /// ## Example
    /// ```rust
    /// use playverse_core::money::DiscountRate;
    ///
    /// assert_eq!(DiscountRate::from_bps(1000).bps(), 1000);
    /// assert_eq!(DiscountRate::from_bps(25_000).bps(), 9000); // clamped
    /// ```
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > MAX_DISCOUNT_BPS {
            DiscountRate(MAX_DISCOUNT_BPS)
        } else {
            DiscountRate(bps)
        }
    }

    /// Creates a discount rate from a fraction (e.g. `0.1` for 10%).
    ///
    /// Used when parsing the `PREMIUM_DISCOUNT` environment variable.
    /// Non-finite or negative input coerces to zero; values above 0.9 clamp
    /// to the maximum.
    pub fn from_fraction(fraction: f64) -> Self {
        if !fraction.is_finite() || fraction <= 0.0 {
            return DiscountRate(0);
        }
        DiscountRate::from_bps((fraction * 10_000.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero discount rate.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// This is for logs and receipts. The frontend formats for locale.
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

/// Default money is zero.
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

/// Multiplication by i64 (weekly price × weeks).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
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
    fn test_discount_part_exact() {
        // $10.00 at 10% = $1.00
        let base = Money::from_cents(1000);
        assert_eq!(base.discount_part(DiscountRate::from_bps(1000)).cents(), 100);
    }

    #[test]
    fn test_discount_part_rounds_half_up() {
        // $19.99 at 10% = 199.9¢ → 200¢ (the headline storefront case)
        let base = Money::from_cents(1999);
        assert_eq!(base.discount_part(DiscountRate::from_bps(1000)).cents(), 200);

        // 25¢ at 50% = 12.5¢ → 13¢
        let base = Money::from_cents(25);
        assert_eq!(base.discount_part(DiscountRate::from_bps(5000)).cents(), 13);
    }

    #[test]
    fn test_discount_rate_clamps() {
        assert_eq!(DiscountRate::from_bps(1000).bps(), 1000);
        assert_eq!(DiscountRate::from_bps(9000).bps(), 9000);
        assert_eq!(DiscountRate::from_bps(9001).bps(), 9000);
        assert_eq!(DiscountRate::from_bps(u32::MAX).bps(), 9000);
    }

    #[test]
    fn test_discount_rate_from_fraction() {
        assert_eq!(DiscountRate::from_fraction(0.1).bps(), 1000);
        assert_eq!(DiscountRate::from_fraction(0.0).bps(), 0);
        assert_eq!(DiscountRate::from_fraction(-0.5).bps(), 0);
        assert_eq!(DiscountRate::from_fraction(2.0).bps(), 9000);
        assert_eq!(DiscountRate::from_fraction(f64::NAN).bps(), 0);
        assert_eq!(DiscountRate::from_fraction(f64::INFINITY).bps(), 0);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_cents(-100).clamp_non_negative().cents(), 0);
        assert_eq!(Money::from_cents(100).clamp_non_negative().cents(), 100);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}
