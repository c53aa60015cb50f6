//! # Pricing Module
//!
//! Discount computation and pricing-breakdown merging.
//!
//! ## Where Pricing is Used
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Pricing Data Flow                                 │
//! │                                                                         │
//! │  Game.weekly_price × weeks ──┐                                          │
//! │  Game.purchase_price ────────┤                                          │
//! │                              ▼                                          │
//! │  Profile.role ──► discount_rate_for_role ──► Pricing::compute           │
//! │                                                   │                     │
//! │                              ┌────────────────────┤                     │
//! │                              ▼                    ▼                     │
//! │                    Transaction row         Payment row (final)          │
//! │                                                                         │
//! │  Rental extension: Pricing::combine(existing, delta)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariant
//! `final_cents == base_cents - discount_cents` holds for every breakdown
//! this module produces, including combined ones.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{DiscountRate, Money};
use crate::types::Role;

// =============================================================================
// Pricing Breakdown
// =============================================================================

/// A pricing breakdown for one transaction (or one cart line).
///
/// Stored verbatim on the transaction row so receipts and refunds can
/// reconstruct exactly what was charged and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    /// Undiscounted amount in cents.
    pub base_cents: i64,
    /// Discount rate applied, in basis points.
    pub discount_rate_bps: u32,
    /// Discount amount in cents (rounded half up).
    pub discount_cents: i64,
    /// Amount actually charged: `base_cents - discount_cents`.
    pub final_cents: i64,
}

impl Pricing {
    /// Computes a pricing breakdown for a base amount and discount rate.
    ///
    /// Negative base amounts clamp to zero (a data problem must not turn
    /// into a negative charge); the rate is already clamped by
    /// [`DiscountRate`].
    ///
    /// ## Example
    /// ```rust
    /// use playverse_core::money::{DiscountRate, Money};
    /// use playverse_core::pricing::Pricing;
    ///
    /// let p = Pricing::compute(Money::from_cents(1999), DiscountRate::from_bps(1000));
    /// assert_eq!(p.base_cents, 1999);
    /// assert_eq!(p.discount_cents, 200);
    /// assert_eq!(p.final_cents, 1799);
    /// ```
    pub fn compute(base: Money, rate: DiscountRate) -> Self {
        let base = base.clamp_non_negative();
        let discount = base.discount_part(rate);

        Pricing {
            base_cents: base.cents(),
            discount_rate_bps: rate.bps(),
            discount_cents: discount.cents(),
            final_cents: (base - discount).cents(),
        }
    }

    /// A free breakdown (zero everywhere).
    pub const fn free() -> Self {
        Pricing {
            base_cents: 0,
            discount_rate_bps: 0,
            discount_cents: 0,
            final_cents: 0,
        }
    }

    /// Additively merges another breakdown into this one.
    ///
    /// Used when extending a rental: the existing transaction accumulates
    /// the delta's amounts. Base, discount and final are summed; the
    /// discount rate keeps whichever side is non-zero (this one wins when
    /// both are), because the rate is informational once amounts are fixed.
    ///
    /// ## Example
    /// ```rust
    /// use playverse_core::money::{DiscountRate, Money};
    /// use playverse_core::pricing::Pricing;
    ///
    /// let first = Pricing::compute(Money::from_cents(1999), DiscountRate::from_bps(1000));
    /// let extra = Pricing::compute(Money::from_cents(3998), DiscountRate::from_bps(1000));
    /// let merged = first.combine(&extra);
    ///
    /// assert_eq!(merged.base_cents, 1999 + 3998);
    /// assert_eq!(merged.final_cents, merged.base_cents - merged.discount_cents);
    /// ```
    pub fn combine(&self, delta: &Pricing) -> Self {
        Pricing {
            base_cents: self.base_cents + delta.base_cents,
            discount_rate_bps: if self.discount_rate_bps != 0 {
                self.discount_rate_bps
            } else {
                delta.discount_rate_bps
            },
            discount_cents: self.discount_cents + delta.discount_cents,
            final_cents: self.final_cents + delta.final_cents,
        }
    }

    /// Checks whether nothing is actually charged.
    #[inline]
    pub const fn is_free(&self) -> bool {
        self.final_cents == 0
    }
}

// =============================================================================
// Role-Based Discount
// =============================================================================

/// Returns the discount rate a profile's role is entitled to.
///
/// Premium members get the configured rate (default 10%); everyone else -
/// including admins shopping on their own account - pays full price. There
/// is no tiering and no promotional logic.
///
/// ## Example
/// ```rust
/// use playverse_core::money::DiscountRate;
/// use playverse_core::pricing::discount_rate_for_role;
/// use playverse_core::types::Role;
///
/// let premium = DiscountRate::from_bps(1000);
/// assert_eq!(discount_rate_for_role(Role::Premium, premium).bps(), 1000);
/// assert!(discount_rate_for_role(Role::Free, premium).is_zero());
/// ```
pub fn discount_rate_for_role(role: Role, premium_rate: DiscountRate) -> DiscountRate {
    match role {
        Role::Premium => premium_rate,
        Role::Free | Role::Admin => DiscountRate::zero(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_PREMIUM_DISCOUNT_BPS;

    #[test]
    fn test_compute_storefront_scenario() {
        // $19.99 at the default 10% premium discount
        let p = Pricing::compute(
            Money::from_cents(1999),
            DiscountRate::from_bps(DEFAULT_PREMIUM_DISCOUNT_BPS),
        );
        assert_eq!(p.base_cents, 1999);
        assert_eq!(p.discount_cents, 200); // 199.9¢ rounds up
        assert_eq!(p.final_cents, 1799);
    }

    #[test]
    fn test_compute_zero_rate() {
        let p = Pricing::compute(Money::from_cents(4999), DiscountRate::zero());
        assert_eq!(p.discount_cents, 0);
        assert_eq!(p.final_cents, 4999);
    }

    #[test]
    fn test_compute_invariant_holds_across_range() {
        // final == base - discount and final <= base, over a sweep of
        // amounts and rates
        for base in [0i64, 1, 25, 99, 1999, 4999, 123_456_789] {
            for bps in [0u32, 1, 250, 1000, 5000, 9000] {
                let p = Pricing::compute(Money::from_cents(base), DiscountRate::from_bps(bps));
                assert_eq!(p.final_cents, p.base_cents - p.discount_cents);
                assert!(p.final_cents <= p.base_cents);
                assert!(p.discount_cents >= 0);
            }
        }
    }

    #[test]
    fn test_compute_clamps_negative_base() {
        // Amounts clamp to zero; the requested rate is preserved on the
        // breakdown for the record.
        let p = Pricing::compute(Money::from_cents(-500), DiscountRate::from_bps(1000));
        assert_eq!(p.base_cents, 0);
        assert_eq!(p.discount_cents, 0);
        assert_eq!(p.final_cents, 0);
        assert_eq!(p.discount_rate_bps, 1000);
        assert!(p.is_free());
    }

    #[test]
    fn test_combine_sums_amounts() {
        let a = Pricing::compute(Money::from_cents(1999), DiscountRate::from_bps(1000));
        let b = Pricing::compute(Money::from_cents(3998), DiscountRate::from_bps(1000));
        let merged = a.combine(&b);

        assert_eq!(merged.base_cents, a.base_cents + b.base_cents);
        assert_eq!(merged.discount_cents, a.discount_cents + b.discount_cents);
        assert_eq!(merged.final_cents, a.final_cents + b.final_cents);
        assert_eq!(merged.final_cents, merged.base_cents - merged.discount_cents);
    }

    #[test]
    fn test_combine_is_commutative_on_amounts() {
        let a = Pricing::compute(Money::from_cents(1250), DiscountRate::from_bps(1000));
        let b = Pricing::compute(Money::from_cents(999), DiscountRate::zero());

        let ab = a.combine(&b);
        let ba = b.combine(&a);
        assert_eq!(ab.base_cents, ba.base_cents);
        assert_eq!(ab.discount_cents, ba.discount_cents);
        assert_eq!(ab.final_cents, ba.final_cents);
    }

    #[test]
    fn test_combine_keeps_nonzero_rate() {
        let discounted = Pricing::compute(Money::from_cents(1000), DiscountRate::from_bps(1000));
        let full_price = Pricing::compute(Money::from_cents(1000), DiscountRate::zero());

        // Whichever side has a rate, the merge keeps it
        assert_eq!(discounted.combine(&full_price).discount_rate_bps, 1000);
        assert_eq!(full_price.combine(&discounted).discount_rate_bps, 1000);
    }

    #[test]
    fn test_role_discounts() {
        let premium = DiscountRate::from_bps(DEFAULT_PREMIUM_DISCOUNT_BPS);
        assert_eq!(discount_rate_for_role(Role::Premium, premium).bps(), 1000);
        assert_eq!(discount_rate_for_role(Role::Free, premium).bps(), 0);
        assert_eq!(discount_rate_for_role(Role::Admin, premium).bps(), 0);
    }

    #[test]
    fn test_is_free() {
        assert!(Pricing::free().is_free());
        assert!(!Pricing::compute(Money::from_cents(1), DiscountRate::zero()).is_free());
    }
}
