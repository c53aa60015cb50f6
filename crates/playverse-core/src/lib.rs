//! # playverse-core: Pure Business Logic for the PlayVerse Backend
//!
//! This crate is the **heart** of the PlayVerse storefront backend. It
//! contains all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PlayVerse Backend Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront Frontend (TypeScript)                │   │
//! │  │    Catalog ──► Cart ──► Checkout ──► Library / Notifications   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              playverse-store (services, dispatch)               │   │
//! │  │    start_rental, purchase_game, ensure_for_user, notify_once   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ playverse-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │   Game    │  │   Money   │  │  Pricing  │  │   rules   │  │   │
//! │  │   │  Profile  │  │ Discount  │  │  combine  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 playverse-db (Database Layer)                   │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Game, Profile, Transaction, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Discount computation and breakdown merging
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use playverse_core::money::{DiscountRate, Money};
//! use playverse_core::pricing::Pricing;
//!
//! // Weekly rental price, from cents (never from floats!)
//! let base = Money::from_cents(1999); // $19.99
//!
//! // Premium members get 10% off (1000 basis points)
//! let pricing = Pricing::compute(base, DiscountRate::from_bps(1000));
//!
//! assert_eq!(pricing.discount_cents, 200);
//! assert_eq!(pricing.final_cents, 1799);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use playverse_core::Money` instead of
// `use playverse_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::{DiscountRate, Money};
pub use pricing::{discount_rate_for_role, Pricing};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default discount rate for premium-role users, in basis points (10%).
///
/// Overridable at deployment time via the `PREMIUM_DISCOUNT` environment
/// variable (a fraction, e.g. `0.15`), parsed by the store configuration.
pub const DEFAULT_PREMIUM_DISCOUNT_BPS: u32 = 1000;

/// Maximum discount rate accepted anywhere in the system (90%).
///
/// Rates above this are clamped, never rejected: a misconfigured discount
/// must not be able to make prices negative or free-by-accident.
pub const MAX_DISCOUNT_BPS: u32 = 9000;

/// Maximum number of weeks a single rental (or extension) may cover.
///
/// Prevents accidental over-ordering (e.g. typing 100 instead of 10) and
/// bounds the expiry arithmetic.
pub const MAX_RENTAL_WEEKS: i64 = 52;

/// Sentinel value of `Profile::premium_plan` for non-expiring plans.
///
/// A lifetime plan never lapses and is skipped by the consistency sweep.
pub const LIFETIME_PLAN: &str = "lifetime";

/// Default dedupe window for "ensure"-style notifications, in milliseconds
/// (10 minutes). Within this window, at most one notification of a given
/// kind is recorded per user.
pub const DEFAULT_NOTIFY_DEDUPE_MS: i64 = 600_000;

/// Number of days in one rental week.
pub const RENTAL_WEEK_DAYS: i64 = 7;
