//! # Domain Types
//!
//! Core domain types used throughout the PlayVerse backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Game       │   │   Transaction   │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  plan           │   │  kind           │   │  amount_cents   │       │
//! │  │  weekly_price   │   │  pricing fields │   │  currency       │       │
//! │  │  purchase_price │   │  expires_at     │   │  provider       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Profile      │   │  Notification   │   │  Subscription   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  role           │   │  kind           │   │  status         │       │
//! │  │  premium_plan   │   │  is_read        │   │  expires_at     │       │
//! │  │  premium_expiry │   │  dedup window   │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has an `id`: UUID v4, immutable, used for database relations.
//! Profiles additionally carry a unique business key (`email`).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::Pricing;
use crate::{LIFETIME_PLAN, RENTAL_WEEK_DAYS};

// =============================================================================
// Game
// =============================================================================

/// A game's access tier on the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GamePlan {
    /// Playable by everyone.
    Free,
    /// Requires a premium profile (or an explicit rental/purchase).
    Premium,
}

/// A game available for rental or purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Game {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display title shown in the catalog and on receipts.
    pub title: String,

    /// Access tier.
    pub plan: GamePlan,

    /// One-time purchase price in cents.
    pub purchase_price_cents: i64,

    /// Weekly rental price in cents.
    pub weekly_price_cents: i64,

    /// Optional description for the detail page.
    pub description: Option<String>,

    /// Embed URL for the in-browser player.
    pub embed_url: Option<String>,

    /// Whether the game is listed (soft delete).
    pub is_active: bool,

    /// When the game was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the game was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Game {
    /// Returns the purchase price as a Money type.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// Returns the weekly rental price as a Money type.
    #[inline]
    pub fn weekly_price(&self) -> Money {
        Money::from_cents(self.weekly_price_cents)
    }

    /// Rental base price for a number of weeks.
    #[inline]
    pub fn rental_base(&self, weeks: i64) -> Money {
        self.weekly_price() * weeks
    }
}

// =============================================================================
// Profile
// =============================================================================

/// A user profile's subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Default tier.
    Free,
    /// Paying member; gets the premium discount and premium catalog access.
    Premium,
    /// Staff. No discount - admins buy at full price.
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::Free
    }
}

/// Where a profile stands relative to its premium plan at a point in time.
///
/// This is the pure decision at the heart of the plan-consistency sweep;
/// the service layer acts on it, the database enforces it conditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStanding {
    /// No premium plan on record.
    NotPremium,
    /// Lifetime plan - never expires, never swept.
    Lifetime,
    /// Plan present and not yet expired (or has no expiry date).
    Active,
    /// Plan present and expired; the profile should be downgraded.
    Lapsed,
}

/// A user profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Profile {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier - unique login email.
    pub email: String,

    /// Subscription tier.
    pub role: Role,

    /// Purchased premium plan name (e.g. "monthly", "yearly", "lifetime").
    pub premium_plan: Option<String>,

    /// When the premium plan lapses. `None` for plans without an expiry.
    #[ts(as = "Option<String>")]
    pub premium_expires_at: Option<DateTime<Utc>>,

    /// Whether the plan renews automatically.
    pub premium_auto_renew: bool,

    /// End of the free trial, if one is running.
    #[ts(as = "Option<String>")]
    pub trial_ends_at: Option<DateTime<Utc>>,

    /// Whether the one-off free trial has been consumed.
    pub free_trial_used: bool,

    /// When the profile was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Evaluates this profile's plan standing at `now`.
    ///
    /// ## State Machine
    /// ```text
    /// no plan ─────────────────────────► NotPremium (no-op for the sweep)
    /// plan == "lifetime" ──────────────► Lifetime   (no-op for the sweep)
    /// plan, expiry > now or no expiry ─► Active     (no-op for the sweep)
    /// plan, expiry <= now ─────────────► Lapsed     (downgrade)
    /// ```
    pub fn plan_standing(&self, now: DateTime<Utc>) -> PlanStanding {
        let Some(plan) = self.premium_plan.as_deref() else {
            return PlanStanding::NotPremium;
        };

        if plan == LIFETIME_PLAN {
            return PlanStanding::Lifetime;
        }

        match self.premium_expires_at {
            Some(expires_at) if expires_at <= now => PlanStanding::Lapsed,
            _ => PlanStanding::Active,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// The kind of access a transaction grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Time-boxed play access until `expires_at`.
    Rental,
    /// Permanent play access.
    Purchase,
}

/// A rental or purchase record.
///
/// At most one row exists per (user, game, kind): a rental extension merges
/// into the existing row instead of creating a second one, and the database
/// enforces the uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub game_id: String,
    pub kind: TransactionKind,
    /// Accumulated undiscounted amount in cents.
    pub base_cents: i64,
    /// Discount rate applied, in basis points.
    pub discount_rate_bps: u32,
    /// Accumulated discount amount in cents.
    pub discount_cents: i64,
    /// Accumulated charged amount in cents.
    pub final_cents: i64,
    /// Rental expiry. `None` for purchases.
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the pricing breakdown recorded on this row.
    #[inline]
    pub const fn pricing(&self) -> Pricing {
        Pricing {
            base_cents: self.base_cents,
            discount_rate_bps: self.discount_rate_bps,
            discount_cents: self.discount_cents,
            final_cents: self.final_cents,
        }
    }

    /// Whether this is a rental that still grants access at `now`.
    pub fn is_active_rental(&self, now: DateTime<Utc>) -> bool {
        self.kind == TransactionKind::Rental
            && matches!(self.expires_at, Some(expires_at) if expires_at > now)
    }
}

/// The duration covered by a number of rental weeks.
#[inline]
pub fn rental_duration(weeks: i64) -> Duration {
    Duration::days(weeks * RENTAL_WEEK_DAYS)
}

// =============================================================================
// Payment
// =============================================================================

/// Payment ledger row status.
///
/// The ledger is append-only; checkout writes rows as `Completed` since the
/// money state is committed unconditionally once validation passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Refunded,
}

/// An append-only payment ledger row, one per checkout charge.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    /// Amount charged in cents.
    pub amount_cents: i64,
    /// ISO currency code, e.g. "USD".
    pub currency: String,
    pub status: PaymentStatus,
    /// Payment provider label.
    pub provider: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Notification
// =============================================================================

/// The kinds of user notifications the backend emits.
///
/// Wire names are kebab-case ("plan-expired") to match the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    /// Premium plan lapsed and the profile was downgraded.
    PlanExpired,
    /// Rental started or extended.
    RentalConfirmed,
    /// Single-game purchase completed.
    PurchaseReceipt,
    /// Cart purchase completed.
    CartReceipt,
}

/// A user notification.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    /// Game this notification refers to, if any.
    pub game_id: Option<String>,
    /// Optional JSON metadata blob.
    pub meta: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Subscription
// =============================================================================

/// Premium subscription row status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Expired,
}

/// A premium subscription record, patched to `Expired` by the plan sweep.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub status: SubscriptionStatus,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Cart
// =============================================================================

/// A game sitting in a user's cart, unique per (user, game).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartItem {
    pub id: String,
    pub user_id: String,
    pub game_id: String,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
