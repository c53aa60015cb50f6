//! # Checkout Service
//!
//! Orchestrates rentals, extensions and purchases.
//!
//! ## Design
//! Every operation follows the same shape:
//!
//! 1. Validate input - aborts before any write
//! 2. Load game and profile - typed NotFound errors
//! 3. Compute pricing - pure, via [`Pricing::compute`] with the user's
//!    role-derived discount rate
//! 4. Conditional write - the database resolves duplicate-guard races
//! 5. Payment ledger row - append-only
//! 6. Enqueue email job - best-effort, never fails the checkout
//!
//! Once validation passes, the transaction and payment rows commit
//! unconditionally; email and push delivery are decoupled behind the
//! dispatch queue and never roll anything back.
//!
//! All methods have `*_at(.., now)` variants taking an explicit clock for
//! deterministic tests; the public wrappers use `Utc::now()`.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use playverse_core::validation::validate_rental_weeks;
use playverse_core::{
    discount_rate_for_role, rental_duration, CoreError, Game, Payment, PaymentStatus, Pricing,
    Profile, Transaction, TransactionKind,
};
use playverse_db::Database;

use crate::config::StoreConfig;
use crate::dispatch::{DispatchHandle, DispatchJob, ReceiptLine};
use crate::error::StoreResult;

/// Outcome of a cart checkout.
///
/// Items the user already owns (or that lose a concurrent insert race) are
/// reported in `skipped`, not as errors: a cart checkout succeeds with
/// whatever it could actually buy.
#[derive(Debug)]
pub struct CartOutcome {
    /// Purchases recorded by this checkout, in cart order.
    pub purchased: Vec<Transaction>,
    /// Game ids that were not bought: already owned, lost a race, or no
    /// longer purchasable.
    pub skipped: Vec<String>,
    /// Sum of the purchased items' final prices, in cents.
    pub total_cents: i64,
}

/// Service for rental and purchase checkout.
#[derive(Clone)]
pub struct CheckoutService {
    db: Database,
    config: StoreConfig,
    dispatch: DispatchHandle,
}

impl CheckoutService {
    /// Creates a new CheckoutService.
    pub fn new(db: Database, config: StoreConfig, dispatch: DispatchHandle) -> Self {
        CheckoutService {
            db,
            config,
            dispatch,
        }
    }

    // =========================================================================
    // Rentals
    // =========================================================================

    /// Starts a rental of `weeks` weeks.
    ///
    /// ## Rules
    /// - `weeks` must be in 1..=52
    /// - An unexpired rental for the same game → [`CoreError::AlreadyRentedActive`]
    /// - An expired rental row is replaced in place
    /// - A payment row is appended only when the final price is positive
    pub async fn start_rental(
        &self,
        user_id: &str,
        game_id: &str,
        weeks: i64,
    ) -> StoreResult<Transaction> {
        self.start_rental_at(user_id, game_id, weeks, Utc::now()).await
    }

    /// [`start_rental`](Self::start_rental) with an explicit clock.
    pub async fn start_rental_at(
        &self,
        user_id: &str,
        game_id: &str,
        weeks: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<Transaction> {
        validate_rental_weeks(weeks).map_err(CoreError::from)?;

        let game = self.sellable_game(game_id).await?;
        let profile = self.profile(user_id).await?;

        let rate = discount_rate_for_role(profile.role, self.config.premium_discount());
        let pricing = Pricing::compute(game.rental_base(weeks), rate);
        let expires_at = now + rental_duration(weeks);

        let fresh = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            game_id: game_id.to_string(),
            kind: TransactionKind::Rental,
            base_cents: pricing.base_cents,
            discount_rate_bps: pricing.discount_rate_bps,
            discount_cents: pricing.discount_cents,
            final_cents: pricing.final_cents,
            expires_at: Some(expires_at),
            created_at: now,
            updated_at: now,
        };

        let stored = self
            .db
            .transactions()
            .begin_rental(&fresh)
            .await?
            .ok_or_else(|| CoreError::AlreadyRentedActive {
                user_id: user_id.to_string(),
                game_id: game_id.to_string(),
            })?;

        if pricing.final_cents > 0 {
            self.record_payment(user_id, pricing.final_cents, now).await?;
        }

        info!(
            user_id = %user_id,
            game_id = %game_id,
            weeks,
            final_cents = pricing.final_cents,
            "Rental started"
        );

        self.dispatch.enqueue(DispatchJob::RentalConfirmation {
            user_id: user_id.to_string(),
            email: profile.email.clone(),
            game_title: game.title.clone(),
            weeks,
            final_cents: pricing.final_cents,
            expires_at: expires_at.to_rfc3339(),
        });

        Ok(stored)
    }

    /// Extends a rental by `weeks` weeks (creating one when absent).
    ///
    /// ## Rules
    /// - Pricing merges additively into the existing row
    /// - The expiry extends from `max(now, old expiry)`
    /// - A payment row for the incremental amount is **always** appended
    pub async fn extend_rental(
        &self,
        user_id: &str,
        game_id: &str,
        weeks: i64,
    ) -> StoreResult<Transaction> {
        self.extend_rental_at(user_id, game_id, weeks, Utc::now()).await
    }

    /// [`extend_rental`](Self::extend_rental) with an explicit clock.
    pub async fn extend_rental_at(
        &self,
        user_id: &str,
        game_id: &str,
        weeks: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<Transaction> {
        validate_rental_weeks(weeks).map_err(CoreError::from)?;

        let game = self.sellable_game(game_id).await?;
        let profile = self.profile(user_id).await?;

        let rate = discount_rate_for_role(profile.role, self.config.premium_discount());
        let delta = Pricing::compute(game.rental_base(weeks), rate);
        let extension = rental_duration(weeks);

        let fresh = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            game_id: game_id.to_string(),
            kind: TransactionKind::Rental,
            base_cents: delta.base_cents,
            discount_rate_bps: delta.discount_rate_bps,
            discount_cents: delta.discount_cents,
            final_cents: delta.final_cents,
            expires_at: Some(now + extension),
            created_at: now,
            updated_at: now,
        };

        let merged = self.db.transactions().extend_rental(&fresh, extension).await?;

        self.record_payment(user_id, delta.final_cents, now).await?;

        info!(
            user_id = %user_id,
            game_id = %game_id,
            weeks,
            final_cents = delta.final_cents,
            "Rental extended"
        );

        self.dispatch.enqueue(DispatchJob::RentalConfirmation {
            user_id: user_id.to_string(),
            email: profile.email.clone(),
            game_title: game.title.clone(),
            weeks,
            final_cents: delta.final_cents,
            expires_at: merged
                .expires_at
                .map(|e| e.to_rfc3339())
                .unwrap_or_default(),
        });

        Ok(merged)
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Purchases a single game.
    ///
    /// ## Rules
    /// - Owning the game already → [`CoreError::AlreadyOwned`]
    /// - On success the game is removed from the cart if present
    ///   (best-effort; a cart failure never undoes the purchase)
    pub async fn purchase_game(&self, user_id: &str, game_id: &str) -> StoreResult<Transaction> {
        self.purchase_game_at(user_id, game_id, Utc::now()).await
    }

    /// [`purchase_game`](Self::purchase_game) with an explicit clock.
    pub async fn purchase_game_at(
        &self,
        user_id: &str,
        game_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Transaction> {
        let game = self.sellable_game(game_id).await?;
        let profile = self.profile(user_id).await?;

        let rate = discount_rate_for_role(profile.role, self.config.premium_discount());
        let pricing = Pricing::compute(game.purchase_price(), rate);

        let purchase = self.purchase_row(user_id, game_id, &pricing, now);
        let recorded = self.db.transactions().record_purchase(&purchase).await?;
        if !recorded {
            return Err(CoreError::AlreadyOwned {
                user_id: user_id.to_string(),
                game_id: game_id.to_string(),
            }
            .into());
        }

        self.record_payment(user_id, pricing.final_cents, now).await?;

        // The purchase stands even if cart cleanup fails
        if let Err(e) = self.db.cart().remove(user_id, game_id).await {
            warn!(user_id = %user_id, game_id = %game_id, error = %e, "Cart cleanup failed");
        }

        info!(
            user_id = %user_id,
            game_id = %game_id,
            final_cents = pricing.final_cents,
            "Game purchased"
        );

        self.dispatch.enqueue(DispatchJob::PurchaseReceipt {
            user_id: user_id.to_string(),
            email: profile.email.clone(),
            game_title: game.title.clone(),
            final_cents: pricing.final_cents,
        });

        Ok(purchase)
    }

    /// Purchases a batch of games (cart checkout).
    ///
    /// ## Rules
    /// - Duplicate ids collapse, preserving first-seen order
    /// - Already-owned items, items losing an insert race and items no
    ///   longer purchasable are skipped, not errors
    /// - One aggregate payment row when at least one item was purchased
    /// - Matched cart rows clear regardless of per-item outcome
    /// - One itemized receipt email for the purchased items
    pub async fn purchase_cart(
        &self,
        user_id: &str,
        game_ids: &[String],
    ) -> StoreResult<CartOutcome> {
        self.purchase_cart_at(user_id, game_ids, Utc::now()).await
    }

    /// [`purchase_cart`](Self::purchase_cart) with an explicit clock.
    pub async fn purchase_cart_at(
        &self,
        user_id: &str,
        game_ids: &[String],
        now: DateTime<Utc>,
    ) -> StoreResult<CartOutcome> {
        let profile = self.profile(user_id).await?;
        let rate = discount_rate_for_role(profile.role, self.config.premium_discount());

        // Collapse duplicates, keep first-seen order
        let mut seen = HashSet::new();
        let ids: Vec<&String> = game_ids.iter().filter(|id| seen.insert(id.as_str())).collect();

        let owned: HashSet<String> = self
            .db
            .transactions()
            .purchased_game_ids(user_id)
            .await?
            .into_iter()
            .collect();

        let mut purchased = Vec::new();
        let mut skipped = Vec::new();
        let mut lines = Vec::new();
        let mut total_cents = 0i64;

        for game_id in ids {
            if owned.contains(game_id.as_str()) {
                skipped.push(game_id.clone());
                continue;
            }

            let game = match self.db.games().get_by_id(game_id).await? {
                Some(game) if game.is_active => game,
                _ => {
                    warn!(user_id = %user_id, game_id = %game_id, "Cart item not purchasable, skipped");
                    skipped.push(game_id.clone());
                    continue;
                }
            };

            let pricing = Pricing::compute(game.purchase_price(), rate);
            let purchase = self.purchase_row(user_id, game_id, &pricing, now);

            if self.db.transactions().record_purchase(&purchase).await? {
                total_cents += pricing.final_cents;
                lines.push(ReceiptLine {
                    game_title: game.title.clone(),
                    final_cents: pricing.final_cents,
                });
                purchased.push(purchase);
            } else {
                // Lost a concurrent insert race
                skipped.push(game_id.clone());
            }
        }

        if !purchased.is_empty() {
            self.record_payment(user_id, total_cents, now).await?;
        }

        // Clear matched cart rows whether or not each item bought
        let requested: Vec<String> = seen.iter().map(|s| s.to_string()).collect();
        if let Err(e) = self.db.cart().remove_many(user_id, &requested).await {
            warn!(user_id = %user_id, error = %e, "Cart cleanup failed");
        }

        info!(
            user_id = %user_id,
            purchased = purchased.len(),
            skipped = skipped.len(),
            total_cents,
            "Cart checkout complete"
        );

        if !purchased.is_empty() {
            self.dispatch.enqueue(DispatchJob::CartReceipt {
                user_id: user_id.to_string(),
                email: profile.email.clone(),
                lines,
                total_cents,
            });
        }

        Ok(CartOutcome {
            purchased,
            skipped,
            total_cents,
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn sellable_game(&self, game_id: &str) -> StoreResult<Game> {
        match self.db.games().get_by_id(game_id).await? {
            Some(game) if game.is_active => Ok(game),
            _ => Err(CoreError::GameNotFound(game_id.to_string()).into()),
        }
    }

    async fn profile(&self, user_id: &str) -> StoreResult<Profile> {
        self.db
            .profiles()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::ProfileNotFound(user_id.to_string()).into())
    }

    fn purchase_row(
        &self,
        user_id: &str,
        game_id: &str,
        pricing: &Pricing,
        now: DateTime<Utc>,
    ) -> Transaction {
        Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            game_id: game_id.to_string(),
            kind: TransactionKind::Purchase,
            base_cents: pricing.base_cents,
            discount_rate_bps: pricing.discount_rate_bps,
            discount_cents: pricing.discount_cents,
            final_cents: pricing.final_cents,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn record_payment(
        &self,
        user_id: &str,
        amount_cents: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.db
            .transactions()
            .add_payment(&Payment {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                amount_cents,
                currency: self.config.currency.clone(),
                status: PaymentStatus::Completed,
                provider: self.config.provider.clone(),
                created_at: now,
            })
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
