//! # Transaction Repository
//!
//! Database operations for rentals, purchases and the payment ledger.
//!
//! ## Rental Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Rental Lifecycle                                   │
//! │                                                                         │
//! │  1. START                                                              │
//! │     └── begin_rental() → row with pricing + expires_at                 │
//! │         • no row yet            → insert                               │
//! │         • expired row exists    → overwrite in place (re-rent)         │
//! │         • active row exists     → REJECTED (no rows change)            │
//! │                                                                         │
//! │  2. EXTEND                                                             │
//! │     └── extend_rental() → merge pricing, push expiry out               │
//! │         • expires_at = max(now, old expires_at) + extension            │
//! │                                                                         │
//! │  3. EXPIRE (implicit)                                                  │
//! │     └── expires_at passes; the row stays as history                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Closing the Duplicate-Guard Race
//! A read-then-insert guard ("no active rental / not already owned") lets
//! two concurrent checkouts both pass the check. Here
//! `UNIQUE(user_id, game_id, kind)` plus conditional upserts make the
//! database the referee: exactly one of two racers wins, the other sees
//! zero affected rows.

use chrono::Duration;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use playverse_core::{Payment, Transaction};

/// Columns selected for a full transaction row.
const TX_COLUMNS: &str = "id, user_id, game_id, kind, base_cents, discount_rate_bps, \
     discount_cents, final_cents, expires_at, created_at, updated_at";

/// Repository for rental/purchase transactions and payments.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Gets the rental row for (user, game), if any (active or expired).
    pub async fn get_rental(&self, user_id: &str, game_id: &str) -> DbResult<Option<Transaction>> {
        let tx = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions \
             WHERE user_id = ?1 AND game_id = ?2 AND kind = 'rental'"
        ))
        .bind(user_id)
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tx)
    }

    /// Gets the purchase row for (user, game), if any.
    pub async fn get_purchase(
        &self,
        user_id: &str,
        game_id: &str,
    ) -> DbResult<Option<Transaction>> {
        let tx = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions \
             WHERE user_id = ?1 AND game_id = ?2 AND kind = 'purchase'"
        ))
        .bind(user_id)
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tx)
    }

    /// Starts a rental: insert, or overwrite an *expired* rental in place.
    ///
    /// The conditional upsert is the whole guard: when an unexpired rental
    /// row exists the `WHERE` clause fails, no row changes, and `None` is
    /// returned for the caller to map to `AlreadyRentedActive`.
    ///
    /// ## Returns
    /// The resulting rental row (which keeps the original row id when an
    /// expired rental was overwritten), or `None` when blocked.
    pub async fn begin_rental(&self, fresh: &Transaction) -> DbResult<Option<Transaction>> {
        debug!(
            user_id = %fresh.user_id,
            game_id = %fresh.game_id,
            final_cents = fresh.final_cents,
            "Beginning rental"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, game_id, kind, base_cents, discount_rate_bps,
                discount_cents, final_cents, expires_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, 'rental', ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT (user_id, game_id, kind) DO UPDATE SET
                base_cents = excluded.base_cents,
                discount_rate_bps = excluded.discount_rate_bps,
                discount_cents = excluded.discount_cents,
                final_cents = excluded.final_cents,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            WHERE transactions.expires_at <= excluded.created_at
            "#,
        )
        .bind(&fresh.id)
        .bind(&fresh.user_id)
        .bind(&fresh.game_id)
        .bind(fresh.base_cents)
        .bind(fresh.discount_rate_bps)
        .bind(fresh.discount_cents)
        .bind(fresh.final_cents)
        .bind(fresh.expires_at)
        .bind(fresh.created_at)
        .bind(fresh.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_rental(&fresh.user_id, &fresh.game_id).await
    }

    /// Extends a rental (or creates one when none exists).
    ///
    /// Pricing merges additively; the expiry extends from whichever is
    /// later, now or the previous expiry. Runs inside one database
    /// transaction so the read-merge-write is not interleaved with another
    /// extension.
    pub async fn extend_rental(
        &self,
        fresh: &Transaction,
        extension: Duration,
    ) -> DbResult<Transaction> {
        let mut db_tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions \
             WHERE user_id = ?1 AND game_id = ?2 AND kind = 'rental'"
        ))
        .bind(&fresh.user_id)
        .bind(&fresh.game_id)
        .fetch_optional(&mut *db_tx)
        .await?;

        let merged = match existing {
            None => {
                debug!(
                    user_id = %fresh.user_id,
                    game_id = %fresh.game_id,
                    "No rental to extend, creating"
                );

                sqlx::query(
                    r#"
                    INSERT INTO transactions (
                        id, user_id, game_id, kind, base_cents, discount_rate_bps,
                        discount_cents, final_cents, expires_at, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, 'rental', ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                )
                .bind(&fresh.id)
                .bind(&fresh.user_id)
                .bind(&fresh.game_id)
                .bind(fresh.base_cents)
                .bind(fresh.discount_rate_bps)
                .bind(fresh.discount_cents)
                .bind(fresh.final_cents)
                .bind(fresh.expires_at)
                .bind(fresh.created_at)
                .bind(fresh.updated_at)
                .execute(&mut *db_tx)
                .await?;

                fresh.clone()
            }

            Some(row) => {
                let now = fresh.created_at;
                let pricing = row.pricing().combine(&fresh.pricing());

                // An expired rental extends from now, a live one from its
                // current expiry
                let anchor = row.expires_at.filter(|e| *e > now).unwrap_or(now);
                let expires_at = anchor + extension;

                debug!(
                    user_id = %fresh.user_id,
                    game_id = %fresh.game_id,
                    expires_at = %expires_at,
                    "Extending rental"
                );

                sqlx::query(
                    r#"
                    UPDATE transactions SET
                        base_cents = ?2,
                        discount_rate_bps = ?3,
                        discount_cents = ?4,
                        final_cents = ?5,
                        expires_at = ?6,
                        updated_at = ?7
                    WHERE id = ?1
                    "#,
                )
                .bind(&row.id)
                .bind(pricing.base_cents)
                .bind(pricing.discount_rate_bps)
                .bind(pricing.discount_cents)
                .bind(pricing.final_cents)
                .bind(expires_at)
                .bind(now)
                .execute(&mut *db_tx)
                .await?;

                Transaction {
                    base_cents: pricing.base_cents,
                    discount_rate_bps: pricing.discount_rate_bps,
                    discount_cents: pricing.discount_cents,
                    final_cents: pricing.final_cents,
                    expires_at: Some(expires_at),
                    updated_at: now,
                    ..row
                }
            }
        };

        db_tx.commit().await?;
        Ok(merged)
    }

    /// Records a purchase.
    ///
    /// ## Returns
    /// * `true` - purchase recorded by this call
    /// * `false` - the user already owns this game (the unique constraint
    ///   absorbed the insert, including under concurrent checkouts)
    pub async fn record_purchase(&self, purchase: &Transaction) -> DbResult<bool> {
        debug!(
            user_id = %purchase.user_id,
            game_id = %purchase.game_id,
            final_cents = purchase.final_cents,
            "Recording purchase"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, game_id, kind, base_cents, discount_rate_bps,
                discount_cents, final_cents, expires_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, 'purchase', ?4, ?5, ?6, ?7, NULL, ?8, ?9)
            ON CONFLICT (user_id, game_id, kind) DO NOTHING
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.user_id)
        .bind(&purchase.game_id)
        .bind(purchase.base_cents)
        .bind(purchase.discount_rate_bps)
        .bind(purchase.discount_cents)
        .bind(purchase.final_cents)
        .bind(purchase.created_at)
        .bind(purchase.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the ids of games this user has purchased.
    pub async fn purchased_game_ids(&self, user_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT game_id FROM transactions WHERE user_id = ?1 AND kind = 'purchase'",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Appends a payment ledger row.
    pub async fn add_payment(&self, payment: &Payment) -> DbResult<()> {
        debug!(
            user_id = %payment.user_id,
            amount_cents = payment.amount_cents,
            "Recording payment"
        );

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, amount_cents, currency, status, provider, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.user_id)
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(payment.status)
        .bind(&payment.provider)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists all payments for a user, oldest first.
    pub async fn payments_for_user(&self, user_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT id, user_id, amount_cents, currency, status, provider, created_at \
             FROM payments WHERE user_id = ?1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Gets the total amount a user has paid, in cents.
    pub async fn total_paid_cents(&self, user_id: &str) -> DbResult<i64> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(amount_cents) FROM payments WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total.unwrap_or(0))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::{DateTime, Duration, Utc};
    use playverse_core::{
        Game, GamePlan, Payment, PaymentStatus, Profile, Role, Transaction, TransactionKind,
    };
    use uuid::Uuid;

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        db.profiles()
            .insert(&Profile {
                id: "u1".into(),
                email: "u1@example.com".into(),
                role: Role::Free,
                premium_plan: None,
                premium_expires_at: None,
                premium_auto_renew: false,
                trial_ends_at: None,
                free_trial_used: false,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        db.games()
            .insert(&Game {
                id: "g1".into(),
                title: "Star Drifter".into(),
                plan: GamePlan::Free,
                purchase_price_cents: 4999,
                weekly_price_cents: 1999,
                description: None,
                embed_url: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        db
    }

    fn rental(now: DateTime<Utc>, expires_at: DateTime<Utc>, final_cents: i64) -> Transaction {
        Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: "u1".into(),
            game_id: "g1".into(),
            kind: TransactionKind::Rental,
            base_cents: final_cents,
            discount_rate_bps: 0,
            discount_cents: 0,
            final_cents,
            expires_at: Some(expires_at),
            created_at: now,
            updated_at: now,
        }
    }

    fn purchase(now: DateTime<Utc>, final_cents: i64) -> Transaction {
        Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: "u1".into(),
            game_id: "g1".into(),
            kind: TransactionKind::Purchase,
            base_cents: final_cents,
            discount_rate_bps: 0,
            discount_cents: 0,
            final_cents,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_begin_rental_blocks_active() {
        let db = seeded_db().await;
        let now = Utc::now();

        let first = rental(now, now + Duration::days(7), 1999);
        let row = db.transactions().begin_rental(&first).await.unwrap();
        assert!(row.is_some());

        // Active rental present: second attempt changes nothing
        let second = rental(now, now + Duration::days(14), 3998);
        assert!(db.transactions().begin_rental(&second).await.unwrap().is_none());

        // The original row is untouched
        let stored = db.transactions().get_rental("u1", "g1").await.unwrap().unwrap();
        assert_eq!(stored.final_cents, 1999);
    }

    #[tokio::test]
    async fn test_begin_rental_overwrites_expired() {
        let db = seeded_db().await;
        let now = Utc::now();

        let expired = rental(now - Duration::days(30), now - Duration::days(23), 1999);
        db.transactions().begin_rental(&expired).await.unwrap().unwrap();

        let renewed = rental(now, now + Duration::days(7), 3998);
        let row = db.transactions().begin_rental(&renewed).await.unwrap().unwrap();

        // Overwritten in place: original row id survives, pricing is new
        assert_eq!(row.id, expired.id);
        assert_eq!(row.final_cents, 3998);
        assert!(row.is_active_rental(now));
    }

    #[tokio::test]
    async fn test_extend_rental_merges_and_pushes_expiry() {
        let db = seeded_db().await;
        let now = Utc::now();
        let old_expiry = now + Duration::days(3);

        let first = rental(now - Duration::days(4), old_expiry, 1999);
        db.transactions().begin_rental(&first).await.unwrap().unwrap();

        let delta = rental(now, now + Duration::days(14), 3998);
        let merged = db
            .transactions()
            .extend_rental(&delta, Duration::days(14))
            .await
            .unwrap();

        // Amounts accumulate, expiry extends from the old (future) expiry
        assert_eq!(merged.base_cents, 1999 + 3998);
        assert_eq!(merged.final_cents, 1999 + 3998);
        let expected = old_expiry + Duration::days(14);
        let drift = (merged.expires_at.unwrap() - expected).num_milliseconds().abs();
        assert!(drift < 10, "expiry drifted by {drift}ms");
    }

    #[tokio::test]
    async fn test_extend_rental_expired_extends_from_now() {
        let db = seeded_db().await;
        let now = Utc::now();

        let lapsed = rental(now - Duration::days(30), now - Duration::days(23), 1999);
        db.transactions().begin_rental(&lapsed).await.unwrap().unwrap();

        let delta = rental(now, now + Duration::days(14), 3998);
        let merged = db
            .transactions()
            .extend_rental(&delta, Duration::days(14))
            .await
            .unwrap();

        let expected = now + Duration::days(14);
        let drift = (merged.expires_at.unwrap() - expected).num_milliseconds().abs();
        assert!(drift < 10, "expiry drifted by {drift}ms");
    }

    #[tokio::test]
    async fn test_extend_rental_creates_when_absent() {
        let db = seeded_db().await;
        let now = Utc::now();

        let delta = rental(now, now + Duration::days(14), 3998);
        let created = db
            .transactions()
            .extend_rental(&delta, Duration::days(14))
            .await
            .unwrap();

        assert_eq!(created.id, delta.id);
        assert_eq!(created.final_cents, 3998);
    }

    #[tokio::test]
    async fn test_record_purchase_once() {
        let db = seeded_db().await;
        let now = Utc::now();

        assert!(db.transactions().record_purchase(&purchase(now, 4999)).await.unwrap());
        // Second purchase of the same game is absorbed
        assert!(!db.transactions().record_purchase(&purchase(now, 4999)).await.unwrap());

        let ids = db.transactions().purchased_game_ids("u1").await.unwrap();
        assert_eq!(ids, vec!["g1".to_string()]);
    }

    #[tokio::test]
    async fn test_payments_ledger() {
        let db = seeded_db().await;
        let now = Utc::now();

        for amount in [1799i64, 4999] {
            db.transactions()
                .add_payment(&Payment {
                    id: Uuid::new_v4().to_string(),
                    user_id: "u1".into(),
                    amount_cents: amount,
                    currency: "USD".into(),
                    status: PaymentStatus::Completed,
                    provider: "playverse".into(),
                    created_at: now,
                })
                .await
                .unwrap();
        }

        let payments = db.transactions().payments_for_user("u1").await.unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(db.transactions().total_paid_cents("u1").await.unwrap(), 6798);
        assert_eq!(db.transactions().total_paid_cents("nobody").await.unwrap(), 0);
    }
}
