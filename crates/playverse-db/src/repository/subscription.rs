//! # Subscription Repository
//!
//! Database operations for premium subscription records. The plan sweep
//! patches due rows to `expired` alongside the profile downgrade.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use playverse_core::Subscription;

/// Columns selected for a full subscription row.
const SUBSCRIPTION_COLUMNS: &str = "id, user_id, status, expires_at, created_at, updated_at";

/// Repository for subscription operations.
#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
    pool: SqlitePool,
}

impl SubscriptionRepository {
    /// Creates a new SubscriptionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SubscriptionRepository { pool }
    }

    /// Inserts a subscription record.
    pub async fn insert(&self, sub: &Subscription) -> DbResult<()> {
        debug!(user_id = %sub.user_id, status = ?sub.status, "Inserting subscription");

        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, status, expires_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&sub.id)
        .bind(&sub.user_id)
        .bind(sub.status)
        .bind(sub.expires_at)
        .bind(sub.created_at)
        .bind(sub.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists a user's subscription records, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Subscription>> {
        let subs = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE user_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    /// Marks a user's due subscriptions as expired.
    ///
    /// A conditional UPDATE like the profile downgrade: only `active` rows
    /// whose expiry is at or before `now` change. Returns how many did.
    pub async fn expire_due(&self, user_id: &str, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = 'expired',
                updated_at = ?2
            WHERE user_id = ?1
              AND status = 'active'
              AND expires_at <= ?2
            "#,
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, Utc};
    use playverse_core::{Profile, Role, Subscription, SubscriptionStatus};
    use uuid::Uuid;

    async fn db_with_user() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        db.profiles()
            .insert(&Profile {
                id: "u1".into(),
                email: "u1@example.com".into(),
                role: Role::Premium,
                premium_plan: Some("monthly".into()),
                premium_expires_at: Some(now + Duration::days(30)),
                premium_auto_renew: true,
                trial_ends_at: None,
                free_trial_used: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        db
    }

    fn sub(expires_in_secs: i64) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4().to_string(),
            user_id: "u1".into(),
            status: SubscriptionStatus::Active,
            expires_at: now + Duration::seconds(expires_in_secs),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_expire_due_patches_only_lapsed_rows() {
        let db = db_with_user().await;
        let now = Utc::now();

        db.subscriptions().insert(&sub(-60)).await.unwrap();
        db.subscriptions().insert(&sub(3600)).await.unwrap();

        assert_eq!(db.subscriptions().expire_due("u1", now).await.unwrap(), 1);
        // Idempotent
        assert_eq!(db.subscriptions().expire_due("u1", now).await.unwrap(), 0);

        let subs = db.subscriptions().list_for_user("u1").await.unwrap();
        let expired = subs
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Expired)
            .count();
        assert_eq!(subs.len(), 2);
        assert_eq!(expired, 1);
    }
}
