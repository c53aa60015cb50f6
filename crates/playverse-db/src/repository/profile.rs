//! # Profile Repository
//!
//! Database operations for user profiles, including the conditional
//! downgrade write used by the plan-consistency sweep.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use playverse_core::{Profile, LIFETIME_PLAN};

/// Columns selected for a full profile row.
const PROFILE_COLUMNS: &str = "id, email, role, premium_plan, premium_expires_at, \
     premium_auto_renew, trial_ends_at, free_trial_used, created_at, updated_at";

/// Repository for profile operations.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Inserts a profile.
    pub async fn insert(&self, profile: &Profile) -> DbResult<()> {
        debug!(id = %profile.id, email = %profile.email, "Inserting profile");

        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, email, role, premium_plan, premium_expires_at,
                premium_auto_renew, trial_ends_at, free_trial_used,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(profile.role)
        .bind(&profile.premium_plan)
        .bind(profile.premium_expires_at)
        .bind(profile.premium_auto_renew)
        .bind(profile.trial_ends_at)
        .bind(profile.free_trial_used)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a profile by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Gets a profile by its business key (email).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Downgrades a profile whose premium plan has lapsed.
    ///
    /// This is a single conditional UPDATE: it only fires when a
    /// non-lifetime plan is present and its expiry is at or before `now`.
    /// Running it twice (or concurrently) is safe - the second write
    /// matches no row and reports `false`.
    ///
    /// ## Returns
    /// * `true` - the profile was downgraded by this call
    /// * `false` - nothing to do (no plan, lifetime, not yet expired, or
    ///   another sweep already won)
    pub async fn clear_lapsed_premium(&self, id: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                role = 'free',
                premium_plan = NULL,
                premium_expires_at = NULL,
                premium_auto_renew = 0,
                trial_ends_at = NULL,
                updated_at = ?2
            WHERE id = ?1
              AND premium_plan IS NOT NULL
              AND premium_plan != ?3
              AND premium_expires_at IS NOT NULL
              AND premium_expires_at <= ?2
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(LIFETIME_PLAN)
        .execute(&self.pool)
        .await?;

        let changed = result.rows_affected() > 0;
        if changed {
            info!(profile_id = %id, "Premium plan lapsed, profile downgraded");
        }

        Ok(changed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, Utc};
    use playverse_core::{Profile, Role};

    fn premium_profile(id: &str, plan: &str, expires_in_secs: i64) -> Profile {
        let now = Utc::now();
        Profile {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            role: Role::Premium,
            premium_plan: Some(plan.to_string()),
            premium_expires_at: Some(now + Duration::seconds(expires_in_secs)),
            premium_auto_renew: true,
            trial_ends_at: None,
            free_trial_used: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_and_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.profiles()
            .insert(&premium_profile("u1", "monthly", 3600))
            .await
            .unwrap();

        let by_id = db.profiles().get_by_id("u1").await.unwrap().unwrap();
        assert_eq!(by_id.role, Role::Premium);

        let by_email = db
            .profiles()
            .get_by_email("u1@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, "u1");
    }

    #[tokio::test]
    async fn test_clear_lapsed_premium_downgrades_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        db.profiles()
            .insert(&premium_profile("u1", "monthly", -60))
            .await
            .unwrap();

        // First sweep fires
        assert!(db.profiles().clear_lapsed_premium("u1", now).await.unwrap());

        let profile = db.profiles().get_by_id("u1").await.unwrap().unwrap();
        assert_eq!(profile.role, Role::Free);
        assert!(profile.premium_plan.is_none());
        assert!(profile.premium_expires_at.is_none());
        assert!(!profile.premium_auto_renew);

        // Second sweep is a no-op
        assert!(!db.profiles().clear_lapsed_premium("u1", now).await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_lapsed_premium_skips_active_and_lifetime() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        db.profiles()
            .insert(&premium_profile("active", "monthly", 3600))
            .await
            .unwrap();
        db.profiles()
            .insert(&premium_profile("forever", "lifetime", -3600))
            .await
            .unwrap();

        assert!(!db
            .profiles()
            .clear_lapsed_premium("active", now)
            .await
            .unwrap());
        assert!(!db
            .profiles()
            .clear_lapsed_premium("forever", now)
            .await
            .unwrap());

        // Untouched
        let forever = db.profiles().get_by_id("forever").await.unwrap().unwrap();
        assert_eq!(forever.role, Role::Premium);
        assert_eq!(forever.premium_plan.as_deref(), Some("lifetime"));
    }
}
