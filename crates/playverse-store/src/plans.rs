//! # Premium Plan Consistency Sweep
//!
//! Keeps a profile's premium state consistent with its expiry: whenever a
//! lapsed plan is observed, the profile downgrades to `free`, due
//! subscription rows flip to `expired` and the user gets one (deduplicated)
//! plan-expired notification.
//!
//! ## Sweep State Machine
//! ```text
//! plan_standing(now)
//!   ├── NotPremium  ──► Unchanged  (nothing to do)
//!   ├── Lifetime    ──► Unchanged  (never lapses)
//!   ├── Active      ──► Unchanged  (expiry still in the future)
//!   └── Lapsed      ──► conditional downgrade write
//!                         ├── 0 rows: a concurrent sweep already won
//!                         │          ──► Unchanged
//!                         └── 1 row: expire due subscriptions,
//!                                    notify once ──► Downgraded
//! ```
//!
//! The downgrade is a single conditional UPDATE, so overlapping sweeps for
//! the same user converge on one winner; a second invocation is always
//! `Unchanged`.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use playverse_core::{CoreError, NotificationKind, PlanStanding};
use playverse_db::Database;

use crate::error::StoreResult;
use crate::notify::Notifier;

/// Outcome of one plan sweep for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSweep {
    /// Plan state was already consistent.
    Unchanged,
    /// This call downgraded the profile.
    Downgraded,
}

/// Per-user plan consistency sweep, callable from any driver (request
/// handler, cron job, the `sweep` binary).
#[derive(Clone)]
pub struct PlanService {
    db: Database,
    notifier: Notifier,
}

impl PlanService {
    /// Creates a new PlanService.
    pub fn new(db: Database, notifier: Notifier) -> Self {
        PlanService { db, notifier }
    }

    /// Ensures plan consistency for a user id.
    pub async fn ensure_for_user(&self, user_id: &str) -> StoreResult<PlanSweep> {
        self.ensure_for_user_at(user_id, Utc::now()).await
    }

    /// Ensures plan consistency for a user looked up by email.
    pub async fn ensure_for_email(&self, email: &str) -> StoreResult<PlanSweep> {
        let profile = self
            .db
            .profiles()
            .get_by_email(email)
            .await?
            .ok_or_else(|| CoreError::ProfileNotFound(email.to_string()))?;

        self.ensure_for_user_at(&profile.id, Utc::now()).await
    }

    /// [`ensure_for_user`](Self::ensure_for_user) with an explicit clock,
    /// for deterministic tests.
    pub async fn ensure_for_user_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<PlanSweep> {
        let profile = self
            .db
            .profiles()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::ProfileNotFound(user_id.to_string()))?;

        match profile.plan_standing(now) {
            PlanStanding::NotPremium | PlanStanding::Lifetime | PlanStanding::Active => {
                debug!(user_id = %user_id, "Plan state consistent");
                Ok(PlanSweep::Unchanged)
            }

            PlanStanding::Lapsed => {
                let downgraded = self.db.profiles().clear_lapsed_premium(user_id, now).await?;
                if !downgraded {
                    // A concurrent sweep got there first
                    debug!(user_id = %user_id, "Lapsed plan already cleared");
                    return Ok(PlanSweep::Unchanged);
                }

                let expired_subs = self.db.subscriptions().expire_due(user_id, now).await?;
                info!(
                    user_id = %user_id,
                    expired_subscriptions = expired_subs,
                    "Premium plan swept"
                );

                self.notifier
                    .notify_once_at(
                        user_id,
                        NotificationKind::PlanExpired,
                        "Your premium plan has expired",
                        "Premium pricing no longer applies. Renew any time to get it back.",
                        None,
                        now,
                    )
                    .await?;

                Ok(PlanSweep::Downgraded)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Dispatcher, LogDelivery};
    use chrono::Duration;
    use playverse_core::{Profile, Role, Subscription, SubscriptionStatus};
    use playverse_db::DbConfig;
    use std::sync::Arc;
    use uuid::Uuid;

    async fn service() -> (Database, PlanService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (dispatcher, handle) = Dispatcher::new(Arc::new(LogDelivery));
        tokio::spawn(dispatcher.run());

        let notifier = Notifier::new(db.clone(), handle, Duration::minutes(10));
        let plans = PlanService::new(db.clone(), notifier);
        (db, plans)
    }

    fn profile(id: &str, plan: Option<&str>, expires_in_secs: Option<i64>) -> Profile {
        let now = Utc::now();
        Profile {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            role: if plan.is_some() { Role::Premium } else { Role::Free },
            premium_plan: plan.map(String::from),
            premium_expires_at: expires_in_secs.map(|s| now + Duration::seconds(s)),
            premium_auto_renew: plan.is_some(),
            trial_ends_at: None,
            free_trial_used: plan.is_some(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_sweep_downgrades_lapsed_then_is_idempotent() {
        let (db, plans) = service().await;
        let now = Utc::now();
        db.profiles()
            .insert(&profile("u1", Some("monthly"), Some(-60)))
            .await
            .unwrap();
        db.subscriptions()
            .insert(&Subscription {
                id: Uuid::new_v4().to_string(),
                user_id: "u1".into(),
                status: SubscriptionStatus::Active,
                expires_at: now - Duration::seconds(60),
                created_at: now - Duration::days(30),
                updated_at: now - Duration::days(30),
            })
            .await
            .unwrap();

        assert_eq!(
            plans.ensure_for_user_at("u1", now).await.unwrap(),
            PlanSweep::Downgraded
        );
        assert_eq!(
            plans.ensure_for_user_at("u1", now).await.unwrap(),
            PlanSweep::Unchanged
        );

        let swept = db.profiles().get_by_id("u1").await.unwrap().unwrap();
        assert_eq!(swept.role, Role::Free);
        assert!(swept.premium_plan.is_none());

        let subs = db.subscriptions().list_for_user("u1").await.unwrap();
        assert_eq!(subs[0].status, SubscriptionStatus::Expired);

        // Exactly one plan-expired notification despite two sweeps
        let notifications = db.notifications().list_for_user("u1").await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::PlanExpired);
    }

    #[tokio::test]
    async fn test_sweep_leaves_active_lifetime_and_free_alone() {
        let (db, plans) = service().await;
        let now = Utc::now();

        db.profiles()
            .insert(&profile("active", Some("monthly"), Some(3600)))
            .await
            .unwrap();
        db.profiles()
            .insert(&profile("forever", Some("lifetime"), None))
            .await
            .unwrap();
        db.profiles().insert(&profile("free", None, None)).await.unwrap();

        for id in ["active", "forever", "free"] {
            assert_eq!(
                plans.ensure_for_user_at(id, now).await.unwrap(),
                PlanSweep::Unchanged
            );
        }
    }

    #[tokio::test]
    async fn test_sweep_for_unknown_email_is_not_found() {
        let (_db, plans) = service().await;
        let err = plans.ensure_for_email("ghost@example.com").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::StoreError::Core(CoreError::ProfileNotFound(_))
        ));
    }
}
