//! # Deduplicated Notifications
//!
//! `Notifier::notify_once` writes at most one notification of a kind per
//! user within the configured dedupe window. The sweep and "ensure"-style
//! paths can fire repeatedly (page loads, retries, overlapping drivers)
//! without spamming the user.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use playverse_core::{Notification, NotificationKind};
use playverse_db::{Database, NotifyWrite};

use crate::dispatch::{DispatchHandle, DispatchJob};
use crate::error::StoreResult;

/// Writes deduplicated notifications and enqueues pushes for fresh ones.
#[derive(Clone)]
pub struct Notifier {
    db: Database,
    dispatch: DispatchHandle,
    dedupe_window: Duration,
}

impl Notifier {
    /// Creates a notifier with the given dedupe window.
    pub fn new(db: Database, dispatch: DispatchHandle, dedupe_window: Duration) -> Self {
        Notifier {
            db,
            dispatch,
            dedupe_window,
        }
    }

    /// Records a notification unless a duplicate exists within the window.
    ///
    /// When a row is actually inserted, a push job goes on the dispatch
    /// queue (best-effort). A suppressed duplicate enqueues nothing and
    /// reports the prior row's id with `skipped = true`.
    pub async fn notify_once(
        &self,
        user_id: &str,
        kind: NotificationKind,
        title: &str,
        message: &str,
        game_id: Option<&str>,
    ) -> StoreResult<NotifyWrite> {
        self.notify_once_at(user_id, kind, title, message, game_id, Utc::now())
            .await
    }

    /// [`notify_once`](Self::notify_once) with an explicit clock, for
    /// deterministic tests.
    pub async fn notify_once_at(
        &self,
        user_id: &str,
        kind: NotificationKind,
        title: &str,
        message: &str,
        game_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<NotifyWrite> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            title: title.to_string(),
            message: message.to_string(),
            is_read: false,
            game_id: game_id.map(String::from),
            meta: None,
            created_at: now,
        };

        let wrote = self
            .db
            .notifications()
            .insert_unless_recent(&notification, self.dedupe_window)
            .await?;

        if wrote.skipped {
            debug!(user_id = %user_id, kind = ?kind, "Notification deduplicated");
        } else {
            self.dispatch.enqueue(DispatchJob::Push {
                user_id: user_id.to_string(),
                notification_id: wrote.id.clone(),
                title: title.to_string(),
                message: message.to_string(),
            });
        }

        Ok(wrote)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::test_support::CapturingDelivery;
    use crate::dispatch::Dispatcher;
    use chrono::Utc;
    use playverse_core::{Profile, Role};
    use playverse_db::DbConfig;
    use std::sync::Arc;

    async fn setup() -> (Database, Notifier, Arc<CapturingDelivery>, tokio::task::JoinHandle<()>, DispatchHandle)
    {
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

        let delivery = Arc::new(CapturingDelivery::default());
        let (dispatcher, handle) = Dispatcher::new(delivery.clone());
        let worker = tokio::spawn(dispatcher.run());

        let notifier = Notifier::new(db.clone(), handle.clone(), Duration::minutes(10));
        (db, notifier, delivery, worker, handle)
    }

    #[tokio::test]
    async fn test_notify_once_dedupes_and_pushes_once() {
        let (db, notifier, delivery, worker, handle) = setup().await;
        let now = Utc::now();

        let first = notifier
            .notify_once_at(
                "u1",
                NotificationKind::PlanExpired,
                "Premium expired",
                "Your premium plan has ended.",
                None,
                now,
            )
            .await
            .unwrap();
        assert!(!first.skipped);

        let second = notifier
            .notify_once_at(
                "u1",
                NotificationKind::PlanExpired,
                "Premium expired",
                "Your premium plan has ended.",
                None,
                now + Duration::minutes(1),
            )
            .await
            .unwrap();
        assert!(second.skipped);
        assert_eq!(second.id, first.id);

        // Exactly one row, exactly one push job
        assert_eq!(db.notifications().list_for_user("u1").await.unwrap().len(), 1);

        handle.shutdown().await;
        worker.await.unwrap();
        let jobs = delivery.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert!(matches!(&jobs[0], DispatchJob::Push { notification_id, .. } if *notification_id == first.id));
    }
}
