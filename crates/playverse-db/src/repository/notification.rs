//! # Notification Repository
//!
//! Database operations for in-app notifications, including the
//! dedupe-window write used by `Notifier::notify_once`.

use chrono::Duration;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use playverse_core::{Notification, NotificationKind};

/// Columns selected for a full notification row.
const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, message, is_read, game_id, meta, created_at";

/// Outcome of a deduplicated notification write.
///
/// `id` always names a stored row: the fresh one when inserted, the prior
/// row inside the window when skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyWrite {
    /// Id of the effective notification row.
    pub id: String,
    /// True when a recent duplicate suppressed the insert.
    pub skipped: bool,
}

/// Repository for notification operations.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Inserts a notification unconditionally.
    pub async fn insert(&self, n: &Notification) -> DbResult<()> {
        debug!(user_id = %n.user_id, kind = ?n.kind, "Inserting notification");

        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, kind, title, message, is_read, game_id, meta, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&n.id)
        .bind(&n.user_id)
        .bind(n.kind)
        .bind(&n.title)
        .bind(&n.message)
        .bind(n.is_read)
        .bind(&n.game_id)
        .bind(&n.meta)
        .bind(n.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a notification unless the same (user, kind) was written
    /// within the dedupe window ending at `n.created_at`.
    ///
    /// Check and insert run inside one database transaction, so two
    /// concurrent writers cannot both slip past the window check.
    pub async fn insert_unless_recent(
        &self,
        n: &Notification,
        window: Duration,
    ) -> DbResult<NotifyWrite> {
        let mut db_tx = self.pool.begin().await?;

        let cutoff = n.created_at - window;
        let recent: Option<String> = sqlx::query_scalar(
            "SELECT id FROM notifications \
             WHERE user_id = ?1 AND kind = ?2 AND created_at > ?3 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(&n.user_id)
        .bind(n.kind)
        .bind(cutoff)
        .fetch_optional(&mut *db_tx)
        .await?;

        if let Some(prior_id) = recent {
            db_tx.commit().await?;
            debug!(
                user_id = %n.user_id,
                kind = ?n.kind,
                prior_id = %prior_id,
                "Duplicate notification suppressed"
            );
            return Ok(NotifyWrite {
                id: prior_id,
                skipped: true,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, kind, title, message, is_read, game_id, meta, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&n.id)
        .bind(&n.user_id)
        .bind(n.kind)
        .bind(&n.title)
        .bind(&n.message)
        .bind(n.is_read)
        .bind(&n.game_id)
        .bind(&n.meta)
        .bind(n.created_at)
        .execute(&mut *db_tx)
        .await?;

        db_tx.commit().await?;

        Ok(NotifyWrite {
            id: n.id.clone(),
            skipped: false,
        })
    }

    /// Gets the most recent notification of a kind for a user.
    pub async fn latest_of_kind(
        &self,
        user_id: &str,
        kind: NotificationKind,
    ) -> DbResult<Option<Notification>> {
        let n = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = ?1 AND kind = ?2 \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        Ok(n)
    }

    /// Lists all notifications for a user, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Marks a notification as read. Returns false when the id is unknown.
    pub async fn mark_read(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
