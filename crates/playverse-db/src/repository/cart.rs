//! # Cart Repository
//!
//! Database operations for the per-user cart. `UNIQUE(user_id, game_id)`
//! makes adding the same game twice a no-op.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use playverse_core::CartItem;

/// Repository for cart operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Adds a game to the cart. Returns false when it was already there.
    pub async fn add(&self, item: &CartItem) -> DbResult<bool> {
        debug!(user_id = %item.user_id, game_id = %item.game_id, "Adding to cart");

        let result = sqlx::query(
            r#"
            INSERT INTO cart_items (id, user_id, game_id, added_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (user_id, game_id) DO NOTHING
            "#,
        )
        .bind(&item.id)
        .bind(&item.user_id)
        .bind(&item.game_id)
        .bind(item.added_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes one game from the cart. Returns false when absent.
    pub async fn remove(&self, user_id: &str, game_id: &str) -> DbResult<bool> {
        let result =
            sqlx::query("DELETE FROM cart_items WHERE user_id = ?1 AND game_id = ?2")
                .bind(user_id)
                .bind(game_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes several games from the cart, skipping absent ones.
    /// Returns how many rows were removed.
    pub async fn remove_many(&self, user_id: &str, game_ids: &[String]) -> DbResult<u64> {
        let mut removed = 0u64;
        for game_id in game_ids {
            let result =
                sqlx::query("DELETE FROM cart_items WHERE user_id = ?1 AND game_id = ?2")
                    .bind(user_id)
                    .bind(game_id)
                    .execute(&self.pool)
                    .await?;
            removed += result.rows_affected();
        }

        if removed > 0 {
            debug!(user_id = %user_id, removed, "Removed cart items");
        }
        Ok(removed)
    }

    /// Empties a user's cart. Returns how many items were removed.
    pub async fn clear(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        debug!(user_id = %user_id, removed = result.rows_affected(), "Cart cleared");
        Ok(result.rows_affected())
    }

    /// Lists the game ids in a user's cart, oldest first (insertion order).
    pub async fn list_game_ids(&self, user_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT game_id FROM cart_items WHERE user_id = ?1 ORDER BY added_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use playverse_core::{CartItem, Game, GamePlan, Profile, Role};
    use uuid::Uuid;

    async fn seeded_db(game_ids: &[&str]) -> Database {
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

        for id in game_ids {
            db.games()
                .insert(&Game {
                    id: id.to_string(),
                    title: format!("Game {id}"),
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
        }

        db
    }

    fn item(game_id: &str) -> CartItem {
        CartItem {
            id: Uuid::new_v4().to_string(),
            user_id: "u1".into(),
            game_id: game_id.to_string(),
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_add_is_idempotent_per_game() {
        let db = seeded_db(&["g1"]).await;

        assert!(db.cart().add(&item("g1")).await.unwrap());
        assert!(!db.cart().add(&item("g1")).await.unwrap());

        assert_eq!(db.cart().list_game_ids("u1").await.unwrap(), vec!["g1"]);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let db = seeded_db(&["g1", "g2"]).await;

        db.cart().add(&item("g1")).await.unwrap();
        db.cart().add(&item("g2")).await.unwrap();

        assert!(db.cart().remove("u1", "g1").await.unwrap());
        assert!(!db.cart().remove("u1", "g1").await.unwrap());

        assert_eq!(db.cart().clear("u1").await.unwrap(), 1);
        assert!(db.cart().list_game_ids("u1").await.unwrap().is_empty());
    }
}
