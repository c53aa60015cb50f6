//! # Game Repository
//!
//! Database operations for the game catalog.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use playverse_core::Game;

/// Columns selected for a full game row.
const GAME_COLUMNS: &str = "id, title, plan, purchase_price_cents, weekly_price_cents, \
     description, embed_url, is_active, created_at, updated_at";

/// Repository for game catalog operations.
#[derive(Debug, Clone)]
pub struct GameRepository {
    pool: SqlitePool,
}

impl GameRepository {
    /// Creates a new GameRepository.
    pub fn new(pool: SqlitePool) -> Self {
        GameRepository { pool }
    }

    /// Inserts a game.
    pub async fn insert(&self, game: &Game) -> DbResult<()> {
        debug!(id = %game.id, title = %game.title, "Inserting game");

        sqlx::query(
            r#"
            INSERT INTO games (
                id, title, plan, purchase_price_cents, weekly_price_cents,
                description, embed_url, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&game.id)
        .bind(&game.title)
        .bind(game.plan)
        .bind(game.purchase_price_cents)
        .bind(game.weekly_price_cents)
        .bind(&game.description)
        .bind(&game.embed_url)
        .bind(game.is_active)
        .bind(game.created_at)
        .bind(game.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a game by ID. Soft-deleted games are still returned; the
    /// service layer decides whether inactive games are sellable.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Game>> {
        let game = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game)
    }

    /// Lists active (listed) games, newest first.
    pub async fn list_active(&self) -> DbResult<Vec<Game>> {
        let games = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE is_active = 1 ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    /// Counts all games.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use playverse_core::{Game, GamePlan};

    fn sample_game(id: &str) -> Game {
        let now = Utc::now();
        Game {
            id: id.to_string(),
            title: "Star Drifter".to_string(),
            plan: GamePlan::Free,
            purchase_price_cents: 4999,
            weekly_price_cents: 1999,
            description: Some("An endless drift through a neon galaxy.".to_string()),
            embed_url: Some("https://play.example.com/star-drifter".to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.games().insert(&sample_game("g1")).await.unwrap();

        let loaded = db.games().get_by_id("g1").await.unwrap().unwrap();
        assert_eq!(loaded.title, "Star Drifter");
        assert_eq!(loaded.plan, GamePlan::Free);
        assert_eq!(loaded.weekly_price_cents, 1999);

        assert!(db.games().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_active_and_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut inactive = sample_game("g-inactive");
        inactive.is_active = false;

        db.games().insert(&sample_game("g1")).await.unwrap();
        db.games().insert(&inactive).await.unwrap();

        let active = db.games().list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "g1");

        assert_eq!(db.games().count().await.unwrap(), 2);
    }
}
