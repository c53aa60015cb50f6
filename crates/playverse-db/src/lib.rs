//! # playverse-db: Database Layer for the PlayVerse Backend
//!
//! This crate provides database access for the PlayVerse storefront backend.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PlayVerse Data Flow                                │
//! │                                                                         │
//! │  Service call (start_rental, ensure_for_user, ...)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   playverse-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (game, tx,    │    │  (embedded)  │  │   │
//! │  │   │               │    │  profile,...) │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ conditional   │    │ 001_init.sql │  │   │
//! │  │   │ WAL + FK on   │    │ writes        │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (game, profile, transaction, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use playverse_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("playverse.db")).await?;
//! let game = db.games().get_by_id("some-game-id").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cart::CartRepository;
pub use repository::game::GameRepository;
pub use repository::notification::{NotificationRepository, NotifyWrite};
pub use repository::profile::ProfileRepository;
pub use repository::subscription::SubscriptionRepository;
pub use repository::transaction::TransactionRepository;
