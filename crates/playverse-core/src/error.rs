//! # Error Types
//!
//! Domain-specific error types for playverse-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  playverse-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  playverse-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  playverse-store errors (separate crate)                               │
//! │  └── StoreError       - Wraps CoreError + DbError for services         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → API caller           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (game id, user id)
//! 3. Errors are enum variants, never sentinel strings - callers match on
//!    variants, not on `"ALREADY_RENTED_ACTIVE"`-style message substrings

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. Validation failures
/// abort a checkout before any write happens.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Game cannot be found (or is soft-deleted).
    #[error("Game not found: {0}")]
    GameNotFound(String),

    /// Profile cannot be found.
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// The user already holds an unexpired rental for this game.
    ///
    /// ## When This Occurs
    /// - `start_rental` on a game with a live rental row
    /// - Two concurrent rental checkouts; the database resolves the race
    ///   and the loser surfaces this error
    #[error("User {user_id} already has an active rental for game {game_id}")]
    AlreadyRentedActive { user_id: String, game_id: String },

    /// The user already owns this game.
    #[error("User {user_id} already owns game {game_id}")]
    AlreadyOwned { user_id: String, game_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be non-negative.
    #[error("{field} must not be negative")]
    Negative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::AlreadyRentedActive {
            user_id: "u1".to_string(),
            game_id: "g1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "User u1 already has an active rental for game g1"
        );

        let err = CoreError::GameNotFound("g404".to_string());
        assert_eq!(err.to_string(), "Game not found: g404");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "weeks".to_string(),
            min: 1,
            max: 52,
        };
        assert_eq!(err.to_string(), "weeks must be between 1 and 52");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
