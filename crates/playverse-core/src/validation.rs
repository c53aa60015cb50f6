//! # Validation Module
//!
//! Business-rule validation for checkout and catalog input.
//!
//! Validation runs at the service boundary, before any write; the database
//! schema (NOT NULL, UNIQUE, CHECK) is the last line of defense behind it.
//!
//! ## Usage
//! ```rust
//! use playverse_core::validation::{validate_rental_weeks, validate_amount_cents};
//!
//! validate_rental_weeks(2).unwrap();
//! validate_amount_cents("weeklyPrice", 1999).unwrap();
//! ```

use crate::error::ValidationError;
use crate::MAX_RENTAL_WEEKS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a rental length in weeks.
///
/// ## Rules
/// - At least 1 week
/// - At most [`MAX_RENTAL_WEEKS`] (52)
///
/// ## Example
/// ```rust
/// use playverse_core::validation::validate_rental_weeks;
///
/// assert!(validate_rental_weeks(1).is_ok());
/// assert!(validate_rental_weeks(0).is_err());
/// assert!(validate_rental_weeks(53).is_err());
/// ```
pub fn validate_rental_weeks(weeks: i64) -> ValidationResult<()> {
    if !(1..=MAX_RENTAL_WEEKS).contains(&weeks) {
        return Err(ValidationError::OutOfRange {
            field: "weeks".to_string(),
            min: 1,
            max: MAX_RENTAL_WEEKS,
        });
    }
    Ok(())
}

/// Validates a monetary amount in cents.
///
/// Prices and payment amounts are never negative.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a game title.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 200 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
