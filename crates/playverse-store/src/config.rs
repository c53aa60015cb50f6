//! Store configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, so a bare `StoreConfig::load()` works out of the box in
//! development.

use chrono::Duration;
use playverse_core::{DiscountRate, DEFAULT_NOTIFY_DEDUPE_MS, DEFAULT_PREMIUM_DISCOUNT_BPS};
use serde::{Deserialize, Serialize};
use std::env;

/// Service-layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Discount rate for premium-role users, in basis points.
    pub premium_discount_bps: u32,

    /// ISO currency code recorded on payment rows.
    pub currency: String,

    /// Payment provider label recorded on payment rows.
    pub provider: String,

    /// Dedupe window for "ensure"-style notifications, in milliseconds.
    pub notify_dedupe_window_ms: i64,

    /// Sender address stamped on outgoing email jobs.
    pub mail_from: String,

    /// Public base URL, used in email bodies.
    pub app_url: String,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                  | Default                  |
    /// |---------------------------|--------------------------|
    /// | `PREMIUM_DISCOUNT`        | `0.10` (fraction)        |
    /// | `CURRENCY`                | `USD`                    |
    /// | `PROVIDER`                | `playverse`              |
    /// | `NOTIFY_DEDUPE_WINDOW_MS` | `600000` (10 minutes)    |
    /// | `MAIL_FROM`               | `noreply@playverse.dev`  |
    /// | `APP_URL`                 | `https://playverse.dev`  |
    pub fn load() -> Result<Self, ConfigError> {
        let premium_fraction: f64 = env::var("PREMIUM_DISCOUNT")
            .unwrap_or_else(|_| "0.10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PREMIUM_DISCOUNT".to_string()))?;

        let config = StoreConfig {
            // from_fraction coerces non-finite/negative input to zero and
            // clamps above 90%, so a bad value can't make prices negative
            premium_discount_bps: DiscountRate::from_fraction(premium_fraction).bps(),

            currency: env::var("CURRENCY").unwrap_or_else(|_| "USD".to_string()),

            provider: env::var("PROVIDER").unwrap_or_else(|_| "playverse".to_string()),

            notify_dedupe_window_ms: env::var("NOTIFY_DEDUPE_WINDOW_MS")
                .unwrap_or_else(|_| DEFAULT_NOTIFY_DEDUPE_MS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("NOTIFY_DEDUPE_WINDOW_MS".to_string()))?,

            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@playverse.dev".to_string()),

            app_url: env::var("APP_URL").unwrap_or_else(|_| "https://playverse.dev".to_string()),
        };

        Ok(config)
    }

    /// The configured premium discount as a typed rate.
    pub fn premium_discount(&self) -> DiscountRate {
        DiscountRate::from_bps(self.premium_discount_bps)
    }

    /// The notification dedupe window as a duration.
    pub fn dedupe_window(&self) -> Duration {
        Duration::milliseconds(self.notify_dedupe_window_ms.max(0))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            premium_discount_bps: DEFAULT_PREMIUM_DISCOUNT_BPS,
            currency: "USD".to_string(),
            provider: "playverse".to_string(),
            notify_dedupe_window_ms: DEFAULT_NOTIFY_DEDUPE_MS,
            mail_from: "noreply@playverse.dev".to_string(),
            app_url: "https://playverse.dev".to_string(),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.premium_discount_bps, 1000);
        assert_eq!(config.currency, "USD");
        assert_eq!(config.provider, "playverse");
        assert_eq!(config.notify_dedupe_window_ms, 600_000);
        assert_eq!(config.dedupe_window(), Duration::minutes(10));
    }

    #[test]
    fn test_premium_discount_is_clamped() {
        let config = StoreConfig {
            premium_discount_bps: 9500,
            ..StoreConfig::default()
        };
        assert_eq!(config.premium_discount().bps(), 9000);
    }
}
