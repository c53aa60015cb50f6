//! # playverse-store: Service Layer for the PlayVerse Backend
//!
//! Orchestrates checkout, the premium plan sweep and deduplicated
//! notifications on top of [`playverse_core`] (pure logic) and
//! [`playverse_db`] (storage).
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PlayVerse Checkout Flow                             │
//! │                                                                         │
//! │  start_rental / extend_rental / purchase_game / purchase_cart           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Validate input (weeks, ids)        ── abort before any write        │
//! │  2. Load game + profile                ── typed NotFound errors         │
//! │  3. Pricing::compute(base, role rate)  ── pure, integer cents           │
//! │  4. Conditional write (upsert/insert)  ── DB resolves duplicate races   │
//! │  5. Payment ledger row                 ── append-only                   │
//! │  6. Enqueue email / push job           ── best-effort, never fails      │
//! │       │                                   the checkout                  │
//! │       ▼                                                                 │
//! │  ┌──────────────┐   mpsc    ┌──────────────┐   Delivery trait          │
//! │  │DispatchHandle│ ────────► │  Dispatcher  │ ────────► log / transport │
//! │  └──────────────┘ try_send  └──────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`checkout`] - Rental and purchase orchestration
//! - [`plans`] - Premium plan consistency sweep
//! - [`notify`] - Deduplicated notification writes
//! - [`dispatch`] - Best-effort delivery queue
//! - [`config`] - Environment configuration
//! - [`error`] - Service error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod notify;
pub mod plans;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CartOutcome, CheckoutService};
pub use config::{ConfigError, StoreConfig};
pub use dispatch::{Delivery, DeliveryError, DispatchHandle, DispatchJob, Dispatcher, LogDelivery};
pub use error::{StoreError, StoreResult};
pub use notify::Notifier;
pub use plans::{PlanService, PlanSweep};
