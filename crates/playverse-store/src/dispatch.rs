//! # Dispatch Queue
//!
//! Best-effort delivery queue decoupling checkout durability from email and
//! push latency.
//!
//! ## Dispatch Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dispatch Flow                                    │
//! │                                                                         │
//! │  CheckoutService / Notifier                                             │
//! │       │                                                                 │
//! │       │ DispatchHandle::enqueue(job)     non-blocking try_send;         │
//! │       ▼                                  full/closed queue is logged    │
//! │  ┌─────────────────────────────┐         and swallowed                  │
//! │  │    mpsc channel (256)       │                                        │
//! │  └──────────────┬──────────────┘                                        │
//! │                 ▼                                                       │
//! │  ┌─────────────────────────────┐                                        │
//! │  │  Dispatcher::run (task)     │  1. recv job                           │
//! │  │                             │  2. Delivery::deliver(job)             │
//! │  │                             │  3. error? log and drop                │
//! │  └──────────────┬──────────────┘     (no retry, no dead-letter)         │
//! │                 ▼                                                       │
//! │  Delivery trait object (LogDelivery by default; real SMTP / push       │
//! │  transports plug in behind the same trait)                             │
//! │                                                                         │
//! │  GUARANTEE: a lost job loses an email, never a transaction or a        │
//! │  payment row - those are already committed before enqueue.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

// =============================================================================
// Constants
// =============================================================================

/// Capacity of the job channel before enqueue starts dropping.
const QUEUE_CAPACITY: usize = 256;

// =============================================================================
// Jobs
// =============================================================================

/// One line of an itemized cart receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub game_title: String,
    pub final_cents: i64,
}

/// A delivery job placed on the dispatch queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DispatchJob {
    /// Rental confirmation email (also sent for extensions).
    #[serde(rename_all = "camelCase")]
    RentalConfirmation {
        user_id: String,
        email: String,
        game_title: String,
        weeks: i64,
        final_cents: i64,
        expires_at: String,
    },

    /// Single-game purchase receipt email.
    #[serde(rename_all = "camelCase")]
    PurchaseReceipt {
        user_id: String,
        email: String,
        game_title: String,
        final_cents: i64,
    },

    /// Itemized cart receipt email.
    #[serde(rename_all = "camelCase")]
    CartReceipt {
        user_id: String,
        email: String,
        lines: Vec<ReceiptLine>,
        total_cents: i64,
    },

    /// In-app push for a stored notification row.
    #[serde(rename_all = "camelCase")]
    Push {
        user_id: String,
        notification_id: String,
        title: String,
        message: String,
    },
}

impl DispatchJob {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchJob::RentalConfirmation { .. } => "rental-confirmation",
            DispatchJob::PurchaseReceipt { .. } => "purchase-receipt",
            DispatchJob::CartReceipt { .. } => "cart-receipt",
            DispatchJob::Push { .. } => "push",
        }
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// Error from a delivery backend.
#[derive(Debug, Error)]
#[error("Delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// A delivery backend for dispatch jobs.
///
/// The real transports (SMTP, push gateway) live behind this trait; the
/// queue neither knows nor cares which one is plugged in.
pub trait Delivery: Send + Sync {
    fn deliver(&self, job: &DispatchJob) -> Result<(), DeliveryError>;
}

/// Default delivery backend: logs the job and does nothing else.
#[derive(Debug, Default)]
pub struct LogDelivery;

impl Delivery for LogDelivery {
    fn deliver(&self, job: &DispatchJob) -> Result<(), DeliveryError> {
        info!(kind = job.kind(), job = ?job, "Delivering dispatch job");
        Ok(())
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Handle for enqueueing jobs and shutting the worker down.
#[derive(Clone)]
pub struct DispatchHandle {
    tx: mpsc::Sender<DispatchJob>,
    shutdown_tx: mpsc::Sender<()>,
}

impl DispatchHandle {
    /// Enqueues a job without blocking.
    ///
    /// A full or closed queue drops the job with a warning. Callers never
    /// observe an error: delivery is best-effort by contract.
    pub fn enqueue(&self, job: DispatchJob) {
        if let Err(e) = self.tx.try_send(job) {
            let job = match &e {
                mpsc::error::TrySendError::Full(job) => job,
                mpsc::error::TrySendError::Closed(job) => job,
            };
            warn!(kind = job.kind(), "Dispatch queue unavailable, job dropped");
        }
    }

    /// Triggers graceful shutdown. The worker drains already-queued jobs
    /// before stopping.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Worker task that consumes the queue and hands jobs to a [`Delivery`].
pub struct Dispatcher {
    rx: mpsc::Receiver<DispatchJob>,
    shutdown_rx: mpsc::Receiver<()>,
    delivery: Arc<dyn Delivery>,
}

impl Dispatcher {
    /// Creates a dispatcher and its handle.
    pub fn new(delivery: Arc<dyn Delivery>) -> (Self, DispatchHandle) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let dispatcher = Dispatcher {
            rx,
            shutdown_rx,
            delivery,
        };

        (dispatcher, DispatchHandle { tx, shutdown_tx })
    }

    /// Runs the dispatch loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("Dispatch worker starting");

        loop {
            tokio::select! {
                // Queued jobs win over shutdown so a graceful stop drains
                // the queue first
                biased;

                Some(job) = self.rx.recv() => {
                    debug!(kind = job.kind(), "Processing dispatch job");
                    if let Err(e) = self.delivery.deliver(&job) {
                        warn!(kind = job.kind(), error = %e, "Delivery failed, job dropped");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Dispatch worker shutting down");
                    break;
                }

                else => break,
            }
        }

        info!("Dispatch worker stopped");
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Test delivery that records every job it sees.
    #[derive(Default)]
    pub(crate) struct CapturingDelivery {
        pub jobs: Mutex<Vec<DispatchJob>>,
    }

    impl Delivery for CapturingDelivery {
        fn deliver(&self, job: &DispatchJob) -> Result<(), DeliveryError> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok(())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::test_support::CapturingDelivery;
    use super::*;

    fn push_job(id: &str) -> DispatchJob {
        DispatchJob::Push {
            user_id: "u1".into(),
            notification_id: id.into(),
            title: "Hi".into(),
            message: "There".into(),
        }
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_jobs() {
        let delivery = Arc::new(CapturingDelivery::default());
        let (dispatcher, handle) = Dispatcher::new(delivery.clone());
        let worker = tokio::spawn(dispatcher.run());

        handle.enqueue(push_job("n1"));
        handle.enqueue(push_job("n2"));
        handle.shutdown().await;
        worker.await.unwrap();

        let jobs = delivery.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_enqueue_on_dead_queue_is_swallowed() {
        let (dispatcher, handle) = Dispatcher::new(Arc::new(LogDelivery));
        drop(dispatcher);

        // Receiver is gone; enqueue must not panic or error
        handle.enqueue(push_job("n1"));
    }

    #[tokio::test]
    async fn test_failed_delivery_is_dropped_not_retried() {
        struct FailingDelivery;
        impl Delivery for FailingDelivery {
            fn deliver(&self, _job: &DispatchJob) -> Result<(), DeliveryError> {
                Err(DeliveryError("smtp down".into()))
            }
        }

        let (dispatcher, handle) = Dispatcher::new(Arc::new(FailingDelivery));
        let worker = tokio::spawn(dispatcher.run());

        handle.enqueue(push_job("n1"));
        handle.shutdown().await;
        // Worker survives the failure and stops cleanly
        worker.await.unwrap();
    }

    #[test]
    fn test_job_serializes_with_camel_case_tag() {
        let json = serde_json::to_string(&push_job("n1")).unwrap();
        assert!(json.contains("\"type\":\"push\""));
        assert!(json.contains("\"notificationId\":\"n1\""));
    }
}
