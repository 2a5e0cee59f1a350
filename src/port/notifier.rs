//! Notifier port for operator-facing events.

use crate::domain::{ConsumerId, DeliveryOutcome, FanOutReport, RunId};

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// One consumer's delivery reached a terminal outcome.
    DeliveryCompleted(DeliveryEvent),
    /// A consumer crossed the failure threshold and was suspended.
    ConsumerSuspended { consumer: ConsumerId, failures: u32 },
    /// A fan-out run finished with a terminal outcome for every consumer.
    RunCompleted(RunEvent),
}

/// Terminal delivery outcome for one consumer.
#[derive(Debug, Clone)]
pub struct DeliveryEvent {
    pub run_id: RunId,
    pub consumer: ConsumerId,
    pub success: bool,
    pub attempts: u32,
    pub details: String,
}

impl DeliveryEvent {
    #[must_use]
    pub fn from_outcome(run_id: RunId, consumer: &ConsumerId, outcome: &DeliveryOutcome) -> Self {
        Self {
            run_id,
            consumer: consumer.clone(),
            success: outcome.is_success(),
            attempts: outcome.attempts(),
            details: outcome.to_string(),
        }
    }
}

/// Fan-out run summary.
#[derive(Debug, Clone)]
pub struct RunEvent {
    pub run_id: RunId,
    pub consumers: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl From<&FanOutReport> for RunEvent {
    fn from(report: &FanOutReport) -> Self {
        Self {
            run_id: report.run_id,
            consumers: report.outcomes.len(),
            succeeded: report.succeeded(),
            failed: report.failed(),
            cancelled: report.cancelled(),
        }
    }
}

/// Trait for notification handlers.
///
/// Implement this trait to receive events from the system. Notifications
/// are fire-and-forget.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - The `notify` method should not block or perform slow I/O synchronously
/// - Consider spawning async tasks for slow operations
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}
