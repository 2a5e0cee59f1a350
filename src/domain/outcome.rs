//! Terminal outcomes of delivering one batch to one consumer.

use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;

/// Result of attempting to deliver a batch to a consumer.
///
/// Every dispatched delivery resolves to exactly one of these; the
/// orchestrator's run is complete only when every consumer has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum DeliveryOutcome {
    /// Every record in the batch was accepted by the consumer.
    Success { attempts: u32, latency_ms: u64 },
    /// Retries exhausted, or a permanent rejection.
    Failed { reason: String, attempts: u32 },
    /// Shutdown interrupted the delivery before a terminal result.
    ///
    /// Does not count against the consumer's health; resume picks the
    /// consumer up again on the next start.
    Cancelled { attempts: u32 },
}

impl DeliveryOutcome {
    /// Check if the delivery succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Success { .. })
    }

    /// Check if the delivery failed after exhausting its attempts.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, DeliveryOutcome::Failed { .. })
    }

    /// Check if shutdown cut the delivery short.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DeliveryOutcome::Cancelled { .. })
    }

    /// Number of transport calls made before this outcome.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            DeliveryOutcome::Success { attempts, .. }
            | DeliveryOutcome::Failed { attempts, .. }
            | DeliveryOutcome::Cancelled { attempts } => *attempts,
        }
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryOutcome::Success {
                attempts,
                latency_ms,
            } => write!(f, "success after {attempts} attempt(s) in {latency_ms}ms"),
            DeliveryOutcome::Failed { reason, attempts } => {
                write!(f, "failed after {attempts} attempt(s): {reason}")
            }
            DeliveryOutcome::Cancelled { attempts } => {
                write!(f, "cancelled after {attempts} attempt(s)")
            }
        }
    }
}

/// Transient record of one transport call within a delivery.
///
/// Not persisted beyond the run; surfaced through tracing and the aggregate
/// counters.
#[derive(Debug, Clone)]
pub struct DeliveryAttempt {
    pub number: u32,
    pub latency_ms: u64,
    pub error: Option<DeliveryError>,
}

impl DeliveryAttempt {
    #[must_use]
    pub fn succeeded(number: u32, latency_ms: u64) -> Self {
        Self {
            number,
            latency_ms,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(number: u32, latency_ms: u64, error: DeliveryError) -> Self {
        Self {
            number,
            latency_ms,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
