//! Delivery worker: one (batch, consumer) delivery with retry and backoff.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::app::Shutdown;
use crate::domain::{ChangeBatch, Consumer, DeliveryAttempt, DeliveryOutcome};
use crate::port::DeliveryTransport;

use super::RetryPolicy;

/// Performs one consumer delivery with bounded retry.
///
/// Transient failures are retried up to the policy's attempt budget with
/// exponentially growing waits; permanent failures are reported
/// immediately. The backoff wait is the worker's only suspension point,
/// and it never blocks deliveries to other consumers.
///
/// The worker absorbs all failures into a [`DeliveryOutcome`] and never
/// mutates consumer or registry state.
pub struct DeliveryWorker {
    transport: Arc<dyn DeliveryTransport>,
    policy: RetryPolicy,
}

impl DeliveryWorker {
    #[must_use]
    pub fn new(transport: Arc<dyn DeliveryTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Deliver `batch` to `consumer`, retrying transient failures.
    ///
    /// After a shutdown signal the in-flight attempt finishes but no new
    /// retry starts; the outcome is then `Cancelled`.
    pub async fn deliver(
        &self,
        consumer: &Consumer,
        batch: &ChangeBatch,
        shutdown: &Shutdown,
    ) -> DeliveryOutcome {
        let started = Instant::now();
        let mut last_reason = String::new();

        for attempt in 1..=self.policy.max_attempts {
            let attempt_started = Instant::now();
            let result = self.transport.send(consumer, batch).await;
            let latency_ms = attempt_started.elapsed().as_millis() as u64;

            match result {
                Ok(()) => {
                    let record = DeliveryAttempt::succeeded(attempt, latency_ms);
                    debug!(
                        consumer = %consumer.id,
                        attempt = record.number,
                        latency_ms = record.latency_ms,
                        transport = self.transport.transport_name(),
                        "Delivery attempt succeeded"
                    );
                    return DeliveryOutcome::Success {
                        attempts: attempt,
                        latency_ms: started.elapsed().as_millis() as u64,
                    };
                }
                Err(error) => {
                    let transient = error.is_transient();
                    let record = DeliveryAttempt::failed(attempt, latency_ms, error.clone());
                    warn!(
                        consumer = %consumer.id,
                        attempt = record.number,
                        latency_ms = record.latency_ms,
                        error = %error,
                        "Delivery attempt failed"
                    );

                    if !transient {
                        return DeliveryOutcome::Failed {
                            reason: error.reason().to_string(),
                            attempts: attempt,
                        };
                    }
                    last_reason = error.reason().to_string();
                }
            }

            if attempt == self.policy.max_attempts {
                break;
            }

            if shutdown.is_cancelled() {
                return DeliveryOutcome::Cancelled { attempts: attempt };
            }

            let delay = self.policy.delay_after(attempt);
            debug!(
                consumer = %consumer.id,
                delay_ms = delay.as_millis() as u64,
                next_attempt = attempt + 1,
                "Waiting before retry"
            );
            tokio::select! {
                () = sleep(delay) => {}
                () = shutdown.cancelled() => {
                    return DeliveryOutcome::Cancelled { attempts: attempt };
                }
            }
        }

        DeliveryOutcome::Failed {
            reason: last_reason,
            attempts: self.policy.max_attempts,
        }
    }
}
