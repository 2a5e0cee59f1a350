//! Delivery transport seam.

use async_trait::async_trait;

use crate::domain::{ChangeBatch, Consumer};
use crate::error::DeliveryError;

/// One logical "deliver batch" call to a consumer endpoint.
///
/// Transport-level framing (HTTP, message queue) is the implementation's
/// concern; the worker only needs a send capability whose failures are
/// split into transient and permanent. A call succeeds only if the
/// consumer accepted every record in the batch.
///
/// Implementations must not mutate consumer or registry state; health
/// bookkeeping belongs to the orchestrator.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// Deliver the batch to the consumer.
    async fn send(&self, consumer: &Consumer, batch: &ChangeBatch) -> Result<(), DeliveryError>;

    /// Get the transport name for logging/debugging.
    fn transport_name(&self) -> &'static str;
}
