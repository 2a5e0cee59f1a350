//! Scripted [`DeliveryTransport`] with per-consumer result queues and call
//! recording.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{ChangeBatch, Consumer, ConsumerId};
use crate::error::DeliveryError;
use crate::port::DeliveryTransport;

type SendResult = Result<(), DeliveryError>;

#[derive(Default)]
struct TransportState {
    /// Per-consumer queues of scripted results, consumed in order.
    scripts: HashMap<ConsumerId, VecDeque<SendResult>>,
    /// Per-consumer result applied once the queue is empty.
    sticky: HashMap<ConsumerId, SendResult>,
    /// Every send call: consumer plus the delivered sequence numbers.
    calls: Vec<(ConsumerId, Vec<u64>)>,
}

/// A transport whose responses are scripted per consumer.
///
/// Each `send` pops the consumer's next scripted result; when the queue is
/// empty the consumer's sticky result applies, defaulting to `Ok(())`.
/// Every call is recorded with the batch's sequence numbers so tests can
/// assert on call counts and delivery order.
#[derive(Default)]
pub struct ScriptedTransport {
    state: Mutex<TransportState>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue results for one consumer, consumed one per call.
    #[must_use]
    pub fn with_script(self, consumer: impl Into<ConsumerId>, results: Vec<SendResult>) -> Self {
        self.state
            .lock()
            .scripts
            .insert(consumer.into(), results.into());
        self
    }

    /// Make every call for one consumer return the same result once its
    /// scripted queue (if any) is exhausted.
    #[must_use]
    pub fn with_sticky(self, consumer: impl Into<ConsumerId>, result: SendResult) -> Self {
        self.state.lock().sticky.insert(consumer.into(), result);
        self
    }

    /// Number of send calls made for one consumer.
    #[must_use]
    pub fn call_count(&self, consumer: &ConsumerId) -> u32 {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|(id, _)| id == consumer)
            .count() as u32
    }

    /// Total send calls across all consumers.
    #[must_use]
    pub fn total_calls(&self) -> u32 {
        self.state.lock().calls.len() as u32
    }

    /// Sequence numbers delivered to one consumer, one entry per call.
    #[must_use]
    pub fn deliveries(&self, consumer: &ConsumerId) -> Vec<Vec<u64>> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|(id, _)| id == consumer)
            .map(|(_, seqs)| seqs.clone())
            .collect()
    }
}

#[async_trait]
impl DeliveryTransport for ScriptedTransport {
    async fn send(&self, consumer: &Consumer, batch: &ChangeBatch) -> SendResult {
        let mut state = self.state.lock();

        let seqs = batch.records().iter().map(|r| r.seq.value()).collect();
        state.calls.push((consumer.id.clone(), seqs));

        if let Some(queue) = state.scripts.get_mut(&consumer.id) {
            if let Some(result) = queue.pop_front() {
                return result;
            }
        }
        state.sticky.get(&consumer.id).cloned().unwrap_or(Ok(()))
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}
