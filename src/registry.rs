//! Consumer registry: the single shared mutable state of the system.
//!
//! Holds the current set of registered consumer endpoints and their health.
//! Mutations are serialized per consumer through the sharded map's per-key
//! locking; different consumers never contend on a global lock.
//!
//! Only the orchestrator (on delivery outcomes) and the administrative
//! surface call the mutation methods. Unknown consumers are a logged no-op
//! on every mutation, never fatal.

use dashmap::DashMap;
use tracing::{info, warn};

use crate::domain::{Consumer, ConsumerId, ConsumerState};

/// Default number of consecutive failures before suspension.
pub const DEFAULT_SUSPENSION_THRESHOLD: u32 = 3;

/// Result of recording a delivery failure against a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMark {
    /// Failure counted; consumer still active.
    Recorded { failures: u32 },
    /// Failure counted and the threshold was reached; consumer is now
    /// suspended.
    Suspended { failures: u32 },
    /// No consumer with that id is registered.
    Unknown,
}

/// Registry of consumer endpoints keyed by endpoint URL.
pub struct ConsumerRegistry {
    consumers: DashMap<ConsumerId, Consumer>,
    suspension_threshold: u32,
}

impl ConsumerRegistry {
    /// Create an empty registry with the given suspension threshold.
    #[must_use]
    pub fn new(suspension_threshold: u32) -> Self {
        Self {
            consumers: DashMap::new(),
            suspension_threshold,
        }
    }

    /// Register a consumer. Replaces any existing entry with the same id.
    pub fn insert(&self, consumer: Consumer) {
        self.consumers.insert(consumer.id.clone(), consumer);
    }

    /// Look up a single consumer by id.
    #[must_use]
    pub fn get(&self, id: &ConsumerId) -> Option<Consumer> {
        self.consumers.get(id).map(|entry| entry.value().clone())
    }

    /// Snapshot of all consumers not currently suspended.
    ///
    /// The fan-out orchestrator takes this snapshot once at run start;
    /// consumers registered mid-run are picked up by the next run.
    #[must_use]
    pub fn list_active(&self) -> Vec<Consumer> {
        let mut active: Vec<Consumer> = self
            .consumers
            .iter()
            .filter(|entry| entry.is_active())
            .map(|entry| entry.value().clone())
            .collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));
        active
    }

    /// Snapshot of every registered consumer, suspended included.
    #[must_use]
    pub fn list_all(&self) -> Vec<Consumer> {
        let mut all: Vec<Consumer> = self
            .consumers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    /// Record a delivery failure. At `suspension_threshold` consecutive
    /// failures the consumer transitions to `Suspended`.
    pub fn mark_failed(&self, id: &ConsumerId) -> FailureMark {
        let Some(mut entry) = self.consumers.get_mut(id) else {
            warn!(consumer = %id, "mark_failed for unknown consumer, ignoring");
            return FailureMark::Unknown;
        };

        entry.consecutive_failures += 1;
        let failures = entry.consecutive_failures;

        if entry.state == ConsumerState::Active && failures >= self.suspension_threshold {
            entry.state = ConsumerState::Suspended;
            info!(
                consumer = %id,
                failures,
                "Consumer suspended after repeated failures"
            );
            FailureMark::Suspended { failures }
        } else {
            FailureMark::Recorded { failures }
        }
    }

    /// Record a delivery success, clearing the consecutive-failure count.
    pub fn mark_succeeded(&self, id: &ConsumerId) {
        let Some(mut entry) = self.consumers.get_mut(id) else {
            warn!(consumer = %id, "mark_succeeded for unknown consumer, ignoring");
            return;
        };
        entry.consecutive_failures = 0;
    }

    /// Administrative action: bring a suspended consumer back into rotation
    /// with a clean failure count. Returns false if the consumer is unknown.
    pub fn reactivate(&self, id: &ConsumerId) -> bool {
        let Some(mut entry) = self.consumers.get_mut(id) else {
            warn!(consumer = %id, "reactivate for unknown consumer, ignoring");
            return false;
        };
        entry.state = ConsumerState::Active;
        entry.consecutive_failures = 0;
        info!(consumer = %id, "Consumer reactivated");
        true
    }

    /// Administrative action: take a consumer out of rotation. Returns
    /// false if the consumer is unknown.
    pub fn suspend(&self, id: &ConsumerId) -> bool {
        let Some(mut entry) = self.consumers.get_mut(id) else {
            warn!(consumer = %id, "suspend for unknown consumer, ignoring");
            return false;
        };
        entry.state = ConsumerState::Suspended;
        info!(consumer = %id, "Consumer suspended by operator");
        true
    }
}
