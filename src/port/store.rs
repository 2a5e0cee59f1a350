//! Durable run-state seam.
//!
//! A fan-out run's lifecycle is persisted keyed by run id so that a crash
//! mid-run can resume from the last recorded per-consumer outcome instead
//! of restarting the whole batch. Delivery is at-least-once: a crash
//! between a consumer accepting a batch and the outcome write may
//! re-deliver, and consumers own deduplication.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ChangeBatch, Consumer, ConsumerId, DeliveryOutcome, RunId, RunState};
use crate::error::StoreError;

/// Persisted state of one fan-out run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: RunId,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    /// The batch being fanned out; kept so resume can re-deliver it.
    pub batch: ChangeBatch,
    /// Consumers snapshotted as active at run start.
    pub consumers: Vec<ConsumerId>,
    /// Terminal outcomes recorded so far, keyed by consumer endpoint.
    pub outcomes: BTreeMap<ConsumerId, DeliveryOutcome>,
}

impl RunRecord {
    /// Create a pending record for a fresh run.
    #[must_use]
    pub fn new(run_id: RunId, batch: ChangeBatch, consumers: &[Consumer]) -> Self {
        Self {
            run_id,
            state: RunState::Pending,
            started_at: Utc::now(),
            batch,
            consumers: consumers.iter().map(|c| c.id.clone()).collect(),
            outcomes: BTreeMap::new(),
        }
    }

    /// Mark the run as dispatched.
    pub fn start(&mut self) {
        self.state = RunState::InFlight;
    }

    /// Consumers from the run's snapshot that have no terminal outcome yet.
    #[must_use]
    pub fn remaining_consumers(&self) -> Vec<ConsumerId> {
        self.consumers
            .iter()
            .filter(|id| !self.outcomes.contains_key(*id))
            .cloned()
            .collect()
    }

    /// Whether every snapshotted consumer has a terminal outcome.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining_consumers().is_empty()
    }
}

/// Storage collaborator for run state.
///
/// Calls are cheap write-through operations; the orchestrator invokes them
/// inline as outcomes arrive.
pub trait RunStore: Send + Sync {
    /// Persist a newly dispatched run.
    fn begin_run(&self, record: &RunRecord) -> Result<(), StoreError>;

    /// Record one consumer's terminal outcome for the run.
    fn record_outcome(
        &self,
        run_id: &RunId,
        consumer: &ConsumerId,
        outcome: &DeliveryOutcome,
    ) -> Result<(), StoreError>;

    /// Mark the run completed.
    fn complete_run(&self, run_id: &RunId) -> Result<(), StoreError>;

    /// Load the interrupted run from a previous process, if one exists.
    fn load_incomplete(&self) -> Result<Option<RunRecord>, StoreError>;
}
