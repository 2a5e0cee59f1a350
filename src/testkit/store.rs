//! In-memory [`RunStore`] for tests.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::domain::{ConsumerId, DeliveryOutcome, RunId, RunState};
use crate::error::StoreError;
use crate::port::{RunRecord, RunStore};

#[derive(Default)]
struct StoreState {
    runs: HashMap<RunId, RunRecord>,
    order: Vec<RunId>,
}

/// A run store backed by a map, preserving insertion order.
#[derive(Default)]
pub struct MemoryRunStore {
    state: Mutex<StoreState>,
}

impl MemoryRunStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a run from a "previous process", as crash
    /// resume would find it.
    #[must_use]
    pub fn with_incomplete(self, record: RunRecord) -> Self {
        {
            let mut state = self.state.lock();
            state.order.push(record.run_id);
            state.runs.insert(record.run_id, record);
        }
        self
    }

    /// Number of runs the store has seen.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.state.lock().runs.len()
    }

    /// Copy of one run's record, if present.
    #[must_use]
    pub fn run(&self, run_id: &RunId) -> Option<RunRecord> {
        self.state.lock().runs.get(run_id).cloned()
    }

    /// Copy of the most recently begun run's record.
    #[must_use]
    pub fn latest_run(&self) -> Option<RunRecord> {
        let state = self.state.lock();
        state.order.last().and_then(|id| state.runs.get(id)).cloned()
    }
}

impl RunStore for MemoryRunStore {
    fn begin_run(&self, record: &RunRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.order.push(record.run_id);
        state.runs.insert(record.run_id, record.clone());
        Ok(())
    }

    fn record_outcome(
        &self,
        run_id: &RunId,
        consumer: &ConsumerId,
        outcome: &DeliveryOutcome,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let record = state
            .runs
            .get_mut(run_id)
            .ok_or_else(|| StoreError::UnknownRun(run_id.to_string()))?;
        record.outcomes.insert(consumer.clone(), outcome.clone());
        Ok(())
    }

    fn complete_run(&self, run_id: &RunId) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let record = state
            .runs
            .get_mut(run_id)
            .ok_or_else(|| StoreError::UnknownRun(run_id.to_string()))?;
        record.state = RunState::Completed;
        Ok(())
    }

    fn load_incomplete(&self) -> Result<Option<RunRecord>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.runs.get(id))
            .find(|record| record.state != RunState::Completed)
            .cloned())
    }
}
