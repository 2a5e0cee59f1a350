//! Fan-out run identity, lifecycle state, and the per-run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ConsumerId, DeliveryOutcome, SequenceNumber};

/// Unique identifier for one fan-out run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a fresh run id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a single fan-out run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Created, deliveries not yet dispatched.
    Pending,
    /// Deliveries dispatched, awaiting terminal outcomes.
    InFlight,
    /// Every consumer has a terminal outcome.
    Completed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Pending => write!(f, "pending"),
            RunState::InFlight => write!(f, "in-flight"),
            RunState::Completed => write!(f, "completed"),
        }
    }
}

/// One consumer's terminal outcome within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerOutcome {
    pub consumer: ConsumerId,
    pub outcome: DeliveryOutcome,
}

/// Aggregated result of one fan-out run: exactly one terminal outcome per
/// consumer that was active when the run started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanOutReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Sequence range of the delivered batch, if it was non-empty.
    pub sequence_range: Option<(SequenceNumber, SequenceNumber)>,
    pub outcomes: Vec<ConsumerOutcome>,
}

impl FanOutReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_failed()).count()
    }

    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_cancelled())
            .count()
    }

    /// Look up the outcome recorded for a consumer, if any.
    #[must_use]
    pub fn outcome_for(&self, consumer: &ConsumerId) -> Option<&DeliveryOutcome> {
        self.outcomes
            .iter()
            .find(|o| &o.consumer == consumer)
            .map(|o| &o.outcome)
    }
}
