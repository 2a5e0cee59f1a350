//! Shared application state: aggregate telemetry counters.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::FanOutReport;

/// Aggregate delivery-outcome counters surfaced to operators.
///
/// These are the only numbers kept beyond a run; per-attempt detail lives
/// in the tracing log.
pub struct AppState {
    started_at: DateTime<Utc>,
    runs_completed: AtomicU64,
    deliveries_succeeded: AtomicU64,
    deliveries_failed: AtomicU64,
    deliveries_cancelled: AtomicU64,
    consumers_suspended: AtomicU64,
}

/// Point-in-time copy of the counters for the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub started_at: DateTime<Utc>,
    pub runs_completed: u64,
    pub deliveries_succeeded: u64,
    pub deliveries_failed: u64,
    pub deliveries_cancelled: u64,
    pub consumers_suspended: u64,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            runs_completed: AtomicU64::new(0),
            deliveries_succeeded: AtomicU64::new(0),
            deliveries_failed: AtomicU64::new(0),
            deliveries_cancelled: AtomicU64::new(0),
            consumers_suspended: AtomicU64::new(0),
        }
    }

    /// Fold a finished run's outcomes into the counters.
    pub fn record_run(&self, report: &FanOutReport) {
        self.runs_completed.fetch_add(1, Ordering::SeqCst);
        self.deliveries_succeeded
            .fetch_add(report.succeeded() as u64, Ordering::SeqCst);
        self.deliveries_failed
            .fetch_add(report.failed() as u64, Ordering::SeqCst);
        self.deliveries_cancelled
            .fetch_add(report.cancelled() as u64, Ordering::SeqCst);
    }

    /// Record a consumer crossing the suspension threshold.
    pub fn record_suspension(&self) {
        self.consumers_suspended.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: self.started_at,
            runs_completed: self.runs_completed.load(Ordering::SeqCst),
            deliveries_succeeded: self.deliveries_succeeded.load(Ordering::SeqCst),
            deliveries_failed: self.deliveries_failed.load(Ordering::SeqCst),
            deliveries_cancelled: self.deliveries_cancelled.load(Ordering::SeqCst),
            consumers_suspended: self.consumers_suspended.load(Ordering::SeqCst),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
