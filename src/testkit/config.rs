//! Canonical test policies and domain builders.

use std::time::Duration;

use serde_json::json;

use crate::delivery::RetryPolicy;
use crate::domain::{ChangeBatch, ChangeRecord, Consumer};

/// Retry policy with short waits so timing tests stay fast even without a
/// paused clock.
#[must_use]
pub fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        first_interval: Duration::from_millis(10),
        backoff_multiplier: 2.0,
        max_interval: Duration::from_secs(1),
    }
}

/// An active consumer with no headers.
#[must_use]
pub fn consumer(endpoint: &str) -> Consumer {
    Consumer::new(endpoint)
}

/// A batch whose records carry the given sequence numbers.
#[must_use]
pub fn batch(seqs: &[u64]) -> ChangeBatch {
    ChangeBatch::new(
        seqs.iter()
            .map(|seq| ChangeRecord::new(*seq, json!({ "seq": seq })))
            .collect(),
    )
}
