//! Change records and batches as surfaced by a change feed.

use serde::{Deserialize, Serialize};

/// Monotonically increasing position assigned by the change source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct SequenceNumber(pub u64);

impl SequenceNumber {
    #[must_use]
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SequenceNumber {
    fn from(seq: u64) -> Self {
        Self(seq)
    }
}

/// One changed record from the feed: an opaque payload plus its feed
/// position. Immutable once observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub seq: SequenceNumber,
    pub payload: serde_json::Value,
}

impl ChangeRecord {
    #[must_use]
    pub fn new(seq: impl Into<SequenceNumber>, payload: serde_json::Value) -> Self {
        Self {
            seq: seq.into(),
            payload,
        }
    }
}

/// An ordered sequence of change records from one feed poll.
///
/// Record order within a batch is the feed's commit order and must be
/// preserved when the batch is delivered to a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    records: Vec<ChangeRecord>,
}

impl ChangeBatch {
    #[must_use]
    pub fn new(records: Vec<ChangeRecord>) -> Self {
        debug_assert!(
            records.windows(2).all(|w| w[0].seq < w[1].seq),
            "batch records must be in ascending sequence order"
        );
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last sequence position, if the batch is non-empty.
    #[must_use]
    pub fn sequence_range(&self) -> Option<(SequenceNumber, SequenceNumber)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.seq, last.seq)),
            _ => None,
        }
    }
}

impl IntoIterator for ChangeBatch {
    type Item = ChangeRecord;
    type IntoIter = std::vec::IntoIter<ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sequence_range() {
        let batch = ChangeBatch::new(vec![
            ChangeRecord::new(3, json!({"id": "a"})),
            ChangeRecord::new(5, json!({"id": "b"})),
            ChangeRecord::new(9, json!({"id": "c"})),
        ]);

        assert_eq!(batch.len(), 3);
        assert_eq!(
            batch.sequence_range(),
            Some((SequenceNumber(3), SequenceNumber(9)))
        );
    }

    #[test]
    fn test_empty_batch_has_no_range() {
        let batch = ChangeBatch::new(vec![]);
        assert!(batch.is_empty());
        assert_eq!(batch.sequence_range(), None);
    }

    #[test]
    fn test_batch_serialization_roundtrip() {
        let batch = ChangeBatch::new(vec![ChangeRecord::new(1, json!({"k": "v"}))]);
        let json = serde_json::to_string(&batch).unwrap();
        let parsed: ChangeBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, batch);
    }
}
