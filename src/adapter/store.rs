//! JSON-file run store.
//!
//! Persists the current run record to a single JSON file so external tools
//! can inspect the in-flight run and a restart can resume it. Uses the
//! write-to-temp-then-rename pattern for atomicity.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::domain::{ConsumerId, DeliveryOutcome, RunId, RunState};
use crate::error::StoreError;
use crate::port::{RunRecord, RunStore};

pub struct JsonRunStore {
    path: PathBuf,
    current: Mutex<Option<RunRecord>>,
}

impl JsonRunStore {
    /// Create a store writing to `path`. The file is created on the first
    /// `begin_run`; an existing file from a previous process is only read
    /// by `load_incomplete`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            current: Mutex::new(None),
        }
    }

    fn write_record(&self, record: &RunRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record).map_err(StoreError::Encode)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Write)?;
        }

        // Write to temp file first for atomicity
        let temp_path = self.path.with_extension("tmp");
        let cleanup_and_err = |e: std::io::Error| {
            let _ = fs::remove_file(&temp_path);
            StoreError::Write(e)
        };

        let mut file = fs::File::create(&temp_path).map_err(StoreError::Write)?;
        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StoreError::Write(e)
        })?;

        Ok(())
    }

    fn read_record(&self) -> Result<Option<RunRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Read(e)),
        };
        let record = serde_json::from_str(&content).map_err(StoreError::Decode)?;
        Ok(Some(record))
    }
}

impl RunStore for JsonRunStore {
    fn begin_run(&self, record: &RunRecord) -> Result<(), StoreError> {
        let mut current = self.current.lock();
        self.write_record(record)?;
        *current = Some(record.clone());
        Ok(())
    }

    fn record_outcome(
        &self,
        run_id: &RunId,
        consumer: &ConsumerId,
        outcome: &DeliveryOutcome,
    ) -> Result<(), StoreError> {
        let mut current = self.current.lock();
        let record = current
            .as_mut()
            .filter(|r| r.run_id == *run_id)
            .ok_or_else(|| StoreError::UnknownRun(run_id.to_string()))?;

        record.outcomes.insert(consumer.clone(), outcome.clone());
        self.write_record(record)
    }

    fn complete_run(&self, run_id: &RunId) -> Result<(), StoreError> {
        let mut current = self.current.lock();
        let record = current
            .as_mut()
            .filter(|r| r.run_id == *run_id)
            .ok_or_else(|| StoreError::UnknownRun(run_id.to_string()))?;

        record.state = RunState::Completed;
        self.write_record(record)
    }

    fn load_incomplete(&self) -> Result<Option<RunRecord>, StoreError> {
        match self.read_record()? {
            Some(record) if record.state != RunState::Completed => {
                // Prime the in-memory copy so outcome and completion writes
                // for the resumed run find it.
                *self.current.lock() = Some(record.clone());
                Ok(Some(record))
            }
            _ => Ok(None),
        }
    }
}
