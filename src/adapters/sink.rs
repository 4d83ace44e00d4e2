//! Persistence sink for per-violation outcomes. Append-only, best-effort.
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::types::{PersistenceError, ResourceId, ViolationStatus};

/// One persisted outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub run_id: String,
    pub resource_id: ResourceId,
    pub line: u32,
    pub code: String,
    pub status: ViolationStatus,
    pub applied_reason: String,
    /// RFC 3339.
    pub timestamp: String,
}

/// Destination for outcome records. Called concurrently from worker threads.
pub trait OutcomeSink: Send + Sync {
    /// # Errors
    ///
    /// Returns a `PersistenceError` when the records cannot be stored. Callers log
    /// and continue.
    fn append(&self, records: &[OutcomeRecord]) -> Result<(), PersistenceError>;
}

/// Discards all records.
#[derive(Debug, Default)]
pub struct NullOutcomeSink;

impl OutcomeSink for NullOutcomeSink {
    fn append(&self, _records: &[OutcomeRecord]) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Appends one JSON object per record to a file.
#[derive(Debug)]
pub struct JsonlOutcomeSink {
    file: Mutex<File>,
}

impl JsonlOutcomeSink {
    /// # Errors
    ///
    /// Returns a `PersistenceError` if the file cannot be opened for appending.
    pub fn create(path: &Path) -> Result<Self, PersistenceError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl OutcomeSink for JsonlOutcomeSink {
    fn append(&self, records: &[OutcomeRecord]) -> Result<(), PersistenceError> {
        let mut buf = Vec::new();
        for r in records {
            serde_json::to_writer(&mut buf, r)?;
            buf.push(b'\n');
        }
        let mut f = self
            .file
            .lock()
            .map_err(|_| PersistenceError::Unavailable("outcome sink poisoned".into()))?;
        f.write_all(&buf)?;
        f.flush()?;
        Ok(())
    }
}
