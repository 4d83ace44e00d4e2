//! Error types used across Mendyard.
//!
//! Pipeline-stage errors follow the remediation taxonomy: rule errors are
//! recovered per violation, backup errors abort a single batch, restore errors
//! abort the whole run, persistence errors are logged and swallowed.
use std::path::PathBuf;

use thiserror::Error;

/// High-level error categories for type-level operations and adapters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("invalid path")]
    InvalidPath,
    #[error("io error")]
    Io,
    #[error("policy violation")]
    Policy,
    #[error("invalid configuration")]
    Config,
    #[error("lock acquisition timed out")]
    Locking,
    #[error("malformed input")]
    Input,
}

/// Structured error with a kind and human message.
#[derive(Debug, Error)]
#[error("{kind:?}: {msg}")]
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

impl Error {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }
}

/// Convenient alias for results returning a `types::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single rule application. Recovered locally; never aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleApplicationError {
    #[error("rule {code} rejected line: {reason}")]
    Rejected { code: String, reason: String },
    #[error("rule {code} panicked")]
    Panicked { code: String },
}

/// Snapshot failure. Aborts the batch before any mutation is attempted.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("resource unreadable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot write failed: {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot integrity check failed for {path}: expected {expected} bytes, found {actual}")]
    Integrity {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
    #[error("snapshot hash mismatch for {path}")]
    HashMismatch { path: PathBuf },
}

/// Restore failure. The safety invariant is broken; the run must stop.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("snapshot payload missing or unreadable: {path}: {source}")]
    PayloadUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot payload corrupted: {path}")]
    PayloadCorrupted { path: PathBuf },
    #[error("restore write failed: {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("restored content does not match snapshot: {path}")]
    Verify { path: PathBuf },
}

/// Outcome persistence failure. Audit-only; logged and swallowed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("outcome sink io: {0}")]
    Io(#[from] std::io::Error),
    #[error("outcome encoding: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("outcome sink unavailable: {0}")]
    Unavailable(String),
}

/// Failure while writing remediated content back to a resource.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("write {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("written content of {path} does not match remediated content")]
    Verify { path: PathBuf },
}

/// Batch-level failure: triggers rollback (when a snapshot exists) and marks the batch failed.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("backup: {0}")]
    Backup(#[from] BackupError),
    #[error("write: {0}")]
    Write(#[from] WriteError),
    #[error("resource unreadable: {0}")]
    Read(std::io::Error),
    #[error("rule engine aborted")]
    Engine,
}
