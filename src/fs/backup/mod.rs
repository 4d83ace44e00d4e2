//! Backup subsystem: per-run snapshots with JSON sidecars.
//!
//! Layout: `<backup_root>/<run_id>/<YYYYMMDDTHHMMSS_ffffff>/<resource_relative_path>`
//! plus `<payload>.meta.json` recording size, SHA-256, and permission bits.

pub mod index;
pub mod restore;
pub mod sidecar;
pub mod snapshot;

use std::path::{Path, PathBuf};

use crate::types::{BackupError, BackupRecord, ResourceId, RestoreError};

pub use index::earliest_per_resource;
pub use snapshot::timestamp_dir_name;

/// Snapshot storage used by the orchestrator. Implementations must be shareable
/// across worker threads.
pub trait BackupStore: Send + Sync {
    /// Copy the resource's current bytes to durable storage for `run_id`.
    ///
    /// # Errors
    ///
    /// Returns a `BackupError` when the copy cannot be made or fails verification.
    fn snapshot(&self, run_id: &str, resource: &ResourceId) -> Result<BackupRecord, BackupError>;

    /// Overwrite the resource with the snapshot's bytes.
    ///
    /// # Errors
    ///
    /// Returns a `RestoreError` when the payload is missing or corrupted, or the
    /// resource cannot be rewritten.
    fn restore(&self, record: &BackupRecord) -> Result<(), RestoreError>;

    /// Every snapshot taken for `run_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the backup tree cannot be listed.
    fn records_for_run(&self, run_id: &str) -> std::io::Result<Vec<BackupRecord>>;
}

/// Filesystem-backed store rooted at `backup_root`.
#[derive(Debug, Clone)]
pub struct FsBackupStore {
    workspace: PathBuf,
    backup_root: PathBuf,
    tag: String,
}

impl FsBackupStore {
    pub fn new(workspace: &Path, backup_root: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
            backup_root: backup_root.into(),
            tag: tag.into(),
        }
    }

    #[must_use]
    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }
}

impl BackupStore for FsBackupStore {
    fn snapshot(&self, run_id: &str, resource: &ResourceId) -> Result<BackupRecord, BackupError> {
        self.create_snapshot(run_id, resource)
    }

    fn restore(&self, record: &BackupRecord) -> Result<(), RestoreError> {
        self.restore_snapshot(record)
    }

    fn records_for_run(&self, run_id: &str) -> std::io::Result<Vec<BackupRecord>> {
        self.list_records(run_id)
    }
}
