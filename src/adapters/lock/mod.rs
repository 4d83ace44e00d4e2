pub mod file;

use crate::types::errors::Result;

pub use file::FileLockManager;

/// Held for the duration of a run; releasing happens on drop.
pub trait LockGuard: Send {}

/// Run-level mutual exclusion: at most one remediation run per workspace.
pub trait LockManager: Send + Sync {
    /// Acquire the process lock, waiting up to `timeout_ms`.
    /// # Errors
    /// Returns `ErrorKind::Locking` on timeout and `ErrorKind::Io` if the lock
    /// file cannot be opened.
    fn acquire_process_lock(&self, timeout_ms: u64) -> Result<Box<dyn LockGuard>>;
}
