//! Shared crate-wide constants for Mendyard.
//!
//! Centralizes default thresholds and labels used across modules.
//! Adjusting these here will propagate through the crate.

/// Default worker pool size used by the orchestrator.
pub const DEFAULT_WORKERS: usize = 4;

/// Upper bound accepted for the worker pool size.
pub const MAX_WORKERS: usize = 64;

/// Code prefixes that classify a batch as CRITICAL (undefined names, syntax errors).
pub const DEFAULT_FATAL_PREFIXES: &[&str] = &["F8", "E9"];

/// Code prefixes counted as fatal-adjacent for the HIGH classification.
pub const DEFAULT_ADJACENT_PREFIXES: &[&str] = &["E"];

/// Groups larger than this many violations are classified MEDIUM when nothing else applies.
pub const DEFAULT_BULK_THRESHOLD: usize = 20;

/// Minimum cumulative success rate before health degrades to WARNING.
pub const DEFAULT_SUCCESS_FLOOR: f64 = 0.75;

/// Failures within a single batch above which health becomes CRITICAL.
pub const DEFAULT_FAILURE_CEILING: u64 = 5;

/// Batch duration above which health degrades to WARNING.
pub const DEFAULT_DURATION_CEILING_SECS: u64 = 300;

/// Number of completed batches that must be exceeded before CRITICAL may halt the run.
pub const DEFAULT_GRACE_BATCHES: u64 = 5;

/// Default capacity of the per-run seen-content LRU.
pub const DEFAULT_SEEN_CAPACITY: usize = 4096;

/// Backup root, relative to the workspace root unless configured absolute.
pub const DEFAULT_BACKUP_ROOT: &str = ".mendyard/backups";

/// Tag recorded in backup sidecars.
pub const DEFAULT_BACKUP_TAG: &str = "mendyard";

/// Sidecar suffix appended to a snapshot payload path.
pub const SIDECAR_SUFFIX: &str = ".meta.json";

/// Sidecar schema identifier.
pub const SIDECAR_SCHEMA: &str = "mendyard.backup.v1";

/// Temporary filename suffix used when writing remediated content.
/// The temporary name is constructed as `.{fname}{TMP_SUFFIX}`; e.g., `.app.py.mendyard.tmp`.
pub const TMP_SUFFIX: &str = ".mendyard.tmp";

/// Temporary filename suffix used when restoring a snapshot over a resource.
pub const RESTORE_TMP_SUFFIX: &str = ".mendyard.restore.tmp";

/// Poll interval in milliseconds for the file-backed lock manager.
pub const LOCK_POLL_MS: u64 = 25;

/// Default run lock timeout.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Lock file name placed under the backup root when a file lock manager is used.
pub const LOCK_FILE_NAME: &str = "mendyard.lock";

/// Config file discovered in the workspace root.
pub const CONFIG_FILE_NAME: &str = "mendyard.toml";

/// UUIDv5 namespace tag for deterministic batch ids.
pub const NS_TAG: &str = "https://mendyard.dev/batch";

/// Maximum line length used by the long-line splitting rule.
pub const MAX_LINE_LENGTH: usize = 79;
