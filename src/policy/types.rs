use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ADJACENT_PREFIXES, DEFAULT_BACKUP_ROOT, DEFAULT_BACKUP_TAG, DEFAULT_BULK_THRESHOLD,
    DEFAULT_DURATION_CEILING_SECS, DEFAULT_FAILURE_CEILING, DEFAULT_FATAL_PREFIXES,
    DEFAULT_GRACE_BATCHES, DEFAULT_SUCCESS_FLOOR, DEFAULT_WORKERS,
};

#[derive(Clone, Debug)]
pub struct Pool {
    pub workers: usize,
}

impl Default for Pool {
    fn default() -> Self {
        Self { workers: DEFAULT_WORKERS }
    }
}

/// Code-prefix classes and the bulk threshold driving batch priority.
#[derive(Clone, Debug)]
pub struct PrioritySettings {
    pub fatal_prefixes: Vec<String>,
    pub adjacent_prefixes: Vec<String>,
    pub bulk_threshold: usize,
}

impl Default for PrioritySettings {
    fn default() -> Self {
        Self {
            fatal_prefixes: DEFAULT_FATAL_PREFIXES.iter().map(|s| s.to_string()).collect(),
            adjacent_prefixes: DEFAULT_ADJACENT_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bulk_threshold: DEFAULT_BULK_THRESHOLD,
        }
    }
}

impl PrioritySettings {
    pub fn is_fatal(&self, code: &str) -> bool {
        self.fatal_prefixes.iter().any(|p| code.starts_with(p.as_str()))
    }

    pub fn is_adjacent(&self, code: &str) -> bool {
        self.adjacent_prefixes
            .iter()
            .any(|p| code.starts_with(p.as_str()))
    }
}

/// Circuit breaker thresholds.
#[derive(Clone, Debug)]
pub struct HealthThresholds {
    pub success_floor: f64,
    pub failure_ceiling: u64,
    pub duration_ceiling: Duration,
    pub grace_batches: u64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            success_floor: DEFAULT_SUCCESS_FLOOR,
            failure_ceiling: DEFAULT_FAILURE_CEILING,
            duration_ceiling: Duration::from_secs(DEFAULT_DURATION_CEILING_SECS),
            grace_batches: DEFAULT_GRACE_BATCHES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Backup {
    /// Relative paths are resolved against the workspace root.
    pub root: PathBuf,
    pub tag: String,
}

impl Default for Backup {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_BACKUP_ROOT),
            tag: DEFAULT_BACKUP_TAG.to_string(),
        }
    }
}
