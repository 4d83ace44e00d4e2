use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::batch::{BatchStatus, Priority};
use super::health::HealthStatus;
use super::resource::ResourceId;
use super::violation::ViolationStatus;

/// Result of attempting one violation inside the rule engine or the orchestrator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub violation_id: String,
    pub code: String,
    pub line: u32,
    pub applied: bool,
    pub reason: String,
    pub status: ViolationStatus,
}

pub mod reason {
    pub const FIXED: &str = "fixed";
    pub const NO_OP: &str = "no-op";
    pub const NO_RULE: &str = "no-rule";
    pub const LINE_OUT_OF_RANGE: &str = "line-out-of-range";
    pub const DUPLICATE_CONTENT: &str = "duplicate-content";
    pub const BACKUP_TREE: &str = "backup-tree";
    pub const RULE_ERROR_PREFIX: &str = "rule-error";
    pub const BATCH_FAILED_PREFIX: &str = "batch-failed";
}

/// Snapshot bookkeeping owned by the backup store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub resource_id: ResourceId,
    pub snapshot_path: PathBuf,
    pub size: u64,
    pub sha256: String,
    /// RFC 3339.
    pub created_at: String,
}

/// Summary of one dispatched batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub resource_id: ResourceId,
    pub priority: Priority,
    pub status: BatchStatus,
    pub successes: u64,
    pub failures: u64,
    pub skipped: u64,
    pub rolled_back: bool,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    pub outcomes: Vec<RuleOutcome>,
}

/// Final report of a run. Always produced, even when halted early.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub batches_total: u64,
    pub batches_completed: u64,
    pub batches_failed: u64,
    pub batches_not_dispatched: u64,
    pub successes: u64,
    pub failures: u64,
    pub skipped: u64,
    pub health_final: HealthStatus,
    pub halted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halt_reason: Option<String>,
    pub duration_seconds: f64,
    pub batches: Vec<BatchSummary>,
}

impl RunReport {
    /// CLI success criterion: something was fixed, or nothing failed.
    pub fn is_success(&self) -> bool {
        self.successes > 0 || self.failures == 0
    }
}

/// Report of a whole-run rollback.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RollbackReport {
    pub run_id: String,
    pub restored: Vec<ResourceId>,
    pub errors: Vec<String>,
}
