// Facade for API module; delegates to submodules under src/api/

use std::path::{Path, PathBuf};

use crate::adapters::{LockManager, NullOutcomeSink, OutcomeSink};
use crate::fs::{BackupStore, FsBackupStore};
use crate::logging::{AuditSink, FactsEmitter};
use crate::policy::Policy;
use crate::rules::RuleSet;
use crate::types::{Batch, Priority, RollbackReport, RunReport, Violation};

mod admission;
mod batch;
mod builder;
mod context;
pub mod errors;
mod plan;
mod rollback;
mod run;
mod seen;

pub use builder::MendyardBuilder;

/// Per-run admission knobs.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Dispatch at most this many batches (after filtering).
    pub max_batches: Option<usize>,
    /// Only dispatch batches of this priority.
    pub priority_filter: Option<Priority>,
    /// Reuse a caller-chosen run id instead of generating one.
    pub run_id: Option<String>,
}

pub struct Mendyard<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    workspace: PathBuf,
    rules: RuleSet,
    backup: Box<dyn BackupStore>,
    sink: Box<dyn OutcomeSink>,
    lock: Option<Box<dyn LockManager>>, // None in tests; the CLI always installs one
}

impl<E: FactsEmitter, A: AuditSink> Mendyard<E, A> {
    /// New orchestrator over `workspace` with the built-in rules, a filesystem backup
    /// store at `policy.backup_root(workspace)`, and no outcome persistence.
    pub fn new(facts: E, audit: A, policy: Policy, workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        let backup = FsBackupStore::new(
            &workspace,
            policy.backup_root(&workspace),
            policy.backup.tag.clone(),
        );
        Self {
            facts,
            audit,
            policy,
            workspace,
            rules: RuleSet::builtin(),
            backup: Box::new(backup),
            sink: Box::new(NullOutcomeSink),
            lock: None,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_backup_store(mut self, store: Box<dyn BackupStore>) -> Self {
        self.backup = store;
        self
    }

    pub fn with_outcome_sink(mut self, sink: Box<dyn OutcomeSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_lock_manager(mut self, lock: Box<dyn LockManager>) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Turn a flat violation list into batches in dispatch order.
    pub fn plan(&self, violations: Vec<Violation>) -> Vec<Batch> {
        plan::build(self, violations)
    }

    /// Remediate `batches` on the worker pool.
    ///
    /// A report is produced whenever the run got as far as dispatching, including
    /// when the circuit breaker halted it early.
    ///
    /// # Errors
    ///
    /// `PolicyViolation` for an invalid policy, `LockingTimeout` when another run
    /// holds the workspace, `WorkerPool` when threads cannot be spawned, and
    /// `RestoreFailed` (carrying the partial report) when a rollback could not be
    /// completed.
    pub fn run(&self, batches: Vec<Batch>, opts: RunOptions) -> Result<RunReport, errors::ApiError> {
        run::run(self, batches, opts)
    }

    /// Restore every resource touched by `run_id` from its earliest snapshot.
    ///
    /// # Errors
    ///
    /// Fails when the lock cannot be taken or the backup tree cannot be listed.
    /// Individual restore failures are reported in `RollbackReport::errors`.
    pub fn rollback_run(&self, run_id: &str) -> Result<RollbackReport, errors::ApiError> {
        rollback::rollback_run(self, run_id)
    }
}
