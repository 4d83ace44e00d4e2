use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::adapters::OutcomeSink;
use crate::fs::BackupStore;
use crate::health::HealthMonitor;
use crate::logging::audit::AuditCtx;
use crate::logging::AuditSink;
use crate::policy::Policy;
use crate::rules::RuleSet;
use crate::types::RestoreError;

use super::admission::AdmissionControl;
use super::seen::SeenSet;

/// Shared state of one run, borrowed by every worker.
///
/// Lock order: `admission` may be held while `health` or `fatal` is taken, never
/// the other way round.
pub(crate) struct RunContext<'a> {
    pub workspace: &'a Path,
    /// Snapshots live here; nothing under it is ever remediated.
    backup_root: PathBuf,
    pub rules: &'a RuleSet,
    pub backup: &'a dyn BackupStore,
    pub sink: &'a dyn OutcomeSink,
    pub audit: &'a dyn AuditSink,
    pub tctx: AuditCtx<'a>,
    pub admission: AdmissionControl,
    health: Mutex<HealthMonitor>,
    seen: Mutex<SeenSet>,
    fatal: Mutex<Option<RestoreError>>,
    deadline: Option<Instant>,
}

fn relock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<'a> RunContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        policy: &'a Policy,
        workspace: &'a Path,
        rules: &'a RuleSet,
        backup: &'a dyn BackupStore,
        sink: &'a dyn OutcomeSink,
        audit: &'a dyn AuditSink,
        tctx: AuditCtx<'a>,
        started: Instant,
    ) -> Self {
        Self {
            workspace,
            backup_root: policy.backup_root(workspace),
            rules,
            backup,
            sink,
            audit,
            tctx,
            admission: AdmissionControl::new(policy.pool.workers),
            health: Mutex::new(HealthMonitor::new(policy.health.clone())),
            seen: Mutex::new(SeenSet::new(policy.seen_capacity)),
            fatal: Mutex::new(None),
            deadline: policy.run_budget.map(|b| started + b),
        }
    }

    /// True when `path` lies inside the backup tree.
    pub(crate) fn in_backup_tree(&self, path: &Path) -> bool {
        if path.starts_with(&self.backup_root) {
            return true;
        }
        match (path.canonicalize(), self.backup_root.canonicalize()) {
            (Ok(p), Ok(root)) => p.starts_with(root),
            _ => false,
        }
    }

    pub(crate) fn health(&self) -> MutexGuard<'_, HealthMonitor> {
        relock(&self.health)
    }

    pub(crate) fn seen(&self) -> MutexGuard<'_, SeenSet> {
        relock(&self.seen)
    }

    /// True once no further batch may be dispatched: the breaker is HALTED, or the
    /// run budget ran out (which halts it).
    pub(crate) fn should_stop(&self) -> bool {
        let mut health = self.health();
        if !health.is_halted() && self.deadline.is_some_and(|d| Instant::now() >= d) {
            health.halt("run budget exhausted");
        }
        health.is_halted()
    }

    /// Record a failed restore. Only the first one is kept; every one halts the run.
    pub(crate) fn record_fatal(&self, err: RestoreError) {
        self.health().halt(format!("restore failed: {err}"));
        let mut fatal = relock(&self.fatal);
        if fatal.is_none() {
            *fatal = Some(err);
        }
    }

    pub(crate) fn take_fatal(&self) -> Option<RestoreError> {
        relock(&self.fatal).take()
    }
}
