use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_SEEN_CAPACITY, MAX_WORKERS};
use crate::types::errors::{Error, ErrorKind, Result};

use super::file::MendyardConfig;
use super::types::{Backup, HealthThresholds, Pool, PrioritySettings};

/// Policy governs prioritization, the circuit breaker, backups, and pool sizing.
///
/// Grouped fields provide clearer ownership and ergonomics.
#[derive(Clone, Debug)]
pub struct Policy {
    pub pool: Pool,
    pub priority: PrioritySettings,
    pub health: HealthThresholds,
    pub backup: Backup,
    /// Best-effort wall-clock budget for the whole run. Exhaustion behaves like HALTED.
    pub run_budget: Option<Duration>,
    pub seen_capacity: usize,
    pub lock_timeout_ms: u64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            pool: Pool::default(),
            priority: PrioritySettings::default(),
            health: HealthThresholds::default(),
            backup: Backup::default(),
            run_budget: None,
            seen_capacity: DEFAULT_SEEN_CAPACITY,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

impl Policy {
    /// Construct a Policy for cautious runs on unfamiliar code bases.
    ///
    /// - single worker, so batches complete in dispatch order
    /// - `success_floor = 0.9`, `failure_ceiling = 2`
    /// - 30 minute run budget
    #[must_use]
    pub fn conservative_preset() -> Self {
        let mut p = Self::default();
        p.apply_conservative_preset();
        p
    }

    /// Mutate this Policy to apply the conservative preset; see `conservative_preset()`.
    pub fn apply_conservative_preset(&mut self) -> &mut Self {
        self.pool.workers = 1;
        self.health.success_floor = 0.9;
        self.health.failure_ceiling = 2;
        self.run_budget = Some(Duration::from_secs(30 * 60));
        self
    }

    /// Overlay values present in a config file on top of this policy.
    pub fn merge_config(&mut self, cfg: &MendyardConfig) -> &mut Self {
        if let Some(w) = cfg.workers {
            self.pool.workers = w;
        }
        if let Some(s) = cfg.seen_capacity {
            self.seen_capacity = s;
        }
        if let Some(secs) = cfg.run_budget_secs {
            self.run_budget = Some(Duration::from_secs(secs));
        }
        if let Some(ms) = cfg.lock_timeout_ms {
            self.lock_timeout_ms = ms;
        }
        if let Some(p) = cfg.priority.as_ref() {
            if let Some(f) = p.fatal_prefixes.as_ref() {
                self.priority.fatal_prefixes = f.clone();
            }
            if let Some(a) = p.adjacent_prefixes.as_ref() {
                self.priority.adjacent_prefixes = a.clone();
            }
            if let Some(b) = p.bulk_threshold {
                self.priority.bulk_threshold = b;
            }
        }
        if let Some(h) = cfg.health.as_ref() {
            if let Some(f) = h.success_floor {
                self.health.success_floor = f;
            }
            if let Some(c) = h.failure_ceiling {
                self.health.failure_ceiling = c;
            }
            if let Some(d) = h.duration_ceiling_secs {
                self.health.duration_ceiling = Duration::from_secs(d);
            }
            if let Some(g) = h.grace_batches {
                self.health.grace_batches = g;
            }
        }
        if let Some(b) = cfg.backup.as_ref() {
            if let Some(r) = b.root.as_ref() {
                self.backup.root = PathBuf::from(r);
            }
            if let Some(t) = b.tag.as_ref() {
                self.backup.tag = t.clone();
            }
        }
        self
    }

    /// Reject values the orchestrator cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.pool.workers == 0 || self.pool.workers > MAX_WORKERS {
            return Err(Error::new(
                ErrorKind::Config,
                format!("workers must be within 1..={MAX_WORKERS}"),
            ));
        }
        if !(0.0..=1.0).contains(&self.health.success_floor) {
            return Err(Error::new(
                ErrorKind::Config,
                "health.success_floor must be within 0.0..=1.0",
            ));
        }
        if self.seen_capacity == 0 {
            return Err(Error::new(ErrorKind::Config, "seen_capacity must be > 0"));
        }
        if self.backup.tag.is_empty() {
            return Err(Error::new(ErrorKind::Config, "backup.tag must not be empty"));
        }
        Ok(())
    }

    /// Backup root resolved against the workspace root.
    pub fn backup_root(&self, workspace: &Path) -> PathBuf {
        if self.backup.root.is_absolute() {
            self.backup.root.clone()
        } else {
            workspace.join(&self.backup.root)
        }
    }
}
