use std::path::PathBuf;

use crate::adapters::{LockManager, OutcomeSink};
use crate::fs::BackupStore;
use crate::logging::{AuditSink, FactsEmitter};
use crate::policy::Policy;
use crate::rules::RuleSet;

/// Builder for constructing a Mendyard with ergonomic chaining.
/// Mirrors `Mendyard::new(...).with_*` but keeps optional adapters in one place.
pub struct MendyardBuilder<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    workspace: PathBuf,
    rules: Option<RuleSet>,
    backup: Option<Box<dyn BackupStore>>,
    sink: Option<Box<dyn OutcomeSink>>,
    lock: Option<Box<dyn LockManager>>,
}

impl<E: FactsEmitter, A: AuditSink> MendyardBuilder<E, A> {
    pub fn new(facts: E, audit: A, policy: Policy, workspace: impl Into<PathBuf>) -> Self {
        Self {
            facts,
            audit,
            policy,
            workspace: workspace.into(),
            rules: None,
            backup: None,
            sink: None,
            lock: None,
        }
    }

    #[must_use]
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    #[must_use]
    pub fn backup_store(mut self, store: Box<dyn BackupStore>) -> Self {
        self.backup = Some(store);
        self
    }

    #[must_use]
    pub fn outcome_sink(mut self, sink: Box<dyn OutcomeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn lock_manager(mut self, lock: Box<dyn LockManager>) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn build(self) -> super::Mendyard<E, A> {
        let mut api = super::Mendyard::new(self.facts, self.audit, self.policy, self.workspace);
        if let Some(r) = self.rules {
            api = api.with_rules(r);
        }
        if let Some(b) = self.backup {
            api = api.with_backup_store(b);
        }
        if let Some(s) = self.sink {
            api = api.with_outcome_sink(s);
        }
        if let Some(l) = self.lock {
            api = api.with_lock_manager(l);
        }
        api
    }
}
