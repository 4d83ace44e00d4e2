//! Shared test helpers for the mendyard crate integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use log::Level;
use serde_json::Value;

use mendyard::adapters::{OutcomeRecord, OutcomeSink};
use mendyard::fs::{BackupStore, FsBackupStore};
use mendyard::logging::{AuditSink, FactsEmitter};
use mendyard::policy::Policy;
use mendyard::rules::{Edit, LineContext, Rule, SafetyTier};
use mendyard::types::{
    BackupError, BackupRecord, PersistenceError, ResourceId, RestoreError, RuleApplicationError,
    Violation,
};
use mendyard::Mendyard;

/// A simple in-memory emitter to capture facts during tests.
#[derive(Clone, Default, Debug)]
pub struct TestEmitter {
    pub events: Arc<Mutex<Vec<(String, String, String, Value)>>>,
}

impl FactsEmitter for TestEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        self.events
            .lock()
            .unwrap()
            .push((subsystem.into(), event.into(), decision.into(), fields));
    }
}

impl TestEmitter {
    /// `(decision, fields)` of every fact named `event`, in emission order.
    pub fn named(&self, event: &str) -> Vec<(String, Value)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e, _, _)| e == event)
            .map(|(_, _, d, f)| (d.clone(), f.clone()))
            .collect()
    }

    /// Event names in emission order.
    pub fn sequence(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e, _, _)| e.clone())
            .collect()
    }
}

/// A no-op audit sink for tests.
#[derive(Clone, Default)]
pub struct TestAudit;

impl AuditSink for TestAudit {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Temporary workspace holding `files` (relative path, content).
pub fn workspace(files: &[(&str, &str)]) -> tempfile::TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    for (rel, body) in files {
        let p = td.path().join(rel);
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&p, body).unwrap();
    }
    td
}

pub fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}

pub fn viol(rel: &str, line: u32, code: &str, message: &str) -> Violation {
    Violation::new(ResourceId::new(rel).unwrap(), line, 1, code, message)
}

pub fn api(facts: &TestEmitter, policy: Policy, root: &Path) -> Mendyard<TestEmitter, TestAudit> {
    Mendyard::new(facts.clone(), TestAudit, policy, root)
}

/// Rule that refuses every violation reported under its code.
pub struct RejectingRule(pub &'static str);

impl Rule for RejectingRule {
    fn code(&self) -> &str {
        self.0
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::Trivial
    }
    fn apply(
        &self,
        _line: &str,
        _v: &Violation,
        _cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        Err(RuleApplicationError::Rejected {
            code: self.0.to_string(),
            reason: "refused by test".into(),
        })
    }
}

/// Rule that panics on every call.
pub struct PanickingRule(pub &'static str);

impl Rule for PanickingRule {
    fn code(&self) -> &str {
        self.0
    }
    fn tier(&self) -> SafetyTier {
        SafetyTier::Trivial
    }
    fn apply(
        &self,
        _line: &str,
        _v: &Violation,
        _cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError> {
        panic!("rule {} exploded", self.0)
    }
}

/// Filesystem store with injectable snapshot and restore failures.
pub struct FaultyStore {
    pub inner: FsBackupStore,
    pub fail_snapshot_for: Option<String>,
    pub fail_restore: bool,
}

impl FaultyStore {
    pub fn over(root: &Path, policy: &Policy) -> Self {
        Self {
            inner: FsBackupStore::new(root, policy.backup_root(root), policy.backup.tag.clone()),
            fail_snapshot_for: None,
            fail_restore: false,
        }
    }
}

impl BackupStore for FaultyStore {
    fn snapshot(&self, run_id: &str, resource: &ResourceId) -> Result<BackupRecord, BackupError> {
        if self.fail_snapshot_for.as_deref() == Some(resource.as_str()) {
            return Err(BackupError::Write {
                path: resource.rel().to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "injected snapshot failure"),
            });
        }
        self.inner.snapshot(run_id, resource)
    }

    fn restore(&self, record: &BackupRecord) -> Result<(), RestoreError> {
        if self.fail_restore {
            return Err(RestoreError::Verify {
                path: record.snapshot_path.clone(),
            });
        }
        self.inner.restore(record)
    }

    fn records_for_run(&self, run_id: &str) -> std::io::Result<Vec<BackupRecord>> {
        self.inner.records_for_run(run_id)
    }
}

/// Outcome sink that is always down.
#[derive(Default)]
pub struct FailingSink;

impl OutcomeSink for FailingSink {
    fn append(&self, _records: &[OutcomeRecord]) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("outcome store offline".into()))
    }
}
