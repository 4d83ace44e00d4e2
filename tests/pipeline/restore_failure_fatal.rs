//! A restore that cannot complete stops the run and surfaces as `RestoreFailed`.

use mendyard::api::errors::{ApiError, ErrorId};
use mendyard::policy::Policy;
use mendyard::types::HealthStatus;
use mendyard::RunOptions;

use crate::common::{api, viol, workspace, FaultyStore, TestEmitter};

#[test]
fn failed_restore_aborts_run_with_partial_report() {
    let td = workspace(&[
        ("a.py", "x = 1   \n"),
        ("b.py", "y = 2   \n"),
        ("c.py", "z = 3   \n"),
    ]);
    let root = td.path();
    std::fs::create_dir(root.join(".a.py.mendyard.tmp")).unwrap();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.pool.workers = 1;
    let mut store = FaultyStore::over(root, &policy);
    store.fail_restore = true;
    let api = api(&facts, policy, root).with_backup_store(Box::new(store));

    let batches = api.plan(vec![
        viol("a.py", 1, "W291", ""),
        viol("b.py", 1, "W291", ""),
        viol("c.py", 1, "W291", ""),
    ]);
    let err = api.run(batches, RunOptions::default()).unwrap_err();
    assert_eq!(err.id(), ErrorId::E_RESTORE_FAILED);
    assert_eq!(err.exit_code(), 70);

    let ApiError::RestoreFailed { report, .. } = err else {
        panic!("expected RestoreFailed");
    };
    assert!(report.halted);
    assert_eq!(report.health_final, HealthStatus::Halted);
    assert!(report.halt_reason.as_deref().unwrap().starts_with("restore failed"));
    assert_eq!(report.batches_completed, 1);
    assert_eq!(report.batches_not_dispatched, 2);
    assert!(!report.batches[0].rolled_back);

    let rollback = facts.named("rollback");
    assert_eq!(rollback[0].0, "failure");
    assert_eq!(rollback[0].1["error_id"], "E_RESTORE_FAILED");
    let summary = facts.named("run.summary");
    assert_eq!(summary[0].0, "failure");
    assert_eq!(summary[0].1["exit_code"], 70);
    assert_eq!(facts.named("batch.attempt").len(), 1);
}
