//! A snapshot failure fails only its own batch; the file is never touched and the
//! other batches complete.

use mendyard::policy::Policy;
use mendyard::types::{BatchStatus, ViolationStatus};
use mendyard::RunOptions;

use crate::common::{api, read, viol, workspace, FaultyStore, TestEmitter};

#[test]
fn snapshot_failure_on_third_of_ten_batches() {
    let files: Vec<(String, String)> = (0..10)
        .map(|i| (format!("f{i:02}.py"), format!("v = {i}   \n")))
        .collect();
    let refs: Vec<(&str, &str)> = files.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let td = workspace(&refs);
    let root = td.path();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.pool.workers = 2;
    let mut store = FaultyStore::over(root, &policy);
    store.fail_snapshot_for = Some("f02.py".into());
    let api = api(&facts, policy, root).with_backup_store(Box::new(store));

    let violations = files.iter().map(|(rel, _)| viol(rel, 1, "W291", "")).collect();
    let batches = api.plan(violations);
    assert_eq!(batches[2].resource_id.as_str(), "f02.py");

    let report = api.run(batches, RunOptions::default()).unwrap();
    assert_eq!(report.batches_completed, 10);
    assert_eq!(report.batches_failed, 1);
    assert_eq!(report.successes, 9);
    assert_eq!(report.failures, 1);
    assert!(!report.halted);
    assert!(report.is_success());

    let failed = report
        .batches
        .iter()
        .find(|b| b.resource_id.as_str() == "f02.py")
        .unwrap();
    assert_eq!(failed.status, BatchStatus::Failed);
    assert!(!failed.rolled_back);
    assert!(failed.backup.is_none());
    assert!(failed.error.as_deref().unwrap().contains("injected snapshot failure"));
    assert_eq!(failed.outcomes[0].status, ViolationStatus::Failed);
    assert!(failed.outcomes[0].reason.starts_with("batch-failed"));

    assert_eq!(read(root, "f02.py"), "v = 2   \n");
    for (i, (rel, _)) in files.iter().enumerate().filter(|(i, _)| *i != 2) {
        assert_eq!(read(root, rel), format!("v = {i}\n"));
    }

    let results = facts.named("batch.result");
    let failure = results
        .iter()
        .find(|(d, _)| d == "failure")
        .expect("failed batch.result");
    assert_eq!(failure.1["error_id"], "E_BACKUP");
    assert_eq!(failure.1["resource"], "f02.py");
}
