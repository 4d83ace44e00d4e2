//! A failed write after the snapshot restores the resource and fails the batch.

use mendyard::policy::Policy;
use mendyard::types::{BatchStatus, ViolationStatus};
use mendyard::RunOptions;

use crate::common::{api, read, viol, workspace, TestEmitter};

#[test]
fn blocked_write_is_rolled_back() {
    let td = workspace(&[("a.py", "x = 1   \n"), ("b.py", "y = 2   \n")]);
    let root = td.path();
    // A directory squatting on the write temporary makes the atomic write fail
    std::fs::create_dir(root.join(".a.py.mendyard.tmp")).unwrap();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.pool.workers = 1;
    let api = api(&facts, policy, root);

    let report = api
        .run(
            api.plan(vec![viol("a.py", 1, "W291", ""), viol("b.py", 1, "W291", "")]),
            RunOptions::default(),
        )
        .unwrap();

    assert_eq!(read(root, "a.py"), "x = 1   \n");
    assert_eq!(read(root, "b.py"), "y = 2\n");
    let a = &report.batches[0];
    assert_eq!(a.resource_id.as_str(), "a.py");
    assert_eq!(a.status, BatchStatus::Failed);
    assert!(a.rolled_back);
    assert!(a.backup.is_some());
    assert_eq!(a.outcomes[0].status, ViolationStatus::Failed);
    assert_eq!(report.batches_failed, 1);
    assert_eq!(report.successes, 1);
    assert_eq!(report.failures, 1);

    let rollbacks = facts.named("rollback");
    assert_eq!(rollbacks.len(), 1);
    assert_eq!(rollbacks[0].0, "success");
    assert_eq!(rollbacks[0].1["resource"], "a.py");
    let failure = facts
        .named("batch.result")
        .into_iter()
        .find(|(d, _)| d == "failure")
        .unwrap();
    assert_eq!(failure.1["error_id"], "E_WRITE");
    assert_eq!(failure.1["rolled_back"], true);
}
