//! A batch that meets content this run already produced is skipped without a snapshot.

use mendyard::policy::Policy;
use mendyard::types::{BatchStatus, ViolationStatus};
use mendyard::RunOptions;
use uuid::Uuid;

use crate::common::{api, read, viol, workspace, TestEmitter};

#[test]
fn repeated_batch_on_same_content_is_skipped() {
    let td = workspace(&[("a.py", "x = 1  \ny = 2\n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.pool.workers = 2;
    let api = api(&facts, policy, root);

    let first = api.plan(vec![viol("a.py", 1, "W291", "")]).remove(0);
    let mut second = first.clone();
    second.batch_id = Uuid::new_v4();

    let report = api.run(vec![first, second], RunOptions::default()).unwrap();
    assert_eq!(read(root, "a.py"), "x = 1\ny = 2\n");
    assert_eq!(report.batches.len(), 2);

    let dup = &report.batches[1];
    assert_eq!(dup.status, BatchStatus::Completed);
    assert_eq!(dup.skipped, 1);
    assert!(dup.backup.is_none());
    assert_eq!(dup.outcomes[0].status, ViolationStatus::Skipped);
    assert_eq!(dup.outcomes[0].reason, "duplicate-content");
    assert_eq!(report.successes, 1);
    assert_eq!(report.failures, 0);
}
