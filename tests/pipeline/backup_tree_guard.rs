//! Snapshots are never remediated, even when a report points at them.

use std::path::PathBuf;

use mendyard::policy::Policy;
use mendyard::types::{BatchStatus, ViolationStatus};
use mendyard::RunOptions;

use crate::common::{api, read, viol, workspace, TestEmitter};

#[test]
fn violations_inside_backup_tree_are_skipped() {
    let td = workspace(&[("a.py", "x = 1   \n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let api = api(&facts, Policy::default(), root);

    let first = api
        .run(
            api.plan(vec![viol("a.py", 1, "W291", "")]),
            RunOptions {
                run_id: Some("run_one".into()),
                ..RunOptions::default()
            },
        )
        .unwrap();
    assert_eq!(read(root, "a.py"), "x = 1\n");
    let snapshot: PathBuf = first.batches[0].backup.clone().unwrap();
    let snapshot_rel = snapshot.strip_prefix(root).unwrap().to_str().unwrap().to_string();
    assert!(snapshot_rel.starts_with(".mendyard/backups/run_one/"), "{snapshot_rel}");

    // A linter scan of the whole workspace also reports the snapshot copy
    let second = api
        .run(api.plan(vec![viol(&snapshot_rel, 1, "W291", "")]), RunOptions::default())
        .unwrap();
    let b = &second.batches[0];
    assert_eq!(b.status, BatchStatus::Completed);
    assert!(b.backup.is_none());
    assert_eq!(b.outcomes[0].status, ViolationStatus::Skipped);
    assert_eq!(b.outcomes[0].reason, "backup-tree");
    assert_eq!(second.successes, 0);
    assert_eq!(std::fs::read_to_string(&snapshot).unwrap(), "x = 1   \n");

    let rb = api.rollback_run("run_one").unwrap();
    assert!(rb.errors.is_empty(), "{:?}", rb.errors);
    assert_eq!(read(root, "a.py"), "x = 1   \n");
}

#[test]
fn configured_backup_root_is_guarded() {
    let td = workspace(&[("state/bk/old.py", "y = 2 \n"), ("b.py", "z = 3 \n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.backup.root = PathBuf::from("state/bk");
    let api = api(&facts, policy, root);

    let report = api
        .run(
            api.plan(vec![viol("state/bk/old.py", 1, "W291", ""), viol("b.py", 1, "W291", "")]),
            RunOptions::default(),
        )
        .unwrap();
    assert_eq!(read(root, "state/bk/old.py"), "y = 2 \n");
    assert_eq!(read(root, "b.py"), "z = 3\n");
    assert_eq!(report.successes, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failures, 0);
}
