//! Fixes land on disk, a snapshot exists, and every stage reports success.

use mendyard::policy::Policy;
use mendyard::types::{BatchStatus, HealthStatus, ViolationStatus};
use mendyard::RunOptions;

use crate::common::{api, read, viol, workspace, TestEmitter};

#[test]
fn trailing_whitespace_is_fixed_and_snapshotted() {
    let td = workspace(&[("pkg/a.py", "x = 1   \ny = 2\t\nz = 3\n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let api = api(&facts, Policy::default(), root);

    let batches = api.plan(vec![
        viol("pkg/a.py", 1, "W291", "trailing whitespace"),
        viol("pkg/a.py", 2, "W291", "trailing whitespace"),
    ]);
    assert_eq!(batches.len(), 1);

    let report = api.run(batches, RunOptions::default()).unwrap();
    assert_eq!(read(root, "pkg/a.py"), "x = 1\ny = 2\nz = 3\n");
    assert_eq!(report.batches_total, 1);
    assert_eq!(report.batches_completed, 1);
    assert_eq!(report.successes, 2);
    assert_eq!(report.failures, 0);
    assert_eq!(report.health_final, HealthStatus::Healthy);
    assert!(!report.halted);
    assert!(report.is_success());

    let b = &report.batches[0];
    assert_eq!(b.status, BatchStatus::Completed);
    assert!(!b.rolled_back);
    assert!(b.outcomes.iter().all(|o| o.status == ViolationStatus::Fixed && o.applied));
    let snap = b.backup.as_ref().expect("snapshot path");
    assert!(snap.starts_with(root.join(".mendyard/backups").join(&report.run_id)));
    assert_eq!(std::fs::read_to_string(snap).unwrap(), "x = 1   \ny = 2\t\nz = 3\n");

    assert_eq!(facts.named("plan").len(), 1);
    assert_eq!(facts.named("batch.attempt").len(), 1);
    let results = facts.named("batch.result");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "success");
    assert_eq!(results[0].1["run_id"], report.run_id.as_str());
    assert_eq!(results[0].1["resource"], "pkg/a.py");
    let summary = facts.named("run.summary");
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].0, "success");
    assert_eq!(summary[0].1["successes"], 2);
}

#[test]
fn unknown_codes_are_skipped_without_touching_content() {
    let td = workspace(&[("a.py", "import os\n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let api = api(&facts, Policy::default(), root);
    let batches = api.plan(vec![viol("a.py", 1, "Z999", "made up")]);
    let report = api.run(batches, RunOptions::default()).unwrap();
    assert_eq!(read(root, "a.py"), "import os\n");
    assert_eq!(report.skipped, 1);
    assert_eq!(report.batches[0].outcomes[0].reason, "no-rule");
    assert!(report.is_success());
}

#[test]
fn max_batches_and_priority_filter_limit_admission() {
    let td = workspace(&[
        ("a.py", "a = 1 \n"),
        ("b.py", "b = 2 \n"),
        ("c.py", "foo( 1)\n"),
    ]);
    let root = td.path();
    let facts = TestEmitter::default();
    let api = api(&facts, Policy::default(), root);
    let violations = vec![
        viol("a.py", 1, "W291", ""),
        viol("b.py", 1, "W291", ""),
        viol("c.py", 1, "E201", "whitespace after '('"),
    ];

    let report = api
        .run(
            api.plan(violations.clone()),
            RunOptions {
                max_batches: Some(1),
                ..RunOptions::default()
            },
        )
        .unwrap();
    assert_eq!(report.batches_total, 1);
    assert_eq!(report.batches[0].resource_id.as_str(), "c.py");

    let report = api
        .run(
            api.plan(violations),
            RunOptions {
                priority_filter: Some(mendyard::types::Priority::Low),
                ..RunOptions::default()
            },
        )
        .unwrap();
    assert_eq!(report.batches_total, 2);
    assert!(report
        .batches
        .iter()
        .all(|b| b.priority == mendyard::types::Priority::Low));
}
