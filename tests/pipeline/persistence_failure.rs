//! An unavailable outcome sink is logged and never changes batch results.

use mendyard::policy::Policy;
use mendyard::types::BatchStatus;
use mendyard::RunOptions;

use crate::common::{api, read, viol, workspace, FailingSink, TestEmitter};

#[test]
fn sink_failure_is_swallowed() {
    let td = workspace(&[("a.py", "x = 1 \n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let api = api(&facts, Policy::default(), root).with_outcome_sink(Box::new(FailingSink));

    let report = api
        .run(api.plan(vec![viol("a.py", 1, "W291", "")]), RunOptions::default())
        .unwrap();
    assert_eq!(read(root, "a.py"), "x = 1\n");
    assert_eq!(report.successes, 1);
    assert_eq!(report.failures, 0);
    assert_eq!(report.batches[0].status, BatchStatus::Completed);
    assert!(report.is_success());

    let results = facts.named("batch.result");
    let persist: Vec<_> = results
        .iter()
        .filter(|(_, f)| f["error_id"] == "E_PERSIST")
        .collect();
    assert_eq!(persist.len(), 1);
    assert_eq!(persist[0].0, "warn");
    assert!(results.iter().any(|(d, f)| d == "success" && f["status"] == "completed"));
}
