//! A panicking rule fails only its own violation; the rest of the batch still lands.

use mendyard::policy::Policy;
use mendyard::rules::RuleSet;
use mendyard::types::{BatchStatus, ViolationStatus};
use mendyard::RunOptions;

use crate::common::{api, read, viol, workspace, PanickingRule, TestEmitter};

#[test]
fn panic_is_contained_to_one_violation() {
    let td = workspace(&[("a.py", "x = 1  \ny = 2\n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let api = api(&facts, Policy::default(), root)
        .with_rules(RuleSet::builtin().with_rule(PanickingRule("X900")));

    let report = api
        .run(
            api.plan(vec![viol("a.py", 1, "W291", ""), viol("a.py", 2, "X900", "")]),
            RunOptions::default(),
        )
        .unwrap();
    assert_eq!(read(root, "a.py"), "x = 1\ny = 2\n");
    let b = &report.batches[0];
    assert_eq!(b.status, BatchStatus::Partial);
    assert_eq!(b.successes, 1);
    assert_eq!(b.failures, 1);
    let panicked = b.outcomes.iter().find(|o| o.code == "X900").unwrap();
    assert_eq!(panicked.status, ViolationStatus::Failed);
    assert!(panicked.reason.starts_with("rule-error"));
    assert!(report.is_success());
}
