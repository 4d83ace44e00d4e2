//! With one worker, batches are attempted strictly in priority order.

use mendyard::policy::Policy;
use mendyard::types::Priority;
use mendyard::RunOptions;

use crate::common::{api, viol, workspace, TestEmitter};

#[test]
fn critical_high_medium_low_dispatch_order() {
    let bulk: String = (0..25).map(|i| format!("v{i} = {i} \n")).collect();
    let td = workspace(&[
        ("a_low.py", "x = 1 \n"),
        ("b_medium.py", bulk.as_str()),
        ("c_high.py", "foo( 1)\n"),
        ("d_critical.py", "print(undefined_name)\n"),
    ]);
    let root = td.path();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.pool.workers = 1;
    let api = api(&facts, policy, root);

    let mut violations = vec![
        viol("a_low.py", 1, "W291", ""),
        viol("c_high.py", 1, "E201", "whitespace after '('"),
        viol("d_critical.py", 1, "F821", "undefined name 'undefined_name'"),
    ];
    violations.extend((1..=25).map(|l| viol("b_medium.py", l, "W291", "")));

    let batches = api.plan(violations);
    let order: Vec<Priority> = batches.iter().map(|b| b.priority).collect();
    assert_eq!(
        order,
        vec![Priority::Critical, Priority::High, Priority::Medium, Priority::Low]
    );

    let report = api.run(batches, RunOptions::default()).unwrap();
    assert_eq!(report.batches_completed, 4);

    let attempted: Vec<String> = facts
        .named("batch.attempt")
        .iter()
        .map(|(_, f)| f["resource"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        attempted,
        vec!["d_critical.py", "c_high.py", "b_medium.py", "a_low.py"]
    );
    let reported: Vec<&str> = report.batches.iter().map(|b| b.resource_id.as_str()).collect();
    assert_eq!(reported, vec!["d_critical.py", "c_high.py", "b_medium.py", "a_low.py"]);
}
