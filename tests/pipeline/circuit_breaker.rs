//! Past the grace period, a CRITICAL batch halts the run; nothing is dispatched after.

use mendyard::policy::Policy;
use mendyard::rules::RuleSet;
use mendyard::types::{BatchStatus, HealthStatus};
use mendyard::RunOptions;

use crate::common::{api, read, viol, workspace, RejectingRule, TestEmitter};

#[test]
fn breaker_halts_dispatch_after_grace() {
    let files: Vec<(String, String)> = (0..5)
        .map(|i| (format!("f{i}.py"), format!("v = {i}\n")))
        .collect();
    let refs: Vec<(&str, &str)> = files.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let td = workspace(&refs);
    let root = td.path();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.pool.workers = 1;
    policy.health.failure_ceiling = 0;
    policy.health.grace_batches = 1;
    let api = api(&facts, policy, root)
        .with_rules(RuleSet::builtin().with_rule(RejectingRule("X100")));

    let violations = files.iter().map(|(rel, _)| viol(rel, 1, "X100", "")).collect();
    let report = api.run(api.plan(violations), RunOptions::default()).unwrap();

    assert!(report.halted);
    assert_eq!(report.health_final, HealthStatus::Halted);
    assert!(report.halt_reason.is_some());
    assert_eq!(report.batches_total, 5);
    assert_eq!(report.batches_completed, 2);
    assert_eq!(report.batches_not_dispatched, 3);
    assert_eq!(report.failures, 2);
    assert!(!report.is_success());
    assert!(report
        .batches
        .iter()
        .all(|b| b.status == BatchStatus::Partial));
    for (rel, body) in &files {
        assert_eq!(&read(root, rel), body);
    }

    // No batch starts once health has reported HALTED
    let seq = facts.sequence();
    let health = facts.named("health");
    assert_eq!(health[0].1["status"], "CRITICAL");
    assert_eq!(health[1].1["status"], "HALTED");
    let halted_at = seq
        .iter()
        .enumerate()
        .filter(|(_, e)| e.as_str() == "health")
        .map(|(i, _)| i)
        .nth(1)
        .unwrap();
    assert!(!seq[halted_at..].iter().any(|e| e == "batch.attempt"));
    assert_eq!(facts.named("batch.attempt").len(), 2);
    assert_eq!(facts.named("run.summary")[0].0, "warn");
}

#[test]
fn failures_within_grace_do_not_halt() {
    let td = workspace(&[("a.py", "a = 1\n"), ("b.py", "b = 1\n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.pool.workers = 1;
    policy.health.failure_ceiling = 0;
    policy.health.grace_batches = 5;
    let api = api(&facts, policy, root)
        .with_rules(RuleSet::builtin().with_rule(RejectingRule("X100")));

    let report = api
        .run(
            api.plan(vec![viol("a.py", 1, "X100", ""), viol("b.py", 1, "X100", "")]),
            RunOptions::default(),
        )
        .unwrap();
    assert!(!report.halted);
    assert_eq!(report.health_final, HealthStatus::Critical);
    assert_eq!(report.batches_completed, 2);
    assert_eq!(report.batches_not_dispatched, 0);
}

#[test]
fn exhausted_run_budget_halts_before_dispatch() {
    let td = workspace(&[("a.py", "a = 1 \n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.run_budget = Some(std::time::Duration::ZERO);
    let api = api(&facts, policy, root);

    let report = api
        .run(api.plan(vec![viol("a.py", 1, "W291", "")]), RunOptions::default())
        .unwrap();
    assert!(report.halted);
    assert_eq!(report.halt_reason.as_deref(), Some("run budget exhausted"));
    assert_eq!(report.batches_not_dispatched, 1);
    assert_eq!(read(root, "a.py"), "a = 1 \n");
}
