//! Admission never exceeds the pool size and never overlaps two batches on one resource.

use std::collections::HashMap;

use mendyard::policy::Policy;
use mendyard::RunOptions;
use uuid::Uuid;

use crate::common::{api, read, viol, workspace, TestEmitter};

/// Replay admission facts and assert both limits held at every step.
fn assert_admission_trace(facts: &TestEmitter, cap: u64) {
    let mut held: HashMap<String, bool> = HashMap::new();
    let mut acquires = 0;
    for (_, f) in facts.named("admission") {
        let Some(action) = f["action"].as_str() else {
            continue;
        };
        let resource = f["resource"].as_str().unwrap().to_string();
        let inflight = f["inflight"].as_u64().unwrap();
        assert!(inflight <= cap, "inflight {inflight} exceeds cap {cap}");
        match action {
            "acquire" => {
                acquires += 1;
                let prev = held.insert(resource.clone(), true);
                assert_ne!(prev, Some(true), "{resource} admitted twice concurrently");
            }
            "release" => {
                assert_eq!(held.insert(resource.clone(), false), Some(true));
            }
            other => panic!("unexpected admission action {other}"),
        }
    }
    assert!(acquires > 0);
    assert!(held.values().all(|h| !h), "every permit released");
}

#[test]
fn many_resources_respect_pool_cap() {
    let files: Vec<(String, String)> = (0..12)
        .map(|i| (format!("m{i:02}.py"), format!("v = {i}  \n")))
        .collect();
    let refs: Vec<(&str, &str)> = files.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let td = workspace(&refs);
    let root = td.path();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.pool.workers = 3;
    let api = api(&facts, policy, root);

    let violations = files.iter().map(|(rel, _)| viol(rel, 1, "W291", "")).collect();
    let report = api.run(api.plan(violations), RunOptions::default()).unwrap();
    assert_eq!(report.batches_completed, 12);
    assert_eq!(report.successes, 12);
    assert_admission_trace(&facts, 3);
    for (i, (rel, _)) in files.iter().enumerate() {
        assert_eq!(read(root, rel), format!("v = {i}\n"));
    }
}

#[test]
fn two_batches_for_one_resource_never_overlap() {
    let td = workspace(&[("a.py", "x = 1  \n"), ("b.py", "y = 2  \n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.pool.workers = 4;
    let api = api(&facts, policy, root);

    let mut batches = api.plan(vec![viol("a.py", 1, "W291", ""), viol("b.py", 1, "W291", "")]);
    let mut again = batches[0].clone();
    again.batch_id = Uuid::new_v4();
    batches.insert(1, again);

    let report = api.run(batches, RunOptions::default()).unwrap();
    assert_eq!(report.batches_completed, 3);
    assert_admission_trace(&facts, 4);
    assert_eq!(read(root, "a.py"), "x = 1\n");
    assert_eq!(read(root, "b.py"), "y = 2\n");
}
