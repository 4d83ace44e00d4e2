//! Whole-run rollback restores the pre-run content of every touched resource.

use mendyard::policy::Policy;
use mendyard::RunOptions;

use crate::common::{api, read, viol, workspace, FaultyStore, TestEmitter};

#[test]
fn rollback_restores_pre_run_state() {
    let td = workspace(&[("a.py", "x = 1   \n"), ("pkg/b.py", "y = 2\t\n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let api = api(&facts, Policy::default(), root);

    let opts = RunOptions {
        run_id: Some("run_under_test".into()),
        ..RunOptions::default()
    };
    let report = api
        .run(
            api.plan(vec![viol("a.py", 1, "W291", ""), viol("pkg/b.py", 1, "W291", "")]),
            opts,
        )
        .unwrap();
    assert_eq!(report.run_id, "run_under_test");
    assert_eq!(read(root, "a.py"), "x = 1\n");
    assert_eq!(read(root, "pkg/b.py"), "y = 2\n");

    // A later run must not affect what rolling back the first one restores
    std::fs::write(root.join("a.py"), "x = 100  \n").unwrap();
    api.run(api.plan(vec![viol("a.py", 1, "W291", "")]), RunOptions::default())
        .unwrap();

    let rb = api.rollback_run("run_under_test").unwrap();
    assert!(rb.errors.is_empty(), "{:?}", rb.errors);
    let restored: Vec<&str> = rb.restored.iter().map(|r| r.as_str()).collect();
    assert_eq!(restored, vec!["a.py", "pkg/b.py"]);
    assert_eq!(read(root, "a.py"), "x = 1   \n");
    assert_eq!(read(root, "pkg/b.py"), "y = 2\t\n");

    let facts_rb = facts.named("rollback");
    assert_eq!(facts_rb.len(), 2);
    assert!(facts_rb.iter().all(|(d, f)| d == "success" && f["run_id"] == "run_under_test"));
}

#[test]
fn rollback_of_unknown_run_is_empty() {
    let td = workspace(&[("a.py", "x\n")]);
    let facts = TestEmitter::default();
    let api = api(&facts, Policy::default(), td.path());
    let rb = api.rollback_run("run_never_happened").unwrap();
    assert!(rb.restored.is_empty());
    assert!(rb.errors.is_empty());
}

#[test]
fn restore_errors_are_collected_not_fatal() {
    let td = workspace(&[("a.py", "x = 1 \n"), ("b.py", "y = 2 \n")]);
    let root = td.path();
    let facts = TestEmitter::default();
    let policy = Policy::default();
    let mut store = FaultyStore::over(root, &policy);
    let run_id = "run_faulty_restore";
    {
        let api = api(&facts, policy.clone(), root);
        api.run(
            api.plan(vec![viol("a.py", 1, "W291", ""), viol("b.py", 1, "W291", "")]),
            RunOptions {
                run_id: Some(run_id.into()),
                ..RunOptions::default()
            },
        )
        .unwrap();
    }
    store.fail_restore = true;
    let api = api(&facts, policy, root).with_backup_store(Box::new(store));
    let rb = api.rollback_run(run_id).unwrap();
    assert!(rb.restored.is_empty());
    assert_eq!(rb.errors.len(), 2);
    assert_eq!(read(root, "a.py"), "x = 1\n");
}
