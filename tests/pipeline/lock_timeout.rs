//! A second run on a locked workspace times out without touching anything.

use mendyard::adapters::{FileLockManager, LockManager};
use mendyard::api::errors::ErrorId;
use mendyard::policy::Policy;
use mendyard::RunOptions;

use crate::common::{api, read, viol, workspace, TestEmitter};

#[test]
fn held_lock_yields_locking_timeout() {
    let td = workspace(&[("a.py", "x = 1 \n")]);
    let root = td.path();
    let lock_dir = root.join(".mendyard");
    let holder = FileLockManager::in_dir(&lock_dir);
    let _held = holder.acquire_process_lock(100).unwrap();

    let facts = TestEmitter::default();
    let mut policy = Policy::default();
    policy.lock_timeout_ms = 50;
    let api = api(&facts, policy, root).with_lock_manager(Box::new(FileLockManager::in_dir(&lock_dir)));

    let err = api
        .run(api.plan(vec![viol("a.py", 1, "W291", "")]), RunOptions::default())
        .unwrap_err();
    assert_eq!(err.id(), ErrorId::E_LOCKING);
    assert_eq!(err.exit_code(), 30);
    assert_eq!(read(root, "a.py"), "x = 1 \n");
    assert!(facts.named("batch.attempt").is_empty());
    let summary = facts.named("run.summary");
    assert_eq!(summary[0].0, "failure");
    assert_eq!(summary[0].1["error_id"], "E_LOCKING");
}

#[test]
fn lock_is_released_after_run() {
    let td = workspace(&[("a.py", "x = 1 \n")]);
    let root = td.path();
    let lock_dir = root.join(".mendyard");
    let facts = TestEmitter::default();
    let api = api(&facts, Policy::default(), root)
        .with_lock_manager(Box::new(FileLockManager::in_dir(&lock_dir)));
    api.run(api.plan(vec![viol("a.py", 1, "W291", "")]), RunOptions::default())
        .unwrap();
    assert!(FileLockManager::in_dir(&lock_dir).acquire_process_lock(100).is_ok());
}
