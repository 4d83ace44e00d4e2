//! Re-running the same violations over already-fixed content changes nothing.

use mendyard::policy::Policy;
use mendyard::types::ViolationStatus;
use mendyard::RunOptions;

use crate::common::{api, read, viol, workspace, TestEmitter};

#[test]
fn second_run_is_a_no_op() {
    let src = "import os\n\n\n\n\ndef f():  \n    return os.sep\n\n\n";
    let td = workspace(&[("mod.py", src)]);
    let root = td.path();
    let facts = TestEmitter::default();
    let api = api(&facts, Policy::default(), root);
    let violations = vec![
        viol("mod.py", 6, "E303", "too many blank lines (4)"),
        viol("mod.py", 6, "W291", "trailing whitespace"),
        viol("mod.py", 9, "W391", "blank line at end of file"),
    ];

    let first = api.run(api.plan(violations.clone()), RunOptions::default()).unwrap();
    assert!(first.successes >= 2);
    assert_eq!(first.failures, 0);
    let after_first = read(root, "mod.py");
    assert_ne!(after_first, src);

    let second = api.run(api.plan(violations), RunOptions::default()).unwrap();
    assert_eq!(read(root, "mod.py"), after_first);
    assert_eq!(second.successes, 0);
    assert_eq!(second.failures, 0);
    assert!(second.batches[0]
        .outcomes
        .iter()
        .all(|o| o.status == ViolationStatus::Skipped && !o.applied));
    assert!(second.is_success());
    assert_ne!(first.run_id, second.run_id);
}
