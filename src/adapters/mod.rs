pub mod lock;
pub mod sink;
pub mod source;

pub use lock::{FileLockManager, LockGuard, LockManager};
pub use sink::{JsonlOutcomeSink, NullOutcomeSink, OutcomeRecord, OutcomeSink};
pub use source::{Flake8TextSource, JsonViolationSource, SourceIssue, SourceOutput, ViolationSource};
