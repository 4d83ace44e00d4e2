mod backup_error_batch;
mod backup_tree_guard;
mod circuit_breaker;
mod duplicate_content;
mod happy_path;
mod idempotent_run;
mod lock_timeout;
mod persistence_failure;
mod priority_ordering;
mod restore_failure_fatal;
mod rule_panic;
mod single_writer;
mod write_failure_rollback;
