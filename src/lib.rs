#![forbid(unsafe_code)]
//! Mendyard: conservative, reversible batch remediation of static-analysis violations.
//!
//! Safety model highlights:
//! - Every resource is snapshotted before it is touched; a batch that fails after
//!   its snapshot is restored before it is reported.
//! - Remediated content is written with a TOCTOU-safe sequence (open parent
//!   O_DIRECTORY|O_NOFOLLOW → write temp → renameat → fsync(parent)) and read back.
//! - At most one batch per resource is in flight, under a bounded worker pool.
//! - A circuit breaker halts dispatch when failures pile up; a failed restore stops
//!   the run.
//! - This crate forbids `unsafe` and uses `rustix` for syscalls.

pub mod adapters;
pub mod api;
pub mod batching;
pub mod constants;
pub mod fs;
pub mod health;
pub mod logging;
pub mod policy;
pub mod rules;
pub mod types;

pub use api::*;
