//! Policy configuration.
//!
//! The `policy` module centralizes the knobs that shape a run: pool size,
//! priority classes, circuit breaker thresholds, and backup layout. Consumers
//! typically construct a [`Policy`](crate::policy::Policy) via `default()` or
//! `conservative_preset()`, overlay a `mendyard.toml` with `merge_config`, and
//! then customize fields before creating a [`Mendyard`](crate::Mendyard).
//!
//! Submodules:
//! - `config`: policy struct and presets
//! - `file`: `mendyard.toml` discovery and parsing
//! - `types`: grouped policy sections

pub mod config;
pub mod file;
pub mod types;

pub use config::Policy;
pub use file::MendyardConfig;
