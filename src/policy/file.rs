//! `mendyard.toml` discovery and parsing.
//!
//! Every key is optional; absent keys keep the policy defaults.
//! Precedence at the CLI: flags > config file > defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::CONFIG_FILE_NAME;
use crate::types::errors::{Error, ErrorKind, Result};

#[derive(Debug, Default, Deserialize, Clone)]
pub struct PriorityCfg {
    pub fatal_prefixes: Option<Vec<String>>,
    pub adjacent_prefixes: Option<Vec<String>>,
    pub bulk_threshold: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct HealthCfg {
    pub success_floor: Option<f64>,
    pub failure_ceiling: Option<u64>,
    pub duration_ceiling_secs: Option<u64>,
    pub grace_batches: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct BackupCfg {
    pub root: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `mendyard.toml`.
pub struct MendyardConfig {
    pub workers: Option<usize>,
    pub seen_capacity: Option<usize>,
    pub run_budget_secs: Option<u64>,
    pub lock_timeout_ms: Option<u64>,
    pub priority: Option<PriorityCfg>,
    pub health: Option<HealthCfg>,
    pub backup: Option<BackupCfg>,
}

impl MendyardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::new(ErrorKind::Config, e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::Io, format!("{}: {e}", path.display()))
        })?;
        Self::from_toml_str(&s)
    }
}

/// Path of the config file in `workspace`, when one exists.
pub fn discover(workspace: &Path) -> Option<PathBuf> {
    let p = workspace.join(CONFIG_FILE_NAME);
    p.is_file().then_some(p)
}
