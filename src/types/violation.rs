use std::fmt;

use serde::{Deserialize, Serialize};

use super::resource::ResourceId;

/// Lifecycle of a single violation within a run. Only the orchestrator writes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationStatus {
    #[default]
    Pending,
    Fixed,
    Failed,
    Skipped,
}

impl ViolationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationStatus::Pending => "pending",
            ViolationStatus::Fixed => "fixed",
            ViolationStatus::Failed => "failed",
            ViolationStatus::Skipped => "skipped",
        }
    }
}

/// A flagged location produced by the external static-analysis tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub resource_id: ResourceId,
    /// 1-indexed.
    pub line: u32,
    /// 1-indexed.
    pub column: u32,
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: ViolationStatus,
}

/// Identity of a violation: `(resource_id, line, column, code)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViolationKey {
    pub resource_id: ResourceId,
    pub line: u32,
    pub column: u32,
    pub code: String,
}

impl fmt::Display for ViolationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.resource_id, self.line, self.column, self.code
        )
    }
}

impl Violation {
    pub fn new(
        resource_id: ResourceId,
        line: u32,
        column: u32,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            resource_id,
            line,
            column,
            code: code.into(),
            message: message.into(),
            status: ViolationStatus::Pending,
        }
    }

    pub fn key(&self) -> ViolationKey {
        ViolationKey {
            resource_id: self.resource_id.clone(),
            line: self.line,
            column: self.column,
            code: self.code.clone(),
        }
    }

    /// Stable string id used in outcomes and persisted records.
    pub fn violation_id(&self) -> String {
        self.key().to_string()
    }
}
