use std::fmt;

use serde::{Deserialize, Serialize};

/// Circuit breaker state. `Halted` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Warning,
    Critical,
    Halted,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "HEALTHY",
            HealthStatus::Warning => "WARNING",
            HealthStatus::Critical => "CRITICAL",
            HealthStatus::Halted => "HALTED",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert raised while evaluating a completed batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "alert", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthAlert {
    LowSuccessRate { rate: f64, floor: f64 },
    SlowBatch { duration_ms: u64, ceiling_ms: u64 },
    HighFailureCount { failures: u64, ceiling: u64 },
}

/// Aggregate health after a batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub batches_completed: u64,
    pub successes: u64,
    pub failures: u64,
    pub success_rate: f64,
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<HealthAlert>,
}

/// Per-batch input to the health monitor.
#[derive(Clone, Copy, Debug, Default)]
pub struct BatchSample {
    pub successes: u64,
    pub failures: u64,
    pub duration: std::time::Duration,
}
