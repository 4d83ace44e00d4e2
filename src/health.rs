//! Health monitor and circuit breaker.
//!
//! The monitor is a plain state machine; the orchestrator serializes access to it
//! behind a single mutex so every transition is linearizable.
use std::time::Duration;

use crate::policy::types::HealthThresholds;
use crate::types::{BatchSample, HealthAlert, HealthSnapshot, HealthStatus};

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug)]
pub struct HealthMonitor {
    thresholds: HealthThresholds,
    batches_completed: u64,
    successes: u64,
    failures: u64,
    status: HealthStatus,
    alerts: Vec<HealthAlert>,
    halt_reason: Option<String>,
}

impl HealthMonitor {
    pub fn new(thresholds: HealthThresholds) -> Self {
        Self {
            thresholds,
            batches_completed: 0,
            successes: 0,
            failures: 0,
            status: HealthStatus::Healthy,
            alerts: Vec::new(),
            halt_reason: None,
        }
    }

    /// Cumulative success rate; 1.0 before anything has been attempted.
    pub fn success_rate(&self) -> f64 {
        let attempts = self.successes + self.failures;
        if attempts == 0 {
            1.0
        } else {
            self.successes as f64 / attempts as f64
        }
    }

    /// Fold one completed batch into the aggregate and re-evaluate.
    pub fn record(&mut self, sample: BatchSample) -> HealthSnapshot {
        self.batches_completed += 1;
        self.successes += sample.successes;
        self.failures += sample.failures;
        if self.status == HealthStatus::Halted {
            self.alerts.clear();
            return self.snapshot();
        }

        let t = &self.thresholds;
        let rate = self.success_rate();
        let mut alerts = Vec::new();
        let mut status = HealthStatus::Healthy;
        if rate < t.success_floor {
            alerts.push(HealthAlert::LowSuccessRate {
                rate,
                floor: t.success_floor,
            });
            status = HealthStatus::Warning;
        }
        if sample.duration > t.duration_ceiling {
            alerts.push(HealthAlert::SlowBatch {
                duration_ms: millis(sample.duration),
                ceiling_ms: millis(t.duration_ceiling),
            });
            status = HealthStatus::Warning;
        }
        if sample.failures > t.failure_ceiling {
            alerts.push(HealthAlert::HighFailureCount {
                failures: sample.failures,
                ceiling: t.failure_ceiling,
            });
            status = HealthStatus::Critical;
        }
        // Grace period: early noisy batches may go CRITICAL but never halt
        if status == HealthStatus::Critical && self.batches_completed > t.grace_batches {
            self.halt_reason = Some(format!(
                "batch failures {} exceeded ceiling {} after {} batches",
                sample.failures, t.failure_ceiling, self.batches_completed
            ));
            status = HealthStatus::Halted;
        }
        self.status = status;
        self.alerts = alerts;
        self.snapshot()
    }

    /// Force the terminal state. The first reason wins.
    pub fn halt(&mut self, reason: impl Into<String>) {
        if self.status != HealthStatus::Halted {
            self.status = HealthStatus::Halted;
            self.halt_reason = Some(reason.into());
        }
    }

    pub fn is_halted(&self) -> bool {
        self.status == HealthStatus::Halted
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    pub fn halt_reason(&self) -> Option<&str> {
        self.halt_reason.as_deref()
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            batches_completed: self.batches_completed,
            successes: self.successes,
            failures: self.failures,
            success_rate: self.success_rate(),
            status: self.status,
            alerts: self.alerts.clone(),
        }
    }
}
