//! Output rendering for run, plan, and rollback.
//!
//! Supports `human` (default) and `json`. The JSON form is the serialized report
//! plus any dropped input records.

use mendyard::adapters::SourceIssue;
use mendyard::types::{Batch, BatchStatus, RollbackReport, RunReport};
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputMode;

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("[error] cannot encode output: {e}"),
    }
}

fn issues_json(issues: &[SourceIssue]) -> serde_json::Value {
    json!(issues
        .iter()
        .map(|i| json!({"record": i.record, "reason": i.reason}))
        .collect::<Vec<_>>())
}

/// Dropped input records always go to stderr in human mode.
pub fn print_issues(issues: &[SourceIssue]) {
    for i in issues {
        eprintln!("[warn] input record {}: {}", i.record, i.reason);
    }
}

pub fn print_run(report: &RunReport, issues: &[SourceIssue], mode: OutputMode) {
    match mode {
        OutputMode::Json => print_json(&json!({
            "report": report,
            "input_issues": issues_json(issues),
        })),
        OutputMode::Human => {
            print_issues(issues);
            for b in &report.batches {
                let mark = match b.status {
                    BatchStatus::Completed => "ok",
                    BatchStatus::Partial => "partial",
                    BatchStatus::Failed => "FAILED",
                    BatchStatus::Pending => "pending",
                };
                println!(
                    "{mark:>7} {:<8} {} fixed={} failed={} skipped={}{}",
                    b.priority.as_str(),
                    b.resource_id,
                    b.successes,
                    b.failures,
                    b.skipped,
                    if b.rolled_back { " (rolled back)" } else { "" }
                );
                if let Some(e) = &b.error {
                    println!("        {e}");
                }
            }
            println!(
                "run {}: batches {}/{} dispatched ({} failed), fixed={} failed={} skipped={} health={} in {:.2}s",
                report.run_id,
                report.batches_completed,
                report.batches_total,
                report.batches_failed,
                report.successes,
                report.failures,
                report.skipped,
                report.health_final,
                report.duration_seconds,
            );
            if let Some(r) = &report.halt_reason {
                println!(
                    "halted: {r} ({} batches not dispatched)",
                    report.batches_not_dispatched
                );
            }
        }
    }
}

pub fn print_plan(batches: &[Batch], issues: &[SourceIssue], mode: OutputMode) {
    match mode {
        OutputMode::Json => print_json(&json!({
            "batches": batches,
            "input_issues": issues_json(issues),
        })),
        OutputMode::Human => {
            print_issues(issues);
            for (i, b) in batches.iter().enumerate() {
                println!(
                    "{:>4}. {:<8} {} ({} violations)",
                    i + 1,
                    b.priority.as_str(),
                    b.resource_id,
                    b.len()
                );
            }
            println!("{} batches", batches.len());
        }
    }
}

pub fn print_rollback(report: &RollbackReport, mode: OutputMode) {
    match mode {
        OutputMode::Json => print_json(report),
        OutputMode::Human => {
            for r in &report.restored {
                println!("restored {r}");
            }
            for e in &report.errors {
                println!("error    {e}");
            }
            println!(
                "rollback {}: {} restored, {} errors",
                report.run_id,
                report.restored.len(),
                report.errors.len()
            );
        }
    }
}
