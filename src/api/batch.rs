//! One batch, start to finish, on a worker thread.
//!
//! backup-tree guard → read → seen check → snapshot → rule engine → atomic write + verify → record.
//! Any batch-level failure after the snapshot restores the resource before the
//! batch is reported.
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::adapters::OutcomeRecord;
use crate::api::errors::{map_batch_error, ErrorId};
use crate::constants::TMP_SUFFIX;
use crate::fs::{atomic_write, content_key};
use crate::logging::{now_iso, Decision, StageLogger};
use crate::types::report::reason;
use crate::types::{
    BackupError, BackupRecord, Batch, BatchError, BatchSample, BatchStatus, BatchSummary,
    HealthStatus, RuleOutcome, ViolationStatus, WriteError,
};

use super::context::RunContext;

fn millis(t0: Instant) -> u64 {
    u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn uniform_outcomes(batch: &Batch, status: ViolationStatus, why: &str) -> Vec<RuleOutcome> {
    batch
        .violations
        .iter()
        .map(|v| RuleOutcome {
            violation_id: v.violation_id(),
            code: v.code.clone(),
            line: v.line,
            applied: false,
            reason: why.to_string(),
            status,
        })
        .collect()
}

/// Write `content` over `path` and read it back.
fn commit(path: &Path, content: &str) -> Result<(), WriteError> {
    atomic_write(path, content.as_bytes(), TMP_SUFFIX, None).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match std::fs::read(path) {
        Ok(back) if back == content.as_bytes() => Ok(()),
        Ok(_) => Err(WriteError::Verify {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(WriteError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn process(ctx: &RunContext<'_>, batch: &Batch) -> BatchSummary {
    let t0 = Instant::now();
    let slog = StageLogger::new(&ctx.tctx);
    slog.batch_attempt()
        .resource(batch.resource_id.as_str())
        .batch(batch.batch_id)
        .merge(json!({
            "priority": batch.priority.as_str(),
            "violations": batch.len(),
        }))
        .emit_success();

    let path = batch.resource_id.resolve(ctx.workspace);
    if ctx.in_backup_tree(&path) {
        ctx.audit.log(
            Level::Warn,
            &format!("batch {}: resource is inside the backup tree, skipped", batch.resource_id),
        );
        let outcomes = uniform_outcomes(batch, ViolationStatus::Skipped, reason::BACKUP_TREE);
        return finish(ctx, batch, outcomes, BatchStatus::Completed, None, t0);
    }
    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(source) => {
            let err = BatchError::Backup(BackupError::Unreadable {
                path: path.clone(),
                source,
            });
            return fail(ctx, batch, &err, None, t0);
        }
    };
    let content = match std::str::from_utf8(&bytes) {
        Ok(s) => s,
        Err(e) => {
            let err = BatchError::Read(std::io::Error::new(std::io::ErrorKind::InvalidData, e));
            return fail(ctx, batch, &err, None, t0);
        }
    };

    if ctx
        .seen()
        .contains(&content_key(batch.resource_id.as_str(), &bytes))
    {
        ctx.audit.log(
            Level::Info,
            &format!("batch {}: content already processed this run", batch.resource_id),
        );
        let outcomes = uniform_outcomes(batch, ViolationStatus::Skipped, reason::DUPLICATE_CONTENT);
        return finish(ctx, batch, outcomes, BatchStatus::Completed, None, t0);
    }

    let record = match ctx.backup.snapshot(&ctx.tctx.run_id, &batch.resource_id) {
        Ok(r) => r,
        Err(e) => return fail(ctx, batch, &BatchError::Backup(e), None, t0),
    };

    let Ok(out) = catch_unwind(AssertUnwindSafe(|| ctx.rules.apply(content, &batch.violations)))
    else {
        return fail(ctx, batch, &BatchError::Engine, Some(&record), t0);
    };

    if out.changed {
        if let Err(e) = commit(&path, &out.content) {
            return fail(ctx, batch, &BatchError::Write(e), Some(&record), t0);
        }
    }
    ctx.seen()
        .insert(content_key(batch.resource_id.as_str(), out.content.as_bytes()));

    let status = if out
        .outcomes
        .iter()
        .any(|o| o.status == ViolationStatus::Failed)
    {
        BatchStatus::Partial
    } else {
        BatchStatus::Completed
    };
    finish(ctx, batch, out.outcomes, status, Some(&record), t0)
}

/// Batch-level failure: restore if a snapshot exists, fail every violation.
fn fail(
    ctx: &RunContext<'_>,
    batch: &Batch,
    err: &BatchError,
    record: Option<&BackupRecord>,
    t0: Instant,
) -> BatchSummary {
    let slog = StageLogger::new(&ctx.tctx);
    ctx.audit.log(
        Level::Warn,
        &format!("batch {} failed: {err}", batch.resource_id),
    );
    let mut rolled_back = false;
    if let Some(rec) = record {
        match ctx.backup.restore(rec) {
            Ok(()) => {
                rolled_back = true;
                slog.rollback()
                    .resource(batch.resource_id.as_str())
                    .batch(batch.batch_id)
                    .field("snapshot_path", json!(rec.snapshot_path.display().to_string()))
                    .emit_success();
            }
            Err(e) => {
                ctx.audit.log(
                    Level::Error,
                    &format!("restore of {} failed: {e}", batch.resource_id),
                );
                slog.rollback()
                    .resource(batch.resource_id.as_str())
                    .batch(batch.batch_id)
                    .field("error", json!(e.to_string()))
                    .error_id(ErrorId::E_RESTORE_FAILED)
                    .exit_code_for(ErrorId::E_RESTORE_FAILED)
                    .emit_failure();
                ctx.record_fatal(e);
            }
        }
    }
    let why = format!("{}: {err}", reason::BATCH_FAILED_PREFIX);
    let outcomes = uniform_outcomes(batch, ViolationStatus::Failed, &why);
    let mut summary = finish(ctx, batch, outcomes, BatchStatus::Failed, record, t0);
    summary.rolled_back = rolled_back;
    summary.error = Some(err.to_string());
    let id = map_batch_error(err);
    slog.batch_result()
        .resource(batch.resource_id.as_str())
        .batch(batch.batch_id)
        .merge(json!({
            "status": summary.status.as_str(),
            "error": err.to_string(),
            "rolled_back": rolled_back,
            "failures": summary.failures,
            "duration_ms": summary.duration_ms,
        }))
        .error_id(id)
        .exit_code_for(id)
        .emit_failure();
    summary
}

/// Persist outcomes, feed the health monitor, build the summary.
///
/// Emits `batch.result` for non-failed batches; `fail` emits its own.
fn finish(
    ctx: &RunContext<'_>,
    batch: &Batch,
    outcomes: Vec<RuleOutcome>,
    status: BatchStatus,
    record: Option<&BackupRecord>,
    t0: Instant,
) -> BatchSummary {
    let slog = StageLogger::new(&ctx.tctx);
    let count = |s: ViolationStatus| outcomes.iter().filter(|o| o.status == s).count() as u64;
    let (successes, failures, skipped) = (
        count(ViolationStatus::Fixed),
        count(ViolationStatus::Failed),
        count(ViolationStatus::Skipped),
    );

    let ts = now_iso();
    let records: Vec<OutcomeRecord> = outcomes
        .iter()
        .map(|o| OutcomeRecord {
            run_id: ctx.tctx.run_id.clone(),
            resource_id: batch.resource_id.clone(),
            line: o.line,
            code: o.code.clone(),
            status: o.status,
            applied_reason: o.reason.clone(),
            timestamp: ts.clone(),
        })
        .collect();
    if let Err(e) = ctx.sink.append(&records) {
        ctx.audit.log(
            Level::Warn,
            &format!("outcomes for {} not persisted: {e}", batch.resource_id),
        );
        slog.batch_result()
            .resource(batch.resource_id.as_str())
            .batch(batch.batch_id)
            .field("persist_error", json!(e.to_string()))
            .error_id(ErrorId::E_PERSIST)
            .emit_warn();
    }

    let duration = t0.elapsed();
    let snapshot = ctx.health().record(BatchSample {
        successes,
        failures,
        duration,
    });
    let decision = match snapshot.status {
        HealthStatus::Healthy => Decision::Success,
        HealthStatus::Warning | HealthStatus::Critical => Decision::Warn,
        HealthStatus::Halted => Decision::Failure,
    };
    slog.health()
        .resource(batch.resource_id.as_str())
        .batch(batch.batch_id)
        .merge(json!({
            "status": snapshot.status.as_str(),
            "batches_completed": snapshot.batches_completed,
            "success_rate": snapshot.success_rate,
            "alerts": snapshot.alerts,
        }))
        .emit(decision);

    let summary = BatchSummary {
        batch_id: batch.batch_id,
        resource_id: batch.resource_id.clone(),
        priority: batch.priority,
        status,
        successes,
        failures,
        skipped,
        rolled_back: false,
        duration_ms: millis(t0),
        error: None,
        backup: record.map(|r| r.snapshot_path.clone()),
        outcomes,
    };
    if status != BatchStatus::Failed {
        slog.batch_result()
            .resource(batch.resource_id.as_str())
            .batch(batch.batch_id)
            .merge(json!({
                "status": status.as_str(),
                "successes": successes,
                "failures": failures,
                "skipped": skipped,
                "duration_ms": summary.duration_ms,
            }))
            .emit(if status == BatchStatus::Completed {
                Decision::Success
            } else {
                Decision::Warn
            });
    }
    summary
}
