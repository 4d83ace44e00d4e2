//! Dispatcher: admits batches in priority order onto a bounded worker pool.
//!
//! The dispatcher runs on the caller's thread inside `in_place_scope`, so only the
//! pool's own threads execute batches. Before every dispatch it re-checks the
//! breaker and the run budget; once either stops the run, the remaining batches are
//! reported as not dispatched.
use std::sync::Mutex;
use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::api::errors::{ApiError, ErrorId};
use crate::api::{Mendyard, RunOptions};
use crate::batching::admit;
use crate::logging::audit::AuditCtx;
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::{new_run_id, Batch, BatchStatus, BatchSummary, RunReport};

use super::batch;
use super::context::RunContext;

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Mendyard<E, A>,
    batches: Vec<Batch>,
    opts: RunOptions,
) -> Result<RunReport, ApiError> {
    let t0 = Instant::now();
    let run_id = opts.run_id.unwrap_or_else(new_run_id);
    let tctx = AuditCtx::new(&api.facts as &dyn FactsEmitter, run_id.clone(), false);
    let slog = StageLogger::new(&tctx);

    if let Err(e) = api.policy.validate() {
        slog.run_summary()
            .field("error", json!(e.msg))
            .error_id(ErrorId::E_POLICY)
            .exit_code_for(ErrorId::E_POLICY)
            .emit_failure();
        return Err(e.into());
    }

    let _guard = match &api.lock {
        Some(mgr) => match mgr.acquire_process_lock(api.policy.lock_timeout_ms) {
            Ok(g) => Some(g),
            Err(e) => {
                let err = ApiError::from(e);
                api.audit.log(Level::Error, &format!("run: {err}"));
                slog.run_summary()
                    .field("error", json!(err.to_string()))
                    .error_id(err.id())
                    .exit_code_for(err.id())
                    .emit_failure();
                return Err(err);
            }
        },
        None => {
            api.audit.log(
                Level::Warn,
                "run: no lock manager configured; concurrent runs are not excluded",
            );
            slog.admission().field("no_lock_manager", json!(true)).emit_warn();
            None
        }
    };

    let admitted = admit(batches, opts.max_batches, opts.priority_filter);
    let total = admitted.len();
    let workers = api.policy.pool.workers;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("mendyard-worker-{i}"))
        .build()
        .map_err(|e| ApiError::WorkerPool(e.to_string()))?;
    api.audit.log(
        Level::Info,
        &format!("run {run_id}: {total} batches admitted, {workers} workers"),
    );

    let ctx = RunContext::new(
        &api.policy,
        &api.workspace,
        &api.rules,
        api.backup.as_ref(),
        api.sink.as_ref(),
        &api.audit as &dyn AuditSink,
        tctx,
        t0,
    );
    let results: Mutex<Vec<(usize, BatchSummary)>> = Mutex::new(Vec::with_capacity(total));
    let mut dispatched = 0usize;

    pool.in_place_scope(|s| {
        for (seq, b) in admitted.iter().enumerate() {
            let Some(permit) = ctx
                .admission
                .acquire(&b.resource_id, || ctx.should_stop(), &ctx.tctx)
            else {
                break;
            };
            dispatched += 1;
            let ctx = &ctx;
            let results = &results;
            s.spawn(move |_| {
                let summary = batch::process(ctx, b);
                if let Ok(mut r) = results.lock() {
                    r.push((seq, summary));
                }
                drop(permit);
            });
        }
    });

    let mut summaries = results
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    summaries.sort_by_key(|(seq, _)| *seq);
    let summaries: Vec<BatchSummary> = summaries.into_iter().map(|(_, s)| s).collect();

    let (status, halted, halt_reason) = {
        let h = ctx.health();
        (h.status(), h.is_halted(), h.halt_reason().map(str::to_string))
    };
    let report = RunReport {
        run_id: run_id.clone(),
        batches_total: total as u64,
        batches_completed: summaries.len() as u64,
        batches_failed: summaries
            .iter()
            .filter(|s| s.status == BatchStatus::Failed)
            .count() as u64,
        batches_not_dispatched: (total - dispatched) as u64,
        successes: summaries.iter().map(|s| s.successes).sum(),
        failures: summaries.iter().map(|s| s.failures).sum(),
        skipped: summaries.iter().map(|s| s.skipped).sum(),
        health_final: status,
        halted,
        halt_reason,
        duration_seconds: t0.elapsed().as_secs_f64(),
        batches: summaries,
    };

    let fatal = ctx.take_fatal();
    let fields = json!({
        "batches_total": report.batches_total,
        "batches_completed": report.batches_completed,
        "batches_failed": report.batches_failed,
        "batches_not_dispatched": report.batches_not_dispatched,
        "successes": report.successes,
        "failures": report.failures,
        "skipped": report.skipped,
        "health_final": report.health_final.as_str(),
        "halted": report.halted,
        "halt_reason": report.halt_reason,
        "duration_seconds": report.duration_seconds,
    });
    let slog = StageLogger::new(&ctx.tctx);
    if let Some(e) = fatal {
        slog.run_summary()
            .merge(fields)
            .error_id(ErrorId::E_RESTORE_FAILED)
            .exit_code_for(ErrorId::E_RESTORE_FAILED)
            .emit_failure();
        api.audit.log(Level::Error, &format!("run {run_id}: {e}"));
        return Err(ApiError::RestoreFailed {
            message: e.to_string(),
            report: Box::new(report),
        });
    }
    let summary = slog.run_summary().merge(fields);
    if report.halted {
        summary.emit_warn();
    } else if report.is_success() {
        summary.emit_success();
    } else {
        summary.emit_failure();
    }
    api.audit.log(
        Level::Info,
        &format!(
            "run {run_id}: {} fixed, {} failed, {} skipped, health {}",
            report.successes, report.failures, report.skipped, report.health_final
        ),
    );
    Ok(report)
}
