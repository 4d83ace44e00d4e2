use log::Level;
use serde_json::json;

use crate::api::errors::{ApiError, ErrorId};
use crate::api::Mendyard;
use crate::fs::backup::earliest_per_resource;
use crate::logging::audit::AuditCtx;
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::RollbackReport;

/// Restore every resource touched by `run_id` to its state before that run.
///
/// Only the earliest snapshot per resource is applied. Restore errors are collected
/// into the report rather than aborting, so one corrupted payload does not leave
/// the other resources unrestored.
pub(crate) fn rollback_run<E: FactsEmitter, A: AuditSink>(
    api: &Mendyard<E, A>,
    run_id: &str,
) -> Result<RollbackReport, ApiError> {
    let tctx = AuditCtx::new(&api.facts as &dyn FactsEmitter, run_id.to_string(), false);
    let slog = StageLogger::new(&tctx);

    let _guard = match &api.lock {
        Some(mgr) => Some(mgr.acquire_process_lock(api.policy.lock_timeout_ms)?),
        None => None,
    };

    let records = api.backup.records_for_run(run_id).map_err(|e| {
        slog.rollback()
            .field("error", json!(e.to_string()))
            .error_id(ErrorId::E_GENERIC)
            .emit_failure();
        ApiError::FilesystemError(e.to_string())
    })?;
    let mut report = RollbackReport {
        run_id: run_id.to_string(),
        ..RollbackReport::default()
    };
    for rec in earliest_per_resource(records) {
        match api.backup.restore(&rec) {
            Ok(()) => {
                slog.rollback()
                    .resource(rec.resource_id.as_str())
                    .field("snapshot_path", json!(rec.snapshot_path.display().to_string()))
                    .emit_success();
                report.restored.push(rec.resource_id);
            }
            Err(e) => {
                api.audit.log(
                    Level::Error,
                    &format!("rollback {run_id}: {}: {e}", rec.resource_id),
                );
                slog.rollback()
                    .resource(rec.resource_id.as_str())
                    .field("error", json!(e.to_string()))
                    .error_id(ErrorId::E_RESTORE_FAILED)
                    .exit_code_for(ErrorId::E_RESTORE_FAILED)
                    .emit_failure();
                report.errors.push(format!("{}: {e}", rec.resource_id));
            }
        }
    }
    api.audit.log(
        Level::Info,
        &format!(
            "rollback {run_id}: {} restored, {} errors",
            report.restored.len(),
            report.errors.len()
        ),
    );
    Ok(report)
}
