use serde_json::json;

use crate::api::Mendyard;
use crate::batching::build_batches;
use crate::logging::audit::AuditCtx;
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::{plan_id, Batch, Violation};

/// Group, classify, and order `violations`. Emits one `plan` fact per batch.
pub(crate) fn build<E: FactsEmitter, A: AuditSink>(
    api: &Mendyard<E, A>,
    violations: Vec<Violation>,
) -> Vec<Batch> {
    let batches = build_batches(violations, &api.policy.priority);
    let ids: Vec<_> = batches.iter().map(|b| b.batch_id).collect();
    let pid = plan_id(&ids);
    let tctx = AuditCtx::new(&api.facts as &dyn FactsEmitter, pid.to_string(), false);
    let slog = StageLogger::new(&tctx);
    for (idx, b) in batches.iter().enumerate() {
        let mut codes: Vec<&str> = b.violations.iter().map(|v| v.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        slog.plan()
            .resource(b.resource_id.as_str())
            .batch(b.batch_id)
            .merge(json!({
                "position": idx,
                "priority": b.priority.as_str(),
                "violations": b.len(),
                "codes": codes,
            }))
            .emit_success();
    }
    batches
}
