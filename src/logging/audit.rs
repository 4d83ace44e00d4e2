// Audit helpers that emit structured facts across the remediation stages.
//
// Side-effects:
// - Emits JSON facts via `FactsEmitter` for the stages `plan`, `admission`,
//   `batch.attempt`, `batch.result`, `rollback`, `health`, and `run.summary`.
// - Ensures a minimal envelope is present on every fact: `schema_version`, `ts`,
//   `run_id`, `resource`, `decision`.
// - Applies redaction when requested to zero timestamps and drop volatile fields.
use serde_json::{json, Value};

use crate::logging::{now_iso, redact_event, FactsEmitter};

pub(crate) const SCHEMA_VERSION: i64 = 1;
pub(crate) const SUBSYSTEM: &str = "mendyard";

pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub run_id: String,
    pub redact: bool,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(facts: &'a dyn FactsEmitter, run_id: String, redact: bool) -> Self {
        Self {
            facts,
            run_id,
            redact,
        }
    }
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Plan,
    Admission,
    BatchAttempt,
    BatchResult,
    Rollback,
    Health,
    RunSummary,
}

impl Stage {
    #[must_use]
    pub fn as_event(&self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Admission => "admission",
            Stage::BatchAttempt => "batch.attempt",
            Stage::BatchResult => "batch.result",
            Stage::Rollback => "rollback",
            Stage::Health => "health",
            Stage::RunSummary => "run.summary",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over audit emission with centralized envelope+redaction.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn plan(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Plan)
    }
    pub fn admission(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Admission)
    }
    pub fn batch_attempt(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::BatchAttempt)
    }
    pub fn batch_result(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::BatchResult)
    }
    pub fn rollback(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Rollback)
    }
    pub fn health(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Health)
    }
    pub fn run_summary(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::RunSummary)
    }
}

pub struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.fields.insert("resource".into(), json!(resource.into()));
        self
    }

    pub fn batch(mut self, batch_id: impl ToString) -> Self {
        self.fields
            .insert("batch_id".into(), json!(batch_id.to_string()));
        self
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn error_id(mut self, id: crate::api::errors::ErrorId) -> Self {
        self.fields
            .insert("error_id".into(), json!(crate::api::errors::id_str(id)));
        self
    }

    pub fn exit_code_for(mut self, id: crate::api::errors::ErrorId) -> Self {
        self.fields
            .insert("exit_code".into(), json!(crate::api::errors::exit_code_for(id)));
        self
    }

    pub fn merge(mut self, extra: Value) -> Self {
        if let Value::Object(obj) = extra {
            for (k, v) in obj {
                self.fields.insert(k, v);
            }
        }
        self
    }

    pub fn emit(self, decision: Decision) {
        let mut fields = Value::Object(self.fields);
        if let Some(obj) = fields.as_object_mut() {
            obj.entry("decision").or_insert(json!(decision.as_str()));
            obj.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
            obj.entry("ts").or_insert_with(|| json!(now_iso()));
            obj.entry("run_id").or_insert(json!(self.ctx.run_id));
            obj.entry("resource").or_insert(json!(""));
        }
        let out = if self.ctx.redact {
            redact_event(fields)
        } else {
            fields
        };
        self.ctx
            .facts
            .emit(SUBSYSTEM, self.stage.as_event(), decision.as_str(), out);
    }

    pub fn emit_success(self) {
        self.emit(Decision::Success);
    }
    pub fn emit_failure(self) {
        self.emit(Decision::Failure);
    }
    pub fn emit_warn(self) {
        self.emit(Decision::Warn);
    }
}
