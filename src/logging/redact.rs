use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const TS_ZERO: &str = "1970-01-01T00:00:00Z";

pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| TS_ZERO.to_string())
}

/// Apply redactions to a fact event for comparison and safe logging.
/// Zeroes timestamps and removes fields that vary between otherwise identical runs.
pub fn redact_event(mut v: Value) -> Value {
    if let Some(obj) = v.as_object_mut() {
        obj.insert("ts".into(), Value::String(TS_ZERO.to_string()));
        obj.remove("run_id");
        // Volatile timings
        obj.remove("duration_ms");
        obj.remove("duration_seconds");
        obj.remove("lock_wait_ms");
        // Content hashes and snapshot locations embed run-specific data
        obj.remove("before_hash");
        obj.remove("after_hash");
        obj.remove("snapshot_path");
    }
    v
}
