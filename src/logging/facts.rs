use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use log::Level;
use serde_json::{json, Value};

/// Structured fact sink. Called concurrently from worker threads.
pub trait FactsEmitter: Send + Sync {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Human-readable audit trail.
pub trait AuditSink: Send + Sync {
    fn log(&self, level: Level, msg: &str);
}

/// Discards everything. Default sink for embedders that do not collect facts.
#[derive(Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for JsonlSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Appends one JSON object per fact to a file.
pub struct JsonlFileSink {
    file: Mutex<File>,
}

impl JsonlFileSink {
    /// Open (or create) `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be opened.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl FactsEmitter for JsonlFileSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        let mut line = json!({
            "subsystem": subsystem,
            "event": event,
            "decision": decision,
        });
        if let (Some(obj), Value::Object(extra)) = (line.as_object_mut(), fields) {
            for (k, v) in extra {
                obj.entry(k).or_insert(v);
            }
        }
        if let Ok(mut f) = self.file.lock() {
            let _ = writeln!(f, "{line}");
        }
    }
}

/// Audit sink that writes through the `log` facade when a logger is installed,
/// and to stderr otherwise.
#[derive(Default)]
pub struct StderrAudit {
    pub min_level: Option<Level>,
}

impl AuditSink for StderrAudit {
    fn log(&self, level: Level, msg: &str) {
        if self.min_level.is_some_and(|min| level > min) {
            return;
        }
        if log::log_enabled!(target: "mendyard", level) {
            log::log!(target: "mendyard", level, "{msg}");
        } else {
            eprintln!("[{}] {msg}", level.as_str().to_ascii_lowercase());
        }
    }
}
