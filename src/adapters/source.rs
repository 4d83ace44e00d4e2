//! Violation sources: the boundary to the external static-analysis tool.
//!
//! Records are checked against the source contract (non-empty resource, 1-indexed
//! line and column, non-empty code). Records that fail it are reported as
//! [`SourceIssue`]s and dropped; they never reach the prioritizer.
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::types::errors::{Error, ErrorKind, Result};
use crate::types::{ResourceId, Violation};

/// A record rejected by a source, with its position in the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceIssue {
    /// 1-indexed record position (input line for text, array index + 1 for JSON).
    pub record: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct SourceOutput {
    pub violations: Vec<Violation>,
    pub issues: Vec<SourceIssue>,
}

pub trait ViolationSource {
    /// Produce the flat violation list. Ordering is not significant.
    ///
    /// # Errors
    ///
    /// Returns an error when the input as a whole cannot be read or parsed.
    fn load(&self) -> Result<SourceOutput>;
}

/// Validate one raw record against the contract and build a `Violation`.
fn to_violation(
    root: &Path,
    path: &str,
    line: u32,
    column: u32,
    code: &str,
    message: &str,
) -> std::result::Result<Violation, String> {
    if path.trim().is_empty() {
        return Err("empty resource id".into());
    }
    if line == 0 || column == 0 {
        return Err(format!("line/column must be 1-indexed (got {line}:{column})"));
    }
    if code.trim().is_empty() {
        return Err("empty code".into());
    }
    let rid = ResourceId::from_rooted(root, Path::new(path)).map_err(|e| format!("{path}: {e}"))?;
    Ok(Violation::new(rid, line, column, code.trim(), message.trim()))
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::new(ErrorKind::Io, format!("{}: {e}", path.display())))
}

/// flake8 default text output: `path:line:col: CODE message`.
#[derive(Debug)]
pub struct Flake8TextSource {
    root: PathBuf,
    text: String,
}

impl Flake8TextSource {
    pub fn from_text(root: &Path, text: impl Into<String>) -> Self {
        Self {
            root: root.to_path_buf(),
            text: text.into(),
        }
    }

    /// # Errors
    ///
    /// Returns `ErrorKind::Io` if `path` cannot be read.
    pub fn from_path(root: &Path, path: &Path) -> Result<Self> {
        Ok(Self::from_text(root, read_input(path)?))
    }
}

impl ViolationSource for Flake8TextSource {
    fn load(&self) -> Result<SourceOutput> {
        let re = Regex::new(r"^(?P<path>.+?):(?P<line>\d+):(?P<col>\d+):\s*(?P<code>[A-Z]+[0-9]+)\s*(?P<msg>.*)$")
            .map_err(|e| Error::new(ErrorKind::Input, e.to_string()))?;
        let mut out = SourceOutput::default();
        for (idx, raw) in self.text.lines().enumerate() {
            let record = idx + 1;
            let raw = raw.trim_end();
            if raw.trim().is_empty() {
                continue;
            }
            let Some(caps) = re.captures(raw) else {
                out.issues.push(SourceIssue {
                    record,
                    reason: format!("unrecognized line: {raw}"),
                });
                continue;
            };
            let (Ok(line), Ok(col)) = (caps["line"].parse::<u32>(), caps["col"].parse::<u32>()) else {
                out.issues.push(SourceIssue {
                    record,
                    reason: "line/column out of range".into(),
                });
                continue;
            };
            match to_violation(&self.root, &caps["path"], line, col, &caps["code"], &caps["msg"]) {
                Ok(v) => out.violations.push(v),
                Err(reason) => out.issues.push(SourceIssue { record, reason }),
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(alias = "path", alias = "file", alias = "filename")]
    resource_id: String,
    #[serde(alias = "line_number")]
    line: u32,
    #[serde(default = "one", alias = "column_number")]
    column: u32,
    #[serde(alias = "error_code")]
    code: String,
    #[serde(default, alias = "text")]
    message: String,
}

fn one() -> u32 {
    1
}

/// JSON array of violation records.
#[derive(Debug)]
pub struct JsonViolationSource {
    root: PathBuf,
    text: String,
}

impl JsonViolationSource {
    pub fn from_text(root: &Path, text: impl Into<String>) -> Self {
        Self {
            root: root.to_path_buf(),
            text: text.into(),
        }
    }

    /// # Errors
    ///
    /// Returns `ErrorKind::Io` if `path` cannot be read.
    pub fn from_path(root: &Path, path: &Path) -> Result<Self> {
        Ok(Self::from_text(root, read_input(path)?))
    }
}

impl ViolationSource for JsonViolationSource {
    fn load(&self) -> Result<SourceOutput> {
        let values: Vec<serde_json::Value> = serde_json::from_str(&self.text)
            .map_err(|e| Error::new(ErrorKind::Input, format!("violations json: {e}")))?;
        let mut out = SourceOutput::default();
        for (idx, value) in values.into_iter().enumerate() {
            let record = idx + 1;
            let parsed = serde_json::from_value::<RawRecord>(value)
                .map_err(|e| e.to_string())
                .and_then(|r| {
                    to_violation(&self.root, &r.resource_id, r.line, r.column, &r.code, &r.message)
                });
            match parsed {
                Ok(v) => out.violations.push(v),
                Err(reason) => out.issues.push(SourceIssue { record, reason }),
            }
        }
        Ok(out)
    }
}
