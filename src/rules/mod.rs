//! Pluggable line-local transformation rules.
//!
//! A [`Rule`] is keyed by a violation code and rewrites a single line slot. Rules
//! are grouped into [`SafetyTier`]s; the engine runs every trivial rule before any
//! structural rule, and content-altering rules last.

pub mod builtin;
pub mod engine;

use std::collections::HashMap;

use crate::types::{RuleApplicationError, Violation};

pub use engine::EngineOutput;

/// Risk class of a rule. Declaration order is execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SafetyTier {
    /// Whitespace-only edits.
    Trivial,
    /// Blank-line count edits.
    Structural,
    /// Edits that change tokens (line splitting, import removal).
    ContentAltering,
}

/// Replacement for one line slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    /// Full replacement text including terminator. Empty deletes the line; embedded
    /// newlines insert lines.
    pub text: String,
    /// Number of blank slots immediately before this one to clear.
    pub clear_blank_before: usize,
}

impl Edit {
    pub fn replace(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            clear_blank_before: 0,
        }
    }

    #[must_use]
    pub fn clearing_blank_before(mut self, n: usize) -> Self {
        self.clear_blank_before = n;
        self
    }
}

/// Read-only view of the slots around the line a rule is applied to.
pub struct LineContext<'a> {
    slots: &'a [String],
    index: usize,
}

impl<'a> LineContext<'a> {
    pub fn new(slots: &'a [String], index: usize) -> Self {
        Self { slots, index }
    }

    pub fn is_first(&self) -> bool {
        self.slots[..self.index].iter().all(String::is_empty)
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.slots.len()
    }

    /// Consecutive blank lines directly above this slot. Cleared slots are transparent.
    pub fn blank_lines_before(&self) -> usize {
        let mut count = 0;
        for slot in self.slots[..self.index].iter().rev() {
            for line in slot.lines().rev() {
                if line.trim().is_empty() {
                    count += 1;
                } else {
                    return count;
                }
            }
        }
        count
    }

    /// True when every slot after this one is blank or cleared.
    pub fn rest_blank(&self) -> bool {
        self.slots
            .get(self.index + 1..)
            .unwrap_or_default()
            .iter()
            .all(|s| s.trim().is_empty())
    }
}

/// A conservative, idempotent line transformation keyed by violation code.
///
/// Implementations must be pure: the same `line` and context always yield the same
/// edit, and applying a rule to its own output is a no-op.
pub trait Rule: Send + Sync {
    fn code(&self) -> &str;

    fn tier(&self) -> SafetyTier;

    /// Compute the replacement for `line`, or `None` when nothing needs to change.
    ///
    /// # Errors
    ///
    /// Returns `RuleApplicationError` when the rule cannot act on the reported
    /// violation. The error is recorded against that violation only.
    fn apply(
        &self,
        line: &str,
        violation: &Violation,
        cx: &LineContext<'_>,
    ) -> Result<Option<Edit>, RuleApplicationError>;
}

/// Ordered rule registry with code-indexed dispatch.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
    by_code: HashMap<String, usize>,
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("codes", &self.codes())
            .finish()
    }
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in rules.
    pub fn builtin() -> Self {
        builtin::all()
            .into_iter()
            .fold(Self::new(), |set, r| set.with_boxed(r))
    }

    /// Register `rule`, replacing any rule already registered for the same code.
    #[must_use]
    pub fn with_rule(self, rule: impl Rule + 'static) -> Self {
        self.with_boxed(Box::new(rule))
    }

    fn with_boxed(mut self, rule: Box<dyn Rule>) -> Self {
        let code = rule.code().to_string();
        if let Some(&idx) = self.by_code.get(&code) {
            self.rules[idx] = rule;
        } else {
            self.by_code.insert(code, self.rules.len());
            self.rules.push(rule);
        }
        self
    }

    pub fn get(&self, code: &str) -> Option<&dyn Rule> {
        self.by_code.get(code).map(|&i| self.rules[i].as_ref())
    }

    /// Registered codes in registration order.
    pub fn codes(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.code()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Split a line slot into its body and terminator (`"\n"`, `"\r\n"` or `""`).
pub(crate) fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, &line[body.len()..])
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, &line[body.len()..])
    } else {
        (line, "")
    }
}
