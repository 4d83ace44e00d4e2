//! One remediation pass over a resource's content.
//!
//! Violations are attempted tier by tier in safety order and, inside a tier, in
//! descending `(line, column)` order. Content is held as line slots that never
//! shift: an edit replaces its own slot (possibly with several lines, or nothing),
//! so the line number of every violation not yet attempted stays valid.
use std::cmp::Reverse;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::types::report::reason;
use crate::types::{RuleApplicationError, RuleOutcome, Violation, ViolationStatus};

use super::{LineContext, RuleSet, SafetyTier};

/// Result of one engine pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOutput {
    pub content: String,
    /// One outcome per input violation, in input order.
    pub outcomes: Vec<RuleOutcome>,
    pub changed: bool,
}

impl EngineOutput {
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.applied).count()
    }
}

fn outcome(v: &Violation, applied: bool, reason: impl Into<String>, status: ViolationStatus) -> RuleOutcome {
    RuleOutcome {
        violation_id: v.violation_id(),
        code: v.code.clone(),
        line: v.line,
        applied,
        reason: reason.into(),
        status,
    }
}

/// Clear up to `n` blank slots directly above `index`. Already-cleared slots are skipped.
fn clear_blank_before(slots: &mut [String], index: usize, n: usize) -> usize {
    let mut cleared = 0;
    for slot in slots[..index].iter_mut().rev() {
        if cleared == n {
            break;
        }
        if slot.is_empty() {
            continue;
        }
        if !slot.trim().is_empty() {
            break;
        }
        slot.clear();
        cleared += 1;
    }
    cleared
}

impl RuleSet {
    /// Apply the registered rules for `violations` to `content`.
    ///
    /// Never fails: a rule error or panic is recorded against its violation and the
    /// pass continues with the next one.
    pub fn apply(&self, content: &str, violations: &[Violation]) -> EngineOutput {
        let mut slots: Vec<String> = content.split_inclusive('\n').map(String::from).collect();
        let mut outcomes: Vec<Option<RuleOutcome>> = vec![None; violations.len()];

        let mut queue: Vec<(SafetyTier, usize)> = Vec::with_capacity(violations.len());
        for (i, v) in violations.iter().enumerate() {
            match self.get(&v.code) {
                None => {
                    outcomes[i] = Some(outcome(v, false, reason::NO_RULE, ViolationStatus::Skipped));
                }
                Some(_) if v.line == 0 || v.line as usize > slots.len() => {
                    outcomes[i] = Some(outcome(
                        v,
                        false,
                        reason::LINE_OUT_OF_RANGE,
                        ViolationStatus::Skipped,
                    ));
                }
                Some(rule) => queue.push((rule.tier(), i)),
            }
        }
        queue.sort_by_key(|&(tier, i)| {
            let v = &violations[i];
            (tier, Reverse(v.line), Reverse(v.column), v.code.clone())
        });

        for (_, i) in queue {
            let v = &violations[i];
            let Some(rule) = self.get(&v.code) else {
                continue;
            };
            let idx = (v.line - 1) as usize;
            let before = slots[idx].clone();
            let attempt = {
                let cx = LineContext::new(&slots, idx);
                catch_unwind(AssertUnwindSafe(|| rule.apply(&before, v, &cx)))
                    .unwrap_or_else(|_| {
                        Err(RuleApplicationError::Panicked {
                            code: v.code.clone(),
                        })
                    })
            };
            outcomes[i] = Some(match attempt {
                Err(e) => outcome(
                    v,
                    false,
                    format!("{}: {e}", reason::RULE_ERROR_PREFIX),
                    ViolationStatus::Failed,
                ),
                Ok(None) => outcome(v, false, reason::NO_OP, ViolationStatus::Skipped),
                Ok(Some(edit)) => {
                    let cleared = clear_blank_before(&mut slots, idx, edit.clear_blank_before);
                    if edit.text != before || cleared > 0 {
                        slots[idx] = edit.text;
                        outcome(v, true, reason::FIXED, ViolationStatus::Fixed)
                    } else {
                        outcome(v, false, reason::NO_OP, ViolationStatus::Skipped)
                    }
                }
            });
        }

        let new_content = slots.concat();
        let changed = new_content != content;
        EngineOutput {
            content: new_content,
            outcomes: outcomes.into_iter().flatten().collect(),
            changed,
        }
    }
}
