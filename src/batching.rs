//! Prioritizer/Batcher: group violations per resource, classify, order.
//!
//! Ordering is `(priority rank, violation count)` descending with the resource id
//! as an ascending tie-break, so the same input always yields the same batch list.
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::policy::types::PrioritySettings;
use crate::types::{batch_id, Batch, BatchStatus, Priority, ResourceId, Violation};

/// Classify a group of violations belonging to one resource.
#[must_use]
pub fn classify(violations: &[Violation], settings: &PrioritySettings) -> Priority {
    if violations.iter().any(|v| settings.is_fatal(&v.code)) {
        return Priority::Critical;
    }
    let adjacent = violations
        .iter()
        .filter(|v| settings.is_adjacent(&v.code))
        .count();
    // Strictly more than half
    if adjacent * 2 > violations.len() {
        return Priority::High;
    }
    if violations.len() > settings.bulk_threshold {
        return Priority::Medium;
    }
    Priority::Low
}

/// Build the ordered batch list. Empty input yields an empty list.
///
/// Duplicate records (same identity) are dropped; violations inside a batch are
/// ordered by `(line, column, code)`.
#[must_use]
pub fn build_batches(violations: Vec<Violation>, settings: &PrioritySettings) -> Vec<Batch> {
    let mut groups: BTreeMap<ResourceId, Vec<Violation>> = BTreeMap::new();
    for v in violations {
        groups.entry(v.resource_id.clone()).or_default().push(v);
    }

    let mut batches: Vec<Batch> = groups
        .into_iter()
        .map(|(resource_id, mut vs)| {
            vs.sort_by(|a, b| (a.line, a.column, &a.code).cmp(&(b.line, b.column, &b.code)));
            vs.dedup_by(|a, b| a.line == b.line && a.column == b.column && a.code == b.code);
            let priority = classify(&vs, settings);
            Batch {
                batch_id: batch_id(&resource_id, &vs),
                resource_id,
                violations: vs,
                priority,
                status: BatchStatus::Pending,
            }
        })
        .collect();

    batches.sort_by(|a, b| {
        (Reverse(a.priority.rank()), Reverse(a.len()), &a.resource_id).cmp(&(
            Reverse(b.priority.rank()),
            Reverse(b.len()),
            &b.resource_id,
        ))
    });
    batches
}

/// Admission filter: keep only `priority_filter` batches, then cap at `max_batches`.
/// Sorted order is preserved.
#[must_use]
pub fn admit(
    batches: Vec<Batch>,
    max_batches: Option<usize>,
    priority_filter: Option<Priority>,
) -> Vec<Batch> {
    batches
        .into_iter()
        .filter(|b| priority_filter.map_or(true, |p| b.priority == p))
        .take(max_batches.unwrap_or(usize::MAX))
        .collect()
}
