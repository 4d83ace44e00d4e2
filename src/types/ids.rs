//! Deterministic UUIDv5 identifiers for batches, plus run session ids.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that
//! `batch_id` is reproducible across runs for the same resource and
//! violation set.
use std::fmt::Write;

use time::OffsetDateTime;
use uuid::Uuid;

use super::resource::ResourceId;
use super::violation::Violation;
use crate::constants::NS_TAG;

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Compute a deterministic UUIDv5 for a batch from its resource and violation keys.
///
/// Violations are expected in the batch's canonical order.
#[must_use]
pub fn batch_id(resource: &ResourceId, violations: &[Violation]) -> Uuid {
    let mut s = String::new();
    s.push_str(resource.as_str());
    s.push('\n');
    for v in violations {
        let _ = writeln!(s, "{}:{}:{}", v.line, v.column, v.code);
    }
    Uuid::new_v5(&namespace(), s.as_bytes())
}

/// Deterministic id of a planned batch list, derived from its batch ids in order.
#[must_use]
pub fn plan_id(batch_ids: &[Uuid]) -> Uuid {
    let mut s = String::new();
    for id in batch_ids {
        s.push_str(&id.simple().to_string());
    }
    Uuid::new_v5(&namespace(), s.as_bytes())
}

/// Fresh run session id: `run_<YYYYMMDD>T<HHMMSS>_<8 hex>`.
///
/// Sortable by start time, unique across concurrent starts.
#[must_use]
pub fn new_run_id() -> String {
    let now = OffsetDateTime::now_utc();
    let rand = Uuid::new_v4().simple().to_string();
    format!(
        "run_{:04}{:02}{:02}T{:02}{:02}{:02}_{}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        &rand[..8]
    )
}
