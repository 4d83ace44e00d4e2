//! Admission control for the worker pool.
//!
//! Two limits are enforced together under one lock: at most `cap` batches in
//! flight, and at most one in-flight batch per resource. Acquire and release facts
//! are emitted while the lock is held, so the fact stream orders them exactly as
//! the state changed.
use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::json;

use crate::logging::audit::AuditCtx;
use crate::logging::StageLogger;
use crate::types::ResourceId;

/// Upper bound on a single wait before the stop condition is polled again.
const WAIT_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Default)]
struct AdmissionState {
    inflight: usize,
    busy: HashSet<ResourceId>,
}

#[derive(Debug)]
pub(crate) struct AdmissionControl {
    cap: usize,
    state: Mutex<AdmissionState>,
    freed: Condvar,
}

/// Held by a worker for the duration of one batch. Dropping it frees the slot.
pub(crate) struct Permit<'a> {
    ctl: &'a AdmissionControl,
    resource: ResourceId,
    tctx: &'a AuditCtx<'a>,
}

impl AdmissionControl {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            state: Mutex::new(AdmissionState::default()),
            freed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AdmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until a slot is free and `resource` is not being worked on.
    ///
    /// Returns `None` as soon as `stop()` reports true; no slot is taken then.
    pub(crate) fn acquire<'a>(
        &'a self,
        resource: &ResourceId,
        stop: impl Fn() -> bool,
        tctx: &'a AuditCtx<'a>,
    ) -> Option<Permit<'a>> {
        let mut st = self.lock();
        loop {
            if stop() {
                return None;
            }
            if st.inflight < self.cap && !st.busy.contains(resource) {
                st.inflight += 1;
                st.busy.insert(resource.clone());
                StageLogger::new(tctx)
                    .admission()
                    .resource(resource.as_str())
                    .merge(json!({
                        "action": "acquire",
                        "inflight": st.inflight,
                        "cap": self.cap,
                    }))
                    .emit_success();
                return Some(Permit {
                    ctl: self,
                    resource: resource.clone(),
                    tctx,
                });
            }
            st = self
                .freed
                .wait_timeout(st, WAIT_SLICE)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    #[cfg(test)]
    fn inflight(&self) -> usize {
        self.lock().inflight
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let mut st = self.ctl.lock();
        st.inflight = st.inflight.saturating_sub(1);
        st.busy.remove(&self.resource);
        StageLogger::new(self.tctx)
            .admission()
            .resource(self.resource.as_str())
            .merge(json!({
                "action": "release",
                "inflight": st.inflight,
                "cap": self.ctl.cap,
            }))
            .emit_success();
        drop(st);
        self.ctl.freed.notify_all();
    }
}
