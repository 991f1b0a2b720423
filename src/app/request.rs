//! Debounce + supersede coordination for forecast requests.
//!
//! Submissions are coalesced until the input has been quiet for `debounce`;
//! only then is a ticket issued. Issuing a ticket supersedes any request still
//! in flight: its result is discarded on arrival. Blocking HTTP cannot be
//! aborted mid-flight, so cancellation happens at the result level.
//!
//! Time is passed in explicitly so the state machine is testable without sleeping.

use std::time::{Duration, Instant};

use crate::data::Query;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// A request that should be executed now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub query: Query,
}

#[derive(Debug)]
pub struct RequestTracker {
    debounce: Duration,
    pending: Option<(Query, Instant)>,
    in_flight: Option<u64>,
    next_id: u64,
}

impl RequestTracker {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: None,
            in_flight: None,
            next_id: 1,
        }
    }

    /// Record a submission; replaces any not-yet-issued submission.
    pub fn submit(&mut self, query: Query, now: Instant) {
        if let Some((prev, _)) = &self.pending {
            tracing::debug!(replaced = prev.text(), "debounced forecast request");
        }
        self.pending = Some((query, now));
    }

    /// Issue the pending submission once the debounce window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Ticket> {
        let (_, submitted_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*submitted_at) < self.debounce {
            return None;
        }
        let (query, _) = self.pending.take()?;
        let id = self.next_id;
        self.next_id += 1;
        if let Some(stale) = self.in_flight.replace(id) {
            tracing::debug!(stale, superseded_by = id, "superseded in-flight request");
        }
        Some(Ticket { id, query })
    }

    /// Mark a ticket finished. Returns `true` only if its result should be applied.
    pub fn complete(&mut self, id: u64) -> bool {
        if self.in_flight == Some(id) {
            self.in_flight = None;
            true
        } else {
            tracing::debug!(id, "discarding stale response");
            false
        }
    }

    /// Drop the pending submission and orphan any in-flight ticket.
    ///
    /// A result that arrives later for the orphaned ticket fails `complete`.
    pub fn cancel(&mut self) {
        if let Some((query, _)) = self.pending.take() {
            tracing::debug!(dropped = query.text(), "canceled pending request");
        }
        if let Some(id) = self.in_flight.take() {
            tracing::debug!(id, "canceled in-flight request");
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || self.in_flight.is_some()
    }
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
