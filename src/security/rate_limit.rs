//! Global fixed-window admission gate.
//!
//! One gate per process, shared by every request. The window is one second
//! and resets on the first check that arrives more than a second after the
//! window opened. Up to `2 × limit` requests can pass across a window
//! boundary; callers that need a smoother rate must use a different policy.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::observability::metrics;

/// Length of one admission window.
pub const WINDOW: Duration = Duration::from_secs(1);

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected,
}

impl Admission {
    pub fn is_admitted(self) -> bool {
        self == Admission::Admitted
    }
}

#[derive(Debug)]
struct Window {
    /// `None` until the first check.
    start: Option<Instant>,
    count: i64,
}

/// Fixed-window request counter with a global limit.
#[derive(Debug)]
pub struct AdmissionGate {
    limit: i64,
    window: Mutex<Window>,
}

impl AdmissionGate {
    /// Create a gate admitting at most `limit` requests per second.
    ///
    /// A `limit` of zero or less rejects every request.
    pub fn new(limit: i64) -> Self {
        Self {
            limit,
            window: Mutex::new(Window {
                start: None,
                count: 0,
            }),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Decide whether one more request may pass in the current window.
    pub fn admit(&self) -> Admission {
        let admission = self.admit_at(Instant::now());
        if !admission.is_admitted() {
            metrics::record_rate_limited();
        }
        admission
    }

    /// Admission check against an explicit clock reading.
    ///
    /// Rollover, limit check and increment happen under one lock.
    pub(crate) fn admit_at(&self, now: Instant) -> Admission {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);

        let expired = window
            .start
            .map_or(true, |start| now.saturating_duration_since(start) > WINDOW);
        if expired {
            window.start = Some(now);
            window.count = 0;
        }

        if window.count >= self.limit {
            return Admission::Rejected;
        }

        window.count += 1;
        Admission::Admitted
    }

    /// Requests admitted in the current window so far.
    pub fn in_window(&self) -> i64 {
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }
}
