//! Scheduling context for dispatching rule evaluation.

use chrono::NaiveDateTime;

/// State passed to dispatching rules.
///
/// Deadline-relative rules measure from `now`, the instant placement begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingContext {
    /// Effective start of placement.
    pub now: NaiveDateTime,
}

impl SchedulingContext {
    /// Creates a context at the given instant.
    pub fn at_time(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Minutes from `now` until `instant` (negative when already past).
    pub fn minutes_until(&self, instant: NaiveDateTime) -> i64 {
        (instant - self.now).num_minutes()
    }
}
