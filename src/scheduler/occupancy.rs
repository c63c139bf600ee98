//! Busy-time bookkeeping.
//!
//! Tracks every interval already taken (locked events, breaks, and placed
//! blocks) and answers "what is still free inside this window". Categories
//! share one timeline: a block of any task makes that time unavailable to
//! all others.

use chrono::NaiveDateTime;

use crate::models::Interval;

/// Sorted set of busy intervals.
#[derive(Debug, Clone, Default)]
pub(crate) struct Occupancy {
    /// Busy intervals ordered by start. May overlap (locked events can).
    busy: Vec<Interval>,
    /// Task blocks only, ordered by start. Never overlap.
    work: Vec<Interval>,
}

impl Occupancy {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks an interval busy. Empty intervals are ignored.
    pub(crate) fn insert(&mut self, interval: Interval) {
        if interval.is_empty() {
            return;
        }
        let pos = self.busy.partition_point(|b| b <= &interval);
        self.busy.insert(pos, interval);
    }

    /// Marks a task block busy and records it as work.
    pub(crate) fn insert_work(&mut self, interval: Interval) {
        if interval.is_empty() {
            return;
        }
        self.insert(interval);
        let pos = self.work.partition_point(|w| w <= &interval);
        self.work.insert(pos, interval);
    }

    /// Whether nothing busy overlaps `interval`.
    pub(crate) fn is_free(&self, interval: &Interval) -> bool {
        interval.is_empty() || !self.busy.iter().any(|b| b.overlaps(interval))
    }

    /// Work minutes in the run ending at `at`.
    ///
    /// Walks back over task blocks while each gap is shorter than
    /// `min_rest` minutes and entirely free. Any other busy time in a gap
    /// (a locked event or a break) ends the run.
    pub(crate) fn run_ending_at(&self, at: NaiveDateTime, min_rest: i64) -> i64 {
        let upto = self.work.partition_point(|w| w.end <= at);
        let mut cursor = at;
        let mut total = 0i64;
        for block in self.work[..upto].iter().rev() {
            let gap = Interval::new(block.end, cursor);
            if gap.duration_minutes() >= min_rest || !self.is_free(&gap) {
                break;
            }
            total = total.saturating_add(block.duration_minutes());
            cursor = block.start;
        }
        total
    }

    /// Free sub-intervals of `window`, in chronological order.
    pub(crate) fn free_within(&self, window: &Interval) -> Vec<Interval> {
        let mut free = Vec::new();
        let mut cursor = window.start;
        for busy in &self.busy {
            if busy.start >= window.end {
                break;
            }
            if busy.end <= cursor {
                continue;
            }
            if busy.start > cursor {
                free.push(Interval::new(cursor, busy.start));
            }
            cursor = cursor.max(busy.end);
            if cursor >= window.end {
                break;
            }
        }
        if cursor < window.end {
            free.push(Interval::new(cursor, window.end));
        }
        free
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.busy.len()
    }
}
