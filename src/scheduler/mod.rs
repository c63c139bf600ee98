//! Slot scheduler and KPI evaluation.
//!
//! Places validated tasks into free active-hour time and reports what could
//! not be placed.
//!
//! # Algorithm
//!
//! `SlotScheduler` is a greedy, priority-driven, first-fit heuristic that
//! walks the horizon day by day. It does not minimise fragmentation or
//! lateness; it is deterministic and never violates active hours, locked
//! events, or other tasks' blocks.
//!
//! # KPI
//!
//! `ScheduleSummary` computes placed/unplaced time, tardiness, on-time rate,
//! and fragmentation.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod kpi;
mod occupancy;
mod slot;

pub use kpi::ScheduleSummary;
pub use slot::{ScheduleRequest, SlotScheduler};

use chrono::NaiveDateTime;

use crate::error::ScheduleError;
use crate::models::{ActiveHoursRegistry, ScheduleResult, Task};

/// Schedules tasks with the default configuration and ordering.
///
/// Shorthand for [`SlotScheduler::schedule`].
pub fn schedule(
    tasks: &[Task],
    active_hours: &ActiveHoursRegistry,
    horizon_start: NaiveDateTime,
    horizon_end: NaiveDateTime,
    reference_now: NaiveDateTime,
) -> Result<ScheduleResult, ScheduleError> {
    SlotScheduler::new().schedule(tasks, active_hours, horizon_start, horizon_end, reference_now)
}
