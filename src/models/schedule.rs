//! Schedule (solution) model.
//!
//! A [`ScheduleResult`] holds the concrete blocks placed on the calendar,
//! the portions of tasks that could not be placed, reserved breaks, and
//! non-fatal warnings.
//! Shortfalls are data, not errors: the caller always gets the best-effort
//! schedule together with an account of what is missing.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Category, Interval, Task};

/// One contiguous block of a task placed on the calendar.
///
/// A non-splittable task produces exactly one block. A split task produces
/// several, numbered chronologically from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledBlock {
    /// Owning task ID.
    pub task_id: String,
    /// Block start.
    pub start: NaiveDateTime,
    /// Block end (exclusive).
    pub end: NaiveDateTime,
    /// Position of this block among the task's blocks (chronological).
    pub segment_index: u32,
}

impl ScheduledBlock {
    /// Creates a new block.
    pub fn new(
        task_id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        segment_index: u32,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            start,
            end,
            segment_index,
        }
    }

    /// Block length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        self.interval().duration_minutes()
    }

    /// The occupied interval.
    #[inline]
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// Why part of a task could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// Not enough free active-hour time in the horizon.
    NoCapacity,
    /// The deadline had already passed when placement began.
    DeadlineMissed,
}

/// A task (or its remainder) left off the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnscheduledTask {
    /// The task as validated.
    pub task: Task,
    /// Hours that could not be placed.
    pub remaining_hours: f64,
    /// Why placement stopped.
    pub reason: UnscheduledReason,
}

impl UnscheduledTask {
    /// Unplaced time in whole minutes.
    #[inline]
    pub fn remaining_minutes(&self) -> i64 {
        super::hours_to_minutes(self.remaining_hours)
    }
}

/// Non-fatal observations about a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Demand for a category exceeds its capacity inside the horizon.
    CategoryOverloaded {
        /// Overloaded category.
        category: Category,
        /// Demand minus capacity, in minutes.
        shortfall_minutes: i64,
    },
    /// Part of a task was placed after its deadline.
    DeadlineMissed {
        /// Late task.
        task_id: String,
        /// The deadline that was missed.
        deadline: NaiveDateTime,
        /// Minutes of the task placed after the deadline.
        minutes_past_deadline: i64,
    },
}

impl Warning {
    /// Task the warning refers to, if any.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Warning::CategoryOverloaded { .. } => None,
            Warning::DeadlineMissed { task_id, .. } => Some(task_id),
        }
    }
}

/// Output of one scheduling call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Placed blocks, ordered by start time.
    pub blocks: Vec<ScheduledBlock>,
    /// Tasks (or remainders) that could not be placed.
    pub unscheduled: Vec<UnscheduledTask>,
    /// Overload and lateness notes.
    pub warnings: Vec<Warning>,
    /// Rest periods reserved between runs of work, ordered by start.
    #[serde(default)]
    pub breaks: Vec<Interval>,
}

impl ScheduleResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every task was fully placed.
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }

    /// Blocks belonging to a task, in segment order.
    pub fn blocks_for_task(&self, task_id: &str) -> Vec<&ScheduledBlock> {
        let mut blocks: Vec<_> = self.blocks.iter().filter(|b| b.task_id == task_id).collect();
        blocks.sort_by_key(|b| b.segment_index);
        blocks
    }

    /// Total minutes placed for a task.
    pub fn scheduled_minutes_for_task(&self, task_id: &str) -> i64 {
        self.blocks
            .iter()
            .filter(|b| b.task_id == task_id)
            .map(ScheduledBlock::duration_minutes)
            .sum()
    }

    /// Completion time for a task (end of its last block).
    pub fn completion_time(&self, task_id: &str) -> Option<NaiveDateTime> {
        self.blocks
            .iter()
            .filter(|b| b.task_id == task_id)
            .map(|b| b.end)
            .max()
    }

    /// Unscheduled entry for a task, if any.
    pub fn unscheduled_for(&self, task_id: &str) -> Option<&UnscheduledTask> {
        self.unscheduled.iter().find(|u| u.task.id == task_id)
    }

    /// Latest block end across all tasks.
    pub fn last_block_end(&self) -> Option<NaiveDateTime> {
        self.blocks.iter().map(|b| b.end).max()
    }

    /// Placed minutes per date.
    pub fn minutes_by_date(&self) -> BTreeMap<chrono::NaiveDate, i64> {
        let mut by_date = BTreeMap::new();
        for b in &self.blocks {
            *by_date.entry(b.start.date()).or_insert(0) += b.duration_minutes();
        }
        by_date
    }

    /// Deadline-missed warnings.
    pub fn late_tasks(&self) -> impl Iterator<Item = &Warning> {
        self.warnings
            .iter()
            .filter(|w| matches!(w, Warning::DeadlineMissed { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample_result() -> ScheduleResult {
        ScheduleResult {
            blocks: vec![
                ScheduledBlock::new("T1", at(15, 9, 0), at(15, 10, 0), 0),
                ScheduledBlock::new("T2", at(15, 10, 0), at(15, 10, 30), 0),
                ScheduledBlock::new("T1", at(16, 9, 0), at(16, 11, 0), 1),
            ],
            unscheduled: vec![UnscheduledTask {
                task: Task::new("T3", 2.0),
                remaining_hours: 1.5,
                reason: UnscheduledReason::NoCapacity,
            }],
            warnings: vec![Warning::DeadlineMissed {
                task_id: "T1".into(),
                deadline: at(16, 10, 0),
                minutes_past_deadline: 60,
            }],
            breaks: Vec::new(),
        }
    }

    #[test]
    fn test_block_duration() {
        let b = ScheduledBlock::new("T1", at(15, 9, 0), at(15, 10, 15), 0);
        assert_eq!(b.duration_minutes(), 75);
    }

    #[test]
    fn test_blocks_for_task() {
        let r = sample_result();
        let t1 = r.blocks_for_task("T1");
        assert_eq!(t1.len(), 2);
        assert_eq!(t1[0].segment_index, 0);
        assert_eq!(t1[1].segment_index, 1);
        assert!(r.blocks_for_task("T9").is_empty());
    }

    #[test]
    fn test_minutes_and_completion() {
        let r = sample_result();
        assert_eq!(r.scheduled_minutes_for_task("T1"), 180);
        assert_eq!(r.completion_time("T1"), Some(at(16, 11, 0)));
        assert_eq!(r.completion_time("T9"), None);
        assert_eq!(r.last_block_end(), Some(at(16, 11, 0)));

        let by_date = r.minutes_by_date();
        assert_eq!(by_date[&at(15, 0, 0).date()], 90);
        assert_eq!(by_date[&at(16, 0, 0).date()], 120);
    }

    #[test]
    fn test_unscheduled_lookup() {
        let r = sample_result();
        assert!(!r.is_complete());
        let u = r.unscheduled_for("T3").unwrap();
        assert_eq!(u.remaining_minutes(), 90);
        assert!(ScheduleResult::new().is_complete());
    }

    #[test]
    fn test_warning_json_shape() {
        let w = Warning::CategoryOverloaded {
            category: Category::Work,
            shortfall_minutes: 120,
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "category_overloaded");
        assert_eq!(json["category"], "work");
        assert_eq!(json["shortfall_minutes"], 120);
        assert_eq!(w.task_id(), None);

        let r = sample_result();
        assert_eq!(r.late_tasks().count(), 1);
        assert_eq!(r.warnings[0].task_id(), Some("T1"));
    }

    #[test]
    fn test_unscheduled_reason_json() {
        let json = serde_json::to_string(&UnscheduledReason::DeadlineMissed).unwrap();
        assert_eq!(json, "\"deadline_missed\"");
    }
}
