//! Schedule quality metrics (KPIs).
//!
//! Computes summary indicators from a [`ScheduleResult`] and its input
//! tasks.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Scheduled / Unscheduled minutes | Placed vs. left-over time |
//! | Completion Rate | scheduled / requested minutes |
//! | Total Tardiness | Sum of max(0, completion - deadline) |
//! | Maximum Tardiness | Largest single delay |
//! | On-Time Rate | Fraction of deadline tasks fully placed by their deadline |
//! | Fragmentation | Mean blocks per placed task |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{Category, ScheduleResult, Task};

/// Schedule performance indicators.
///
/// All durations are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Total minutes this run was asked to place (already-scheduled time
    /// excluded).
    pub requested_minutes: i64,
    /// Total placed minutes.
    pub scheduled_minutes: i64,
    /// Total minutes left unscheduled.
    pub unscheduled_minutes: i64,
    /// Tasks placed in full.
    pub fully_scheduled_tasks: usize,
    /// Sum of tardiness across deadline tasks that were placed.
    pub total_tardiness_minutes: i64,
    /// Maximum tardiness of any single task.
    pub max_tardiness_minutes: i64,
    /// Fraction of deadline tasks fully placed by their deadline (0.0..1.0).
    pub on_time_rate: f64,
    /// Mean number of blocks per task that got at least one block.
    pub avg_blocks_per_task: f64,
    /// Placed minutes per category.
    pub minutes_by_category: BTreeMap<Category, i64>,
    /// End of the last block.
    pub last_block_end: Option<NaiveDateTime>,
}

impl ScheduleSummary {
    /// Computes KPIs from a result and its input tasks.
    ///
    /// # Arguments
    /// * `result` - The schedule produced for `tasks`.
    /// * `tasks` - The input tasks (for durations, categories, deadlines).
    pub fn calculate(result: &ScheduleResult, tasks: &[Task]) -> Self {
        let mut requested = 0i64;
        let mut scheduled = 0i64;
        let mut fully_scheduled = 0;
        let mut total_tardiness = 0;
        let mut max_tardiness = 0;
        let mut deadline_tasks = 0usize;
        let mut on_time = 0usize;
        let mut placed_tasks = 0usize;
        let mut minutes_by_category = BTreeMap::new();

        for task in tasks {
            let wanted = task.remaining_minutes();
            let placed = result.scheduled_minutes_for_task(&task.id);
            requested = requested.saturating_add(wanted);
            scheduled = scheduled.saturating_add(placed);
            let by_category = minutes_by_category.entry(task.category).or_insert(0i64);
            *by_category = by_category.saturating_add(placed);

            let complete = placed >= wanted;
            if complete {
                fully_scheduled += 1;
            }
            if placed > 0 {
                placed_tasks += 1;
            }

            if let Some(deadline) = task.deadline {
                deadline_tasks += 1;
                let completion = result.completion_time(&task.id);
                let tardiness = completion
                    .map(|c| (c - deadline).num_minutes().max(0))
                    .unwrap_or(0);
                total_tardiness += tardiness;
                max_tardiness = max_tardiness.max(tardiness);
                if complete && tardiness == 0 {
                    on_time += 1;
                }
            }
        }

        let on_time_rate = if deadline_tasks == 0 {
            1.0
        } else {
            on_time as f64 / deadline_tasks as f64
        };
        let avg_blocks_per_task = if placed_tasks == 0 {
            0.0
        } else {
            result.blocks.len() as f64 / placed_tasks as f64
        };

        Self {
            requested_minutes: requested,
            scheduled_minutes: scheduled,
            unscheduled_minutes: requested.saturating_sub(scheduled),
            fully_scheduled_tasks: fully_scheduled,
            total_tardiness_minutes: total_tardiness,
            max_tardiness_minutes: max_tardiness,
            on_time_rate,
            avg_blocks_per_task,
            minutes_by_category,
            last_block_end: result.last_block_end(),
        }
    }

    /// scheduled / requested minutes (1.0 when nothing was requested).
    pub fn completion_rate(&self) -> f64 {
        if self.requested_minutes == 0 {
            1.0
        } else {
            self.scheduled_minutes as f64 / self.requested_minutes as f64
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_tardiness_minutes: i64, min_completion_rate: f64) -> bool {
        self.max_tardiness_minutes <= max_tardiness_minutes
            && self.completion_rate() >= min_completion_rate
    }
}
