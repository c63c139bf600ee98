//! Error types.
//!
//! Structural input problems (bad ranges, bad tasks, oversized horizons,
//! bad configuration) are returned as errors before any placement happens.
//! Capacity and deadline shortfalls are *not* errors: they are reported as
//! data in [`ScheduleResult`](crate::models::ScheduleResult).

use chrono::{NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::models::Category;

/// A label that does not name any known category or priority.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown label `{0}`")]
pub struct UnknownLabel(pub String);

/// An active-hour range that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRangeError {
    /// The range is empty or inverted.
    #[error("active hour range {start}-{end} is empty or inverted")]
    NotIncreasing {
        /// Range start.
        start: NaiveTime,
        /// Range end.
        end: NaiveTime,
    },
    /// Two ranges of the same category overlap.
    #[error("{category} ranges {first_start}-{first_end} and {second_start}-{second_end} overlap")]
    Overlapping {
        /// Category holding both ranges.
        category: Category,
        /// Earlier range start.
        first_start: NaiveTime,
        /// Earlier range end.
        first_end: NaiveTime,
        /// Later range start.
        second_start: NaiveTime,
        /// Later range end.
        second_end: NaiveTime,
    },
}

/// A task that failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskValidationError {
    /// Task id is blank.
    #[error("task id must not be empty")]
    EmptyId,
    /// Two tasks share an id.
    #[error("duplicate task id `{task_id}`")]
    DuplicateId {
        /// Offending id.
        task_id: String,
    },
    /// Duration is NaN or infinite.
    #[error("task `{task_id}` has a non-finite duration")]
    NonFiniteDuration {
        /// Offending task.
        task_id: String,
    },
    /// Duration is zero or negative.
    #[error("task `{task_id}` duration {duration}h must be positive")]
    NonPositiveDuration {
        /// Offending task.
        task_id: String,
        /// Requested duration (hours).
        duration: f64,
    },
    /// `min_duration <= duration <= max_duration` does not hold.
    #[error("task `{task_id}` violates min {min}h <= duration {duration}h <= max {max}h")]
    BoundsOrder {
        /// Offending task.
        task_id: String,
        /// Minimum block length (hours).
        min: f64,
        /// Requested duration (hours).
        duration: f64,
        /// Maximum block length (hours).
        max: f64,
    },
    /// Already-scheduled hours are negative, non-finite, or exceed the duration.
    #[error("task `{task_id}` scheduled {scheduled}h must be within 0..={duration}h")]
    ScheduledOutOfRange {
        /// Offending task.
        task_id: String,
        /// Hours already scheduled.
        scheduled: f64,
        /// Requested duration (hours).
        duration: f64,
    },
    /// Category label not recognised.
    #[error("task `{task_id}` has unknown category `{value}`")]
    UnknownCategory {
        /// Offending task.
        task_id: String,
        /// Raw label.
        value: String,
    },
    /// Priority label not recognised.
    #[error("task `{task_id}` has unknown priority `{value}`")]
    UnknownPriority {
        /// Offending task.
        task_id: String,
        /// Raw label.
        value: String,
    },
    /// A date-time string could not be parsed.
    #[error("task `{task_id}` has unparseable {field} `{value}`")]
    InvalidInstant {
        /// Offending task.
        task_id: String,
        /// Field name (`deadline`, `earliest_start`).
        field: &'static str,
        /// Raw value.
        value: String,
    },
    /// Deadline lies before the horizon start.
    #[error("task `{task_id}` deadline {deadline} is before horizon start {horizon_start}")]
    DeadlineBeforeHorizon {
        /// Offending task.
        task_id: String,
        /// Task deadline.
        deadline: NaiveDateTime,
        /// Horizon start.
        horizon_start: NaiveDateTime,
    },
    /// Earliest start is not before the deadline.
    #[error("task `{task_id}` earliest start {earliest_start} is not before deadline {deadline}")]
    StartAfterDeadline {
        /// Offending task.
        task_id: String,
        /// Earliest start.
        earliest_start: NaiveDateTime,
        /// Deadline.
        deadline: NaiveDateTime,
    },
}

impl TaskValidationError {
    /// Id of the task the error refers to (empty for [`Self::EmptyId`]).
    pub fn task_id(&self) -> &str {
        match self {
            Self::EmptyId => "",
            Self::DuplicateId { task_id }
            | Self::NonFiniteDuration { task_id }
            | Self::NonPositiveDuration { task_id, .. }
            | Self::BoundsOrder { task_id, .. }
            | Self::ScheduledOutOfRange { task_id, .. }
            | Self::UnknownCategory { task_id, .. }
            | Self::UnknownPriority { task_id, .. }
            | Self::InvalidInstant { task_id, .. }
            | Self::DeadlineBeforeHorizon { task_id, .. }
            | Self::StartAfterDeadline { task_id, .. } => task_id,
        }
    }
}

/// Scheduler configuration is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds an unusable value.
    #[error("config field `{field}` {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors returned by [`SlotScheduler`](crate::scheduler::SlotScheduler).
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Active-hours registry is malformed.
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
    /// One or more tasks failed validation.
    #[error("{} task(s) failed validation", .0.len())]
    InvalidTasks(Vec<TaskValidationError>),
    /// Horizon end is not after horizon start.
    #[error("horizon end {end} is not after start {start}")]
    InvalidHorizon {
        /// Horizon start.
        start: NaiveDateTime,
        /// Horizon end.
        end: NaiveDateTime,
    },
    /// Horizon exceeds the configured guard.
    #[error("horizon of {days} days exceeds the limit of {max_days} days")]
    HorizonTooLarge {
        /// Requested horizon length (whole days, rounded up).
        days: i64,
        /// Configured limit.
        max_days: u32,
    },
    /// Scheduler configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
