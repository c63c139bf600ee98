//! Task model.
//!
//! A task is a block of work the user wants placed on the calendar: a
//! requested duration (in hours), split bounds, a category that selects which
//! active hours apply, a priority, and an optional deadline. Part of the
//! duration may already be on the calendar (`scheduled_hours`); only the
//! rest is placed.
//!
//! # Time Representation
//! Durations are carried in hours (`f64`) as entered by the user, and are
//! quantised to whole minutes for placement. A positive duration never
//! quantises below one minute. Instants are wall-clock
//! [`NaiveDateTime`]s; timezone handling belongs to the caller.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::UnknownLabel;

/// Activity category. Selects which active-hour ranges a task may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Personal time (errands, exercise, study).
    Personal,
    /// Working hours.
    Work,
    /// Meeting hours.
    Meeting,
}

impl Category {
    /// All categories, in reporting order.
    pub const ALL: [Category; 3] = [Category::Personal, Category::Work, Category::Meeting];

    /// Lowercase label (`personal`, `work`, `meeting`).
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Work => "work",
            Category::Meeting => "meeting",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownLabel;

    /// Accepts the plain labels as well as the `*_hours` spelling used by
    /// calendar hour settings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personal" | "personal_hours" => Ok(Category::Personal),
            "work" | "work_hours" => Ok(Category::Work),
            "meeting" | "meeting_hours" => Ok(Category::Meeting),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Task urgency. Ordered so that `Critical > High > Normal > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default.
    Normal,
    /// Should happen soon.
    High,
    /// Must happen first.
    Critical,
}

impl Priority {
    /// Numeric weight: critical = 4, high = 3, normal = 2, low = 1.
    pub fn weight(self) -> u8 {
        match self {
            Priority::Critical => 4,
            Priority::High => 3,
            Priority::Normal => 2,
            Priority::Low => 1,
        }
    }

    /// Infers a priority from deadline proximity.
    ///
    /// | Hours until deadline | Priority |
    /// |----------------------|----------|
    /// | overdue or <= 24     | Critical |
    /// | <= 48                | High     |
    /// | > 48                 | Normal   |
    /// | no deadline          | Low      |
    pub fn infer(deadline: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        let Some(deadline) = deadline else {
            return Priority::Low;
        };
        let minutes_left = (deadline - now).num_minutes();
        if minutes_left <= 24 * 60 {
            Priority::Critical
        } else if minutes_left <= 48 * 60 {
            Priority::High
        } else {
            Priority::Normal
        }
    }

    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Default minimum split length (hours) used by [`Task::new`].
pub const DEFAULT_MIN_SPLIT_HOURS: f64 = 0.25;

/// A task to be placed into active-hour slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Requested total duration (hours).
    pub duration: f64,
    /// Shortest block a split task may be cut into (hours).
    pub min_duration: f64,
    /// Longest single block (hours).
    pub max_duration: f64,
    /// Which active hours apply.
    pub category: Category,
    /// Scheduling priority.
    pub priority: Priority,
    /// Latest desired completion time. `None` = no deadline.
    pub deadline: Option<NaiveDateTime>,
    /// Earliest allowed start. `None` = as soon as the horizon allows.
    #[serde(default)]
    pub earliest_start: Option<NaiveDateTime>,
    /// Whether the duration may be spread across several blocks.
    pub allow_split: bool,
    /// Hours already on the calendar from earlier runs.
    #[serde(default)]
    pub scheduled_hours: f64,
}

impl Task {
    /// Creates a normal-priority, non-splittable work task.
    ///
    /// `max_duration` defaults to the duration and `min_duration` to
    /// [`DEFAULT_MIN_SPLIT_HOURS`] (capped at the duration).
    pub fn new(id: impl Into<String>, duration_hours: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            duration: duration_hours,
            min_duration: DEFAULT_MIN_SPLIT_HOURS.min(duration_hours),
            max_duration: duration_hours,
            category: Category::Work,
            priority: Priority::Normal,
            deadline: None,
            earliest_start: None,
            allow_split: false,
            scheduled_hours: 0.0,
        }
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the deadline.
    pub fn with_deadline(mut self, deadline: NaiveDateTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the earliest start.
    pub fn with_earliest_start(mut self, earliest_start: NaiveDateTime) -> Self {
        self.earliest_start = Some(earliest_start);
        self
    }

    /// Sets the min/max block bounds (hours).
    pub fn with_bounds(mut self, min_duration: f64, max_duration: f64) -> Self {
        self.min_duration = min_duration;
        self.max_duration = max_duration;
        self
    }

    /// Enables or disables splitting.
    pub fn with_split(mut self, allow_split: bool) -> Self {
        self.allow_split = allow_split;
        self
    }

    /// Sets the hours already scheduled.
    pub fn with_scheduled_hours(mut self, scheduled_hours: f64) -> Self {
        self.scheduled_hours = scheduled_hours;
        self
    }

    /// Requested duration in whole minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        let minutes = hours_to_minutes(self.duration);
        if self.duration > 0.0 {
            minutes.max(1)
        } else {
            minutes
        }
    }

    /// Minutes still to be placed: duration minus what is already scheduled.
    pub fn remaining_minutes(&self) -> i64 {
        if self.scheduled_hours >= self.duration {
            return 0;
        }
        (self.duration_minutes() - hours_to_minutes(self.scheduled_hours.max(0.0))).max(0)
    }

    /// Minimum block length in whole minutes.
    #[inline]
    pub fn min_duration_minutes(&self) -> i64 {
        hours_to_minutes(self.min_duration)
    }

    /// Maximum block length in whole minutes (never below one minute).
    #[inline]
    pub fn max_duration_minutes(&self) -> i64 {
        hours_to_minutes(self.max_duration).max(1)
    }

    /// Whether the deadline (if any) has already passed at `now`.
    pub fn is_overdue_at(&self, now: NaiveDateTime) -> bool {
        self.deadline.is_some_and(|d| d <= now)
    }
}

/// Converts hours to whole minutes (rounded to nearest).
#[inline]
pub fn hours_to_minutes(hours: f64) -> i64 {
    (hours * 60.0).round() as i64
}

/// Converts minutes back to hours.
#[inline]
pub fn minutes_to_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_task_builder() {
        let task = Task::new("T1", 2.0)
            .with_name("Write report")
            .with_category(Category::Personal)
            .with_priority(Priority::High)
            .with_deadline(at(17, 0))
            .with_earliest_start(at(8, 0))
            .with_bounds(0.5, 1.5)
            .with_split(true);

        assert_eq!(task.id, "T1");
        assert_eq!(task.name, "Write report");
        assert_eq!(task.category, Category::Personal);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.deadline, Some(at(17, 0)));
        assert_eq!(task.earliest_start, Some(at(8, 0)));
        assert!((task.min_duration - 0.5).abs() < 1e-10);
        assert!((task.max_duration - 1.5).abs() < 1e-10);
        assert!(task.allow_split);
    }

    #[test]
    fn test_task_defaults() {
        let task = Task::new("T1", 0.1);
        assert!((task.min_duration - 0.1).abs() < 1e-10); // capped at duration
        assert!((task.max_duration - 0.1).abs() < 1e-10);
        assert_eq!(task.category, Category::Work);
        assert_eq!(task.priority, Priority::Normal);
        assert!(!task.allow_split);
    }

    #[test]
    fn test_minutes_quantisation() {
        let task = Task::new("T1", 1.5).with_bounds(0.25, 2.0);
        assert_eq!(task.duration_minutes(), 90);
        assert_eq!(task.min_duration_minutes(), 15);
        assert_eq!(task.max_duration_minutes(), 120);
        assert_eq!(hours_to_minutes(1.0 / 3.0), 20);
        assert!((minutes_to_hours(45) - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_sub_minute_duration_rounds_up() {
        assert_eq!(Task::new("T1", 0.005).duration_minutes(), 1);
        assert_eq!(Task::new("T1", 0.0).duration_minutes(), 0);
        assert_eq!(Task::new("T1", -0.005).duration_minutes(), 0);
    }

    #[test]
    fn test_remaining_minutes() {
        let task = Task::new("T1", 3.0);
        assert_eq!(task.remaining_minutes(), 180);
        assert_eq!(task.clone().with_scheduled_hours(1.25).remaining_minutes(), 105);
        assert_eq!(task.clone().with_scheduled_hours(3.0).remaining_minutes(), 0);
        assert_eq!(task.with_scheduled_hours(5.0).remaining_minutes(), 0);
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
        assert_eq!(Priority::Critical.weight(), 4);
        assert_eq!(Priority::Low.weight(), 1);
    }

    #[test]
    fn test_priority_inference() {
        let now = at(0, 0);
        let hours = |h: i64| now + chrono::Duration::hours(h);

        assert_eq!(Priority::infer(Some(hours(-5)), now), Priority::Critical);
        assert_eq!(Priority::infer(Some(hours(12)), now), Priority::Critical);
        assert_eq!(Priority::infer(Some(hours(24)), now), Priority::Critical);
        assert_eq!(Priority::infer(Some(hours(36)), now), Priority::High);
        assert_eq!(Priority::infer(Some(hours(48)), now), Priority::High);
        assert_eq!(Priority::infer(Some(hours(72)), now), Priority::Normal);
        assert_eq!(Priority::infer(None, now), Priority::Low);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("work".parse::<Category>().unwrap(), Category::Work);
        assert_eq!("Meeting_Hours".parse::<Category>().unwrap(), Category::Meeting);
        assert!("leisure".parse::<Category>().is_err());

        assert_eq!(" HIGH ".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_overdue() {
        let task = Task::new("T1", 1.0).with_deadline(at(12, 0));
        assert!(!task.is_overdue_at(at(11, 59)));
        assert!(task.is_overdue_at(at(12, 0)));
        assert!(!Task::new("T2", 1.0).is_overdue_at(at(12, 0)));
    }
}
