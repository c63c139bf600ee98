//! Task validation and the validated task catalog.
//!
//! Checks structural integrity of tasks before scheduling. Detects:
//! - Empty and duplicate IDs
//! - Non-finite or non-positive durations
//! - Split bounds out of order (`min <= duration <= max`)
//! - Already-scheduled hours outside `0..=duration`
//! - Deadlines before the horizon start
//! - Earliest starts at or after the deadline
//!
//! Loosely-typed [`TaskInput`] records (labels as strings, instants as
//! RFC 3339 or naive strings, optional priority) are converted here too.
//! Unknown labels and unparseable instants become validation errors.
//!
//! Validation collects every problem rather than stopping at the first, so
//! a caller can report the whole batch at once.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::error::TaskValidationError;
use crate::models::{Category, Priority, Task};

/// Validation result.
pub type ValidationResult<T> = Result<T, Vec<TaskValidationError>>;

/// Naive formats accepted after RFC 3339 fails.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// A task as it arrives from an external source (JSON, form input).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskInput {
    /// Task identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Requested duration (hours).
    pub duration: f64,
    /// Minimum block length (hours). Defaults to the configured split minimum.
    #[serde(default)]
    pub min_duration: Option<f64>,
    /// Maximum block length (hours). Defaults to the duration.
    #[serde(default)]
    pub max_duration: Option<f64>,
    /// Category label (`personal`, `work`, `meeting`).
    pub category: String,
    /// Priority label. Inferred from the deadline when absent.
    #[serde(default)]
    pub priority: Option<String>,
    /// Deadline as RFC 3339 or naive `YYYY-MM-DDTHH:MM[:SS]`.
    #[serde(default)]
    pub deadline: Option<String>,
    /// Earliest start, same formats as `deadline`.
    #[serde(default)]
    pub earliest_start: Option<String>,
    /// Whether the task may be split.
    #[serde(default)]
    pub allow_split: bool,
    /// Hours already on the calendar.
    #[serde(default)]
    pub scheduled_hours: f64,
}

impl TaskInput {
    /// Converts into a typed [`Task`].
    ///
    /// A missing priority is inferred from deadline proximity to
    /// `reference_now` (see [`Priority::infer`]). All conversion problems are
    /// returned together.
    pub fn to_task(
        &self,
        reference_now: NaiveDateTime,
        default_min_split_hours: f64,
    ) -> ValidationResult<Task> {
        let mut errors = Vec::new();
        let task_id = self.id.clone();

        let category = match self.category.parse::<Category>() {
            Ok(c) => Some(c),
            Err(e) => {
                errors.push(TaskValidationError::UnknownCategory {
                    task_id: task_id.clone(),
                    value: e.0,
                });
                None
            }
        };

        let deadline = self
            .deadline
            .as_deref()
            .and_then(|raw| parse_instant(&task_id, "deadline", raw, &mut errors));
        let earliest_start = self
            .earliest_start
            .as_deref()
            .and_then(|raw| parse_instant(&task_id, "earliest_start", raw, &mut errors));

        let priority = match self.priority.as_deref() {
            None => Some(Priority::infer(deadline, reference_now)),
            Some(raw) => match raw.parse::<Priority>() {
                Ok(p) => Some(p),
                Err(e) => {
                    errors.push(TaskValidationError::UnknownPriority {
                        task_id: task_id.clone(),
                        value: e.0,
                    });
                    None
                }
            },
        };

        let (Some(category), Some(priority)) = (category, priority) else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Task {
            id: task_id,
            name: self.name.clone(),
            duration: self.duration,
            min_duration: self
                .min_duration
                .unwrap_or_else(|| default_min_split_hours.min(self.duration)),
            max_duration: self.max_duration.unwrap_or(self.duration),
            category,
            priority,
            deadline,
            earliest_start,
            allow_split: self.allow_split,
            scheduled_hours: self.scheduled_hours,
        })
    }
}

/// Parses an instant, pushing an error on failure.
fn parse_instant(
    task_id: &str,
    field: &'static str,
    raw: &str,
    errors: &mut Vec<TaskValidationError>,
) -> Option<NaiveDateTime> {
    let parsed = parse_datetime(raw);
    if parsed.is_none() {
        errors.push(TaskValidationError::InvalidInstant {
            task_id: task_id.to_string(),
            field,
            value: raw.to_string(),
        });
    }
    parsed
}

/// Parses RFC 3339 (keeping local wall-clock time) or a naive date-time.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// A validated, ordered collection of tasks with unique IDs.
///
/// Insertion order is preserved; it is the final ordering tie-break.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskCatalog {
    tasks: Vec<Task>,
    index: BTreeMap<String, usize>,
}

impl TaskCatalog {
    /// Checks a single task against the invariants.
    ///
    /// Returns the first problem found.
    pub fn validate(task: Task, horizon_start: NaiveDateTime) -> Result<Task, TaskValidationError> {
        let task_id = || task.id.clone();

        if task.id.trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if !(task.duration.is_finite()
            && task.min_duration.is_finite()
            && task.max_duration.is_finite())
        {
            return Err(TaskValidationError::NonFiniteDuration { task_id: task_id() });
        }
        if task.duration <= 0.0 {
            return Err(TaskValidationError::NonPositiveDuration {
                task_id: task_id(),
                duration: task.duration,
            });
        }
        if task.min_duration < 0.0
            || task.min_duration > task.duration
            || task.duration > task.max_duration
        {
            return Err(TaskValidationError::BoundsOrder {
                task_id: task_id(),
                min: task.min_duration,
                duration: task.duration,
                max: task.max_duration,
            });
        }
        if !task.scheduled_hours.is_finite()
            || task.scheduled_hours < 0.0
            || task.scheduled_hours > task.duration
        {
            return Err(TaskValidationError::ScheduledOutOfRange {
                task_id: task_id(),
                scheduled: task.scheduled_hours,
                duration: task.duration,
            });
        }
        if let Some(deadline) = task.deadline {
            if deadline < horizon_start {
                return Err(TaskValidationError::DeadlineBeforeHorizon {
                    task_id: task_id(),
                    deadline,
                    horizon_start,
                });
            }
            if let Some(earliest_start) = task.earliest_start {
                if earliest_start >= deadline {
                    return Err(TaskValidationError::StartAfterDeadline {
                        task_id: task_id(),
                        earliest_start,
                        deadline,
                    });
                }
            }
        }
        Ok(task)
    }

    /// Validates every task and builds the catalog.
    ///
    /// # Returns
    /// `Ok(catalog)` if all checks pass, `Err(errors)` with all detected issues.
    pub fn from_tasks(tasks: Vec<Task>, horizon_start: NaiveDateTime) -> ValidationResult<Self> {
        let mut errors = Vec::new();
        let mut seen = BTreeSet::new();
        let mut valid = Vec::with_capacity(tasks.len());

        for task in tasks {
            if !task.id.trim().is_empty() && !seen.insert(task.id.clone()) {
                errors.push(TaskValidationError::DuplicateId {
                    task_id: task.id.clone(),
                });
                continue;
            }
            match Self::validate(task, horizon_start) {
                Ok(task) => valid.push(task),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let index = valid
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        Ok(Self {
            tasks: valid,
            index,
        })
    }

    /// Converts and validates external task records.
    pub fn from_inputs(
        inputs: &[TaskInput],
        horizon_start: NaiveDateTime,
        reference_now: NaiveDateTime,
        config: &SchedulerConfig,
    ) -> ValidationResult<Self> {
        let mut errors = Vec::new();
        let mut tasks = Vec::with_capacity(inputs.len());
        for input in inputs {
            match input.to_task(reference_now, config.default_min_split_hours) {
                Ok(task) => tasks.push(task),
                Err(mut errs) => errors.append(&mut errs),
            }
        }
        match Self::from_tasks(tasks, horizon_start) {
            Ok(catalog) if errors.is_empty() => Ok(catalog),
            Ok(_) => Err(errors),
            Err(mut errs) => {
                errors.append(&mut errs);
                Err(errors)
            }
        }
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by ID.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.index.get(id).map(|&i| &self.tasks[i])
    }

    /// Insertion position of a task.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Minutes still to be placed for a category. Saturates instead of
    /// overflowing.
    pub fn demand_minutes(&self, category: Category) -> i64 {
        self.tasks
            .iter()
            .filter(|t| t.category == category)
            .fold(0i64, |acc, t| acc.saturating_add(t.remaining_minutes()))
    }

    /// Consumes the catalog, returning its tasks.
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn input(id: &str, category: &str) -> TaskInput {
        TaskInput {
            id: id.into(),
            duration: 1.0,
            category: category.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_task() {
        let task = Task::new("T1", 2.0).with_bounds(0.5, 2.0).with_deadline(at(16, 12));
        assert!(TaskCatalog::validate(task, at(15, 0)).is_ok());
    }

    #[test]
    fn test_bounds_order() {
        let task = Task::new("T1", 2.0).with_bounds(0.5, 1.5);
        let err = TaskCatalog::validate(task, at(15, 0)).unwrap_err();
        assert!(matches!(err, TaskValidationError::BoundsOrder { .. }));

        let task = Task::new("T1", 2.0).with_bounds(3.0, 4.0);
        assert!(TaskCatalog::validate(task, at(15, 0)).is_err());
    }

    #[test]
    fn test_non_positive_and_non_finite() {
        let err = TaskCatalog::validate(Task::new("T1", 0.0), at(15, 0)).unwrap_err();
        assert!(matches!(err, TaskValidationError::NonPositiveDuration { .. }));

        // Sub-minute durations are kept as one minute.
        let task = TaskCatalog::validate(Task::new("T1", 0.005), at(15, 0)).unwrap();
        assert_eq!(task.duration_minutes(), 1);

        let err = TaskCatalog::validate(Task::new("T1", f64::NAN), at(15, 0)).unwrap_err();
        assert!(matches!(err, TaskValidationError::NonFiniteDuration { .. }));
    }

    #[test]
    fn test_scheduled_hours_range() {
        let task = Task::new("T1", 2.0).with_scheduled_hours(2.0);
        assert!(TaskCatalog::validate(task, at(15, 0)).is_ok());

        for scheduled in [2.5, -0.5, f64::NAN] {
            let task = Task::new("T1", 2.0).with_scheduled_hours(scheduled);
            let err = TaskCatalog::validate(task, at(15, 0)).unwrap_err();
            assert!(matches!(err, TaskValidationError::ScheduledOutOfRange { .. }));
        }
    }

    #[test]
    fn test_demand_saturates() {
        let catalog = TaskCatalog::from_tasks(
            vec![Task::new("A", 1e17), Task::new("B", 1e17)],
            at(15, 0),
        )
        .unwrap();
        assert_eq!(catalog.demand_minutes(Category::Work), i64::MAX);
    }

    #[test]
    fn test_deadline_checks() {
        let task = Task::new("T1", 1.0).with_deadline(at(14, 12));
        let err = TaskCatalog::validate(task, at(15, 0)).unwrap_err();
        assert!(matches!(err, TaskValidationError::DeadlineBeforeHorizon { .. }));

        let task = Task::new("T1", 1.0)
            .with_deadline(at(15, 12))
            .with_earliest_start(at(15, 12));
        let err = TaskCatalog::validate(task, at(15, 0)).unwrap_err();
        assert!(matches!(err, TaskValidationError::StartAfterDeadline { .. }));
    }

    #[test]
    fn test_catalog_collects_all_errors() {
        let tasks = vec![
            Task::new("T1", 1.0),
            Task::new("T1", 1.0),
            Task::new("", 1.0),
            Task::new("T2", -1.0),
        ];
        let errors = TaskCatalog::from_tasks(tasks, at(15, 0)).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], TaskValidationError::DuplicateId { .. }));
        assert_eq!(errors[1], TaskValidationError::EmptyId);
        assert_eq!(errors[2].task_id(), "T2");
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = TaskCatalog::from_tasks(
            vec![
                Task::new("A", 1.0),
                Task::new("B", 0.5).with_category(Category::Personal),
                Task::new("C", 2.0),
            ],
            at(15, 0),
        )
        .unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.position("C"), Some(2));
        assert_eq!(catalog.get("B").unwrap().category, Category::Personal);
        assert!(catalog.get("Z").is_none());
        assert_eq!(catalog.demand_minutes(Category::Work), 180);
        assert_eq!(catalog.demand_minutes(Category::Personal), 30);
        assert_eq!(catalog.demand_minutes(Category::Meeting), 0);

        let catalog = TaskCatalog::from_tasks(
            vec![Task::new("A", 2.0).with_scheduled_hours(0.5)],
            at(15, 0),
        )
        .unwrap();
        assert_eq!(catalog.demand_minutes(Category::Work), 90);
    }

    #[test]
    fn test_input_defaults_and_inference() {
        let now = at(15, 8);
        let mut raw = input("T1", "work_hours");
        raw.deadline = Some("2025-01-16T06:00:00".into());
        let task = raw.to_task(now, 0.25).unwrap();
        assert_eq!(task.category, Category::Work);
        assert_eq!(task.priority, Priority::Critical); // 22h away
        assert!((task.min_duration - 0.25).abs() < 1e-10);
        assert!((task.max_duration - 1.0).abs() < 1e-10);

        let task = input("T2", "personal").to_task(now, 0.25).unwrap();
        assert_eq!(task.priority, Priority::Low);

        let mut raw = input("T3", "meeting");
        raw.priority = Some("high".into());
        assert_eq!(raw.to_task(now, 0.25).unwrap().priority, Priority::High);
    }

    #[test]
    fn test_input_errors() {
        let mut raw = input("T1", "leisure");
        raw.priority = Some("urgent".into());
        raw.deadline = Some("tomorrow".into());
        let errors = raw.to_task(at(15, 8), 0.25).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .any(|e| matches!(e, TaskValidationError::InvalidInstant { field: "deadline", .. })));
    }

    #[test]
    fn test_from_inputs_json() {
        let json = r#"[
            {"id": "A", "duration": 1.5, "category": "work", "allow_split": true, "scheduled_hours": 0.5},
            {"id": "B", "duration": 0.5, "category": "personal", "deadline": "2025-01-15T18:00:00+09:00"}
        ]"#;
        let inputs: Vec<TaskInput> = serde_json::from_str(json).unwrap();
        let catalog =
            TaskCatalog::from_inputs(&inputs, at(15, 0), at(15, 8), &SchedulerConfig::default())
                .unwrap();
        assert!(catalog.get("A").unwrap().allow_split);
        assert_eq!(catalog.get("A").unwrap().remaining_minutes(), 60);
        // Offset dropped; wall-clock time kept.
        assert_eq!(
            catalog.get("B").unwrap().deadline,
            Some(at(15, 18))
        );
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2025-01-15T09:30:00Z"), Some(expected));
        assert_eq!(parse_datetime("2025-01-15 09:30:00"), Some(expected));
        assert_eq!(parse_datetime("2025-01-15T09:30"), Some(expected));
        assert_eq!(parse_datetime("15/01/2025"), None);
    }
}
