//! Named scheduling scenarios.
//!
//! Each scenario is a self-contained problem (tasks, active hours, horizon,
//! reference time, locked events) for demos and regression tests. They are
//! plain data; call [`all`] or [`by_name`] to build them.
//!
//! All scenarios start on Wednesday 2025-01-15 with "now" at 08:00.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{ActiveHoursRegistry, Category, LockedEvent, Priority, Task};
use crate::scheduler::ScheduleRequest;

/// A named, ready-to-run scheduling problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Display name.
    pub name: String,
    /// What the scenario exercises.
    pub description: String,
    /// Tasks in insertion order.
    pub tasks: Vec<Task>,
    /// Category availability.
    pub active_hours: ActiveHoursRegistry,
    /// Horizon start.
    pub horizon_start: NaiveDateTime,
    /// Horizon end.
    pub horizon_end: NaiveDateTime,
    /// Reference "now".
    pub reference_now: NaiveDateTime,
    /// Existing commitments.
    pub locked: Vec<LockedEvent>,
}

impl Scenario {
    fn one_day(name: &str, description: &str, tasks: Vec<Task>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            tasks,
            active_hours: ActiveHoursRegistry::standard(),
            horizon_start: at(15, 0, 0),
            horizon_end: at(16, 0, 0),
            reference_now: at(15, 8, 0),
            locked: Vec::new(),
        }
    }

    fn with_locked(mut self, locked: Vec<LockedEvent>) -> Self {
        self.locked = locked;
        self
    }

    /// Converts into a scheduler request.
    pub fn request(&self) -> ScheduleRequest {
        ScheduleRequest::new(self.tasks.clone(), self.horizon_start, self.horizon_end)
            .with_active_hours(self.active_hours.clone())
            .with_reference_now(self.reference_now)
            .with_locked_events(self.locked.clone())
    }
}

/// Instant on January 2025.
fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

fn work(id: &str, name: &str, hours: f64) -> Task {
    Task::new(id, hours).with_name(name)
}

/// Every built-in scenario, in a fixed order.
pub fn all() -> Vec<Scenario> {
    vec![
        basic_work_day(),
        task_splitting_challenge(),
        deadline_pressure(),
        overloaded_schedule(),
        emergency_response(),
        mixed_categories(),
        meeting_heavy_day(),
    ]
}

/// Looks up a scenario by name (case-insensitive).
pub fn by_name(name: &str) -> Option<Scenario> {
    all()
        .into_iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
}

/// One splittable two-hour work task on an empty day.
pub fn basic_work_day() -> Scenario {
    Scenario::one_day(
        "Basic Work Day",
        "A single two-hour work task on an otherwise empty day.",
        vec![work("write-report", "Write weekly report", 2.0)
            .with_bounds(0.25, 2.0)
            .with_split(true)],
    )
}

/// A four-hour task that fits no single gap between locked meetings.
pub fn task_splitting_challenge() -> Scenario {
    Scenario::one_day(
        "Task Splitting Challenge",
        "Four hours of deep work around two locked meetings.",
        vec![
            work("deep-work", "Deep work", 4.0)
                .with_bounds(0.5, 4.0)
                .with_priority(Priority::High)
                .with_split(true),
            work("review", "Code review", 0.5),
        ],
    )
    .with_locked(vec![
        LockedEvent::new(at(15, 10, 0), at(15, 11, 0)).with_label("Standup"),
        LockedEvent::new(at(15, 13, 0), at(15, 14, 0)).with_label("Lunch"),
    ])
}

/// Competing deadlines over two days; one task cannot make it.
pub fn deadline_pressure() -> Scenario {
    let mut scenario = Scenario::one_day(
        "Deadline Pressure",
        "Critical, high, and normal tasks racing for the same morning.",
        vec![
            work("invoice", "Send invoice", 2.0).with_deadline(at(15, 10, 0)),
            work("proposal", "Client proposal", 3.0)
                .with_bounds(0.5, 3.0)
                .with_priority(Priority::Critical)
                .with_split(true)
                .with_deadline(at(15, 12, 0)),
            work("cleanup", "Inbox cleanup", 2.0).with_priority(Priority::Low),
            work("slides", "Board slides", 2.0)
                .with_priority(Priority::High)
                .with_deadline(at(16, 11, 0)),
        ],
    );
    scenario.horizon_end = at(17, 0, 0);
    scenario
}

/// Eleven hours of work against an eight-hour day.
pub fn overloaded_schedule() -> Scenario {
    Scenario::one_day(
        "Overloaded Schedule",
        "More work than the day can hold.",
        vec![
            work("feature", "Feature work", 4.0),
            work("bugs", "Bug triage", 4.0),
            work("docs", "Documentation", 3.0),
        ],
    )
}

/// A critical task and a normal task competing for one slot.
pub fn emergency_response() -> Scenario {
    let mut scenario = Scenario::one_day(
        "Emergency Response",
        "An incident arrives while a routine task holds the only slot.",
        vec![
            work("routine", "Routine maintenance", 2.0),
            work("incident", "Production incident", 2.0).with_priority(Priority::Critical),
        ],
    );
    scenario.active_hours = ActiveHoursRegistry::standard().with_fixed_hours(Category::Work, 9, 11);
    scenario
}

/// Personal, work, and meeting tasks sharing the same day.
pub fn mixed_categories() -> Scenario {
    Scenario::one_day(
        "Mixed Categories",
        "Personal errands, focused work, and a meeting on one day.",
        vec![
            work("code", "Implement feature", 3.0)
                .with_bounds(0.5, 3.0)
                .with_split(true),
            Task::new("gym", 1.0)
                .with_name("Gym")
                .with_category(Category::Personal),
            Task::new("standup", 0.5)
                .with_name("Team standup")
                .with_category(Category::Meeting)
                .with_priority(Priority::High),
            Task::new("groceries", 1.0)
                .with_name("Groceries")
                .with_category(Category::Personal)
                .with_deadline(at(15, 20, 0)),
        ],
    )
}

/// Most of the day is locked; tasks squeeze into what is left.
pub fn meeting_heavy_day() -> Scenario {
    Scenario::one_day(
        "Meeting-Heavy Day",
        "Locked meetings leave three short gaps.",
        vec![
            Task::new("one-on-one", 0.5)
                .with_name("1:1")
                .with_category(Category::Meeting),
            Task::new("planning", 1.5)
                .with_name("Sprint planning")
                .with_category(Category::Meeting),
            work("focus", "Focus block", 2.0)
                .with_bounds(0.5, 2.0)
                .with_split(true),
        ],
    )
    .with_locked(vec![
        LockedEvent::new(at(15, 9, 0), at(15, 10, 0)).with_label("All-hands"),
        LockedEvent::new(at(15, 10, 30), at(15, 12, 0)).with_label("Design review"),
        LockedEvent::new(at(15, 13, 0), at(15, 15, 30)).with_label("Workshop"),
    ])
}
