//! Default values handed to callers.
//!
//! Plain values, constructed on each call. Nothing here is global state.

use crate::models::{ActiveHoursRegistry, Category, Priority, Task, DEFAULT_MIN_SPLIT_HOURS};

/// Default active hours: personal 07:00–23:00, work and meeting 09:00–17:00.
pub fn active_hours() -> ActiveHoursRegistry {
    ActiveHoursRegistry::standard()
}

/// Template for a new task: one splittable personal hour at normal priority.
pub fn default_task() -> Task {
    Task::new("new-task", 1.0)
        .with_name("New task")
        .with_category(Category::Personal)
        .with_priority(Priority::Normal)
        .with_bounds(DEFAULT_MIN_SPLIT_HOURS, 1.0)
        .with_split(true)
}
