//! Deterministic task-to-time-slot scheduler.
//!
//! Turns a list of tasks (durations, priorities, deadlines, split rules) and
//! recurring per-category active hours into concrete calendar blocks over a
//! bounded horizon. Work that does not fit is reported, not dropped.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Category`, `Priority`,
//!   `ActiveHoursRegistry`, `LockedEvent`, `ScheduleResult`
//! - **`validation`**: Task invariants, `TaskCatalog`, `TaskInput` conversion
//! - **`feasibility`**: Per-category capacity vs. demand pre-pass
//! - **`dispatching`**: Ordering rules and the rule engine
//! - **`scheduler`**: `SlotScheduler`, `ScheduleRequest`, `ScheduleSummary`
//! - **`config`**: `SchedulerConfig`
//! - **`scenarios`**: Named fixture problems
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_timeblock::models::{ActiveHoursRegistry, Priority, Task};
//!
//! let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
//! let tasks = vec![
//!     Task::new("routine", 2.0),
//!     Task::new("incident", 2.0).with_priority(Priority::Critical),
//! ];
//! let result = u_timeblock::schedule(
//!     &tasks,
//!     &ActiveHoursRegistry::default(),
//!     day.and_hms_opt(0, 0, 0).unwrap(),
//!     day.and_hms_opt(23, 59, 0).unwrap(),
//!     day.and_hms_opt(8, 0, 0).unwrap(),
//! )
//! .unwrap();
//!
//! assert_eq!(result.blocks[0].task_id, "incident");
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

pub mod config;
pub mod defaults;
pub mod dispatching;
pub mod error;
pub mod feasibility;
pub mod models;
pub mod scenarios;
pub mod scheduler;
pub mod telemetry;
pub mod validation;

pub use config::{BreakPolicy, SchedulerConfig};
pub use error::{ConfigError, InvalidRangeError, ScheduleError, TaskValidationError};
pub use scheduler::{schedule, ScheduleRequest, ScheduleSummary, SlotScheduler};
