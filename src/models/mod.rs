//! Scheduling domain models.
//!
//! Provides the data types for describing a time-blocking problem and its
//! solution.
//!
//! # Domain Mappings
//!
//! | u-timeblock | Calendar app | Classical scheduling |
//! |-------------|--------------|----------------------|
//! | Task | To-do item | Job |
//! | Category | Hour setting | Machine family |
//! | ActiveHourRange | Working hours | Machine shift |
//! | LockedEvent | Existing event | Machine downtime |
//! | ScheduledBlock | Calendar entry | Operation assignment |

mod calendar;
mod schedule;
mod task;

pub use calendar::{ActiveHourRange, ActiveHoursRegistry, Interval, LockedEvent};
pub use schedule::{ScheduleResult, ScheduledBlock, UnscheduledReason, UnscheduledTask, Warning};
pub use task::{
    hours_to_minutes, minutes_to_hours, Category, Priority, Task, DEFAULT_MIN_SPLIT_HOURS,
};
