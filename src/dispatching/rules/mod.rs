//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Priority**: PRIORITY
//! - **Time-based**: SPT, LPT
//! - **Due-date**: EDD
//!
//! # Score Convention
//! All rules return lower scores for higher priority tasks. Tasks without a
//! deadline score `f64::MAX` on due-date rules, so they sort after every
//! task that has one.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Task;

// ======================== Priority rules ========================

/// Priority rank: critical, then high, normal, low.
#[derive(Debug, Clone, Copy)]
pub struct PriorityRank;

impl DispatchingRule for PriorityRank {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, task: &Task, _context: &SchedulingContext) -> RuleScore {
        -f64::from(task.priority.weight())
    }

    fn description(&self) -> &'static str {
        "Priority Rank"
    }
}

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, task: &Task, _context: &SchedulingContext) -> RuleScore {
        task.remaining_minutes() as f64
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}

/// Longest Processing Time.
///
/// Placing long tasks first leaves short ones to fill gaps.
#[derive(Debug, Clone, Copy)]
pub struct Lpt;

impl DispatchingRule for Lpt {
    fn name(&self) -> &'static str {
        "LPT"
    }

    fn evaluate(&self, task: &Task, _context: &SchedulingContext) -> RuleScore {
        -(task.remaining_minutes() as f64)
    }

    fn description(&self) -> &'static str {
        "Longest Processing Time"
    }
}

// ======================== Due-date rules ========================

/// Earliest Due Date.
///
/// Score is minutes from the context instant to the deadline.
///
/// # Reference
/// Jackson (1955), optimal for minimizing maximum lateness on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Edd;

impl DispatchingRule for Edd {
    fn name(&self) -> &'static str {
        "EDD"
    }

    fn evaluate(&self, task: &Task, context: &SchedulingContext) -> RuleScore {
        match task.deadline {
            Some(deadline) => context.minutes_until(deadline) as f64,
            None => f64::MAX,
        }
    }

    fn description(&self) -> &'static str {
        "Earliest Due Date"
    }
}
