//! Dispatching rules and rule engine for task ordering.
//!
//! The scheduler places tasks one at a time, so the order in which it visits
//! them decides who gets contested capacity. Ordering is expressed as a chain
//! of dispatching rules evaluated by a [`RuleEngine`].
//!
//! The reference policy ([`RuleEngine::reference`]) is:
//! 1. priority rank, highest first
//! 2. deadline, earliest first (tasks without a deadline last)
//! 3. insertion order
//!
//! # Usage
//!
//! ```
//! use u_timeblock::dispatching::{rules, RuleEngine};
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::PriorityRank)
//!     .with_tie_breaker(rules::Spt);
//! # let _ = engine;
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{RuleEngine, TieBreaker};

use crate::models::Task;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (placed first).
pub type RuleScore = f64;

/// A dispatching rule that evaluates task priority.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for tasks that should be placed first.
///
/// # Reference
/// Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "PRIORITY", "EDD").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a task given the scheduling context.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, task: &Task, context: &SchedulingContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
