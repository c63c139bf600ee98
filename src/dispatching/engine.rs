//! Rule engine for multi-criteria dispatching.
//!
//! Applies dispatching rules lexicographically: a later rule is consulted
//! only when every earlier rule ties. Sorting is stable, so tasks that tie on
//! every rule keep their insertion order unless [`TieBreaker::ById`] is set.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Task;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Keep insertion order (default).
    #[default]
    InsertionOrder,
    /// Deterministic by task ID (lexicographic).
    ById,
}

/// A composable rule engine for task ordering.
///
/// # Example
/// ```
/// use u_timeblock::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Edd)
///     .with_tie_breaker(rules::Spt);
/// # let _ = engine;
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine (pure insertion order).
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::InsertionOrder,
            epsilon: 1e-9,
        }
    }

    /// Priority rank, then earliest deadline, then insertion order.
    pub fn reference() -> Self {
        Self::new()
            .with_rule(rules::PriorityRank)
            .with_tie_breaker(rules::Edd)
    }

    /// Adds a primary rule.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Adds a rule consulted only when all earlier rules tie.
    ///
    /// Same effect as [`with_rule`](Self::with_rule); reads better at call
    /// sites that build a primary/secondary chain.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_rule(rule)
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Names of the configured rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Sorts tasks by priority (highest priority first).
    ///
    /// Returns indices into the original task slice.
    pub fn sort_indices(&self, tasks: &[Task], context: &SchedulingContext) -> Vec<usize> {
        let scores: Vec<Vec<RuleScore>> = tasks.iter().map(|t| self.evaluate(t, context)).collect();
        let mut indices: Vec<usize> = (0..tasks.len()).collect();
        indices.sort_by(|&a, &b| {
            self.compare_scores(&scores[a], &scores[b])
                .then_with(|| self.final_tie_break(&tasks[a], &tasks[b]))
        });
        indices
    }

    /// Evaluates a single task and returns the raw score from each rule.
    pub fn evaluate(&self, task: &Task, context: &SchedulingContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(task, context))
            .collect()
    }

    fn compare_scores(&self, a: &[RuleScore], b: &[RuleScore]) -> Ordering {
        for (score_a, score_b) in a.iter().zip(b) {
            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(score_b).unwrap_or(Ordering::Equal);
            }
        }
        Ordering::Equal
    }

    fn final_tie_break(&self, a: &Task, b: &Task) -> Ordering {
        match &self.tie_breaker {
            TieBreaker::InsertionOrder => Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::reference()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| r.name())
                    .collect::<Vec<_>>(),
            )
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
