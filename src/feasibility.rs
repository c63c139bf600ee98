//! Capacity vs. demand pre-pass.
//!
//! Before placement, compares per-category demand (sum of unplaced task
//! minutes, saturating at `i64::MAX`)
//! against per-category capacity (active-hour minutes inside the effective
//! window, minus locked events). Overload is reported, never fatal: the
//! scheduler still places as much as it can.
//!
//! The estimate is aggregate only. A category can pass this check and still
//! leave work unscheduled (deadlines, non-splittable tasks that fit no single
//! gap, other categories sharing the same hours).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ActiveHoursRegistry, Category, Interval, Task, Warning};

/// Capacity and demand for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLoad {
    /// Category.
    pub category: Category,
    /// Available minutes inside the window.
    pub capacity_minutes: i64,
    /// Requested minutes.
    pub demand_minutes: i64,
}

impl CategoryLoad {
    /// Demand exceeding capacity (zero if none).
    pub fn shortfall_minutes(&self) -> i64 {
        self.demand_minutes.saturating_sub(self.capacity_minutes).max(0)
    }

    /// Whether demand exceeds capacity.
    pub fn is_overloaded(&self) -> bool {
        self.demand_minutes > self.capacity_minutes
    }

    /// demand / capacity. `None` if there is no capacity.
    pub fn utilization(&self) -> Option<f64> {
        (self.capacity_minutes > 0)
            .then(|| self.demand_minutes as f64 / self.capacity_minutes as f64)
    }
}

/// Per-category loads, in category order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    /// One entry per category.
    pub loads: Vec<CategoryLoad>,
}

impl FeasibilityReport {
    /// Load for a category.
    pub fn load(&self, category: Category) -> Option<&CategoryLoad> {
        self.loads.iter().find(|l| l.category == category)
    }

    /// Whether no category is overloaded.
    pub fn is_feasible(&self) -> bool {
        self.loads.iter().all(|l| !l.is_overloaded())
    }

    /// One `category_overloaded` warning per overloaded category.
    pub fn warnings(&self) -> Vec<Warning> {
        self.loads
            .iter()
            .filter(|l| l.is_overloaded())
            .map(|l| Warning::CategoryOverloaded {
                category: l.category,
                shortfall_minutes: l.shortfall_minutes(),
            })
            .collect()
    }
}

/// Computes capacity and demand for every category.
///
/// # Arguments
/// * `tasks` - Tasks to be placed
/// * `registry` - Active hours
/// * `window` - Effective placement window
/// * `locked` - Intervals unavailable to every category
pub fn analyze(
    tasks: &[Task],
    registry: &ActiveHoursRegistry,
    window: &Interval,
    locked: &[Interval],
) -> FeasibilityReport {
    let mut demand: BTreeMap<Category, i64> = BTreeMap::new();
    for task in tasks {
        let entry = demand.entry(task.category).or_insert(0);
        *entry = entry.saturating_add(task.remaining_minutes());
    }

    let loads = Category::ALL
        .iter()
        .map(|&category| CategoryLoad {
            category,
            capacity_minutes: registry.capacity_minutes(category, window, locked),
            demand_minutes: demand.get(&category).copied().unwrap_or(0),
        })
        .collect();

    FeasibilityReport { loads }
}
