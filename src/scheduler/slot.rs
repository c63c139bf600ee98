//! Greedy time-slot scheduler.
//!
//! # Algorithm
//!
//! 1. Validate configuration, horizon, active hours, and tasks.
//! 2. Compute the effective window: from `max(horizon_start, now rounded up
//!    to the slot granularity)` to `horizon_end`.
//! 3. Run the feasibility pre-pass and record overload warnings.
//! 4. Order tasks with the rule engine.
//! 5. For each task, take the minutes not yet scheduled and walk the window
//!    day by day. Each day, take the category's active ranges and subtract
//!    time already taken (locked events, breaks, and earlier blocks of any
//!    task). Place into the free gaps first-fit:
//!    - non-splittable: the first gap long enough for the whole duration
//!    - splittable: consume gaps greedily, each segment
//!      `min(remaining, max_duration, gap)`, never shorter than
//!      `min_duration` unless it finishes the task
//! 6. Deadlines: a first pass only looks before the deadline. A split
//!    remainder is placed from the deadline on; a non-split task retries the
//!    whole window. Late minutes are reported as `deadline_missed`.
//! 7. Breaks (optional): once back-to-back work reaches the configured
//!    interval, the following minutes are reserved as a break, and split
//!    segments are cut so a run does not outgrow the interval.
//! 8. Anything still left at the end of the horizon is unscheduled.
//!
//! # Complexity
//! O(n * (d * r + b)) where n=tasks, d=days, r=ranges/day, b=busy intervals.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, info, warn};

use super::occupancy::Occupancy;
use crate::config::{BreakPolicy, SchedulerConfig};
use crate::dispatching::{RuleEngine, SchedulingContext};
use crate::error::ScheduleError;
use crate::feasibility::{self, FeasibilityReport};
use crate::models::{
    minutes_to_hours, ActiveHoursRegistry, Interval, LockedEvent, ScheduleResult, ScheduledBlock,
    Task, UnscheduledReason, UnscheduledTask, Warning,
};
use crate::validation::TaskCatalog;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Input container for scheduling.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    /// Tasks to schedule, in insertion order.
    pub tasks: Vec<Task>,
    /// Category availability.
    pub active_hours: ActiveHoursRegistry,
    /// First instant of the planning horizon.
    pub horizon_start: NaiveDateTime,
    /// End of the planning horizon (exclusive).
    pub horizon_end: NaiveDateTime,
    /// The caller's "now". Nothing is placed before it.
    pub reference_now: NaiveDateTime,
    /// Existing commitments that block time.
    pub locked: Vec<LockedEvent>,
}

impl ScheduleRequest {
    /// Creates a request with the default active hours, no locked events,
    /// and `reference_now` at the horizon start.
    pub fn new(tasks: Vec<Task>, horizon_start: NaiveDateTime, horizon_end: NaiveDateTime) -> Self {
        Self {
            tasks,
            active_hours: ActiveHoursRegistry::default(),
            horizon_start,
            horizon_end,
            reference_now: horizon_start,
            locked: Vec::new(),
        }
    }

    /// Sets the active hours.
    pub fn with_active_hours(mut self, active_hours: ActiveHoursRegistry) -> Self {
        self.active_hours = active_hours;
        self
    }

    /// Sets the reference "now".
    pub fn with_reference_now(mut self, reference_now: NaiveDateTime) -> Self {
        self.reference_now = reference_now;
        self
    }

    /// Adds a locked event.
    pub fn with_locked_event(mut self, event: LockedEvent) -> Self {
        self.locked.push(event);
        self
    }

    /// Replaces the locked events.
    pub fn with_locked_events(mut self, events: Vec<LockedEvent>) -> Self {
        self.locked = events;
        self
    }
}

/// Greedy, first-fit, day-by-day slot scheduler.
///
/// Stateless between calls: the same inputs always give the same result.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_timeblock::models::{Category, Task};
/// use u_timeblock::scheduler::{ScheduleRequest, SlotScheduler};
///
/// let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
/// let start = day.and_hms_opt(0, 0, 0).unwrap();
/// let end = day.and_hms_opt(23, 59, 0).unwrap();
/// let now = day.and_hms_opt(8, 0, 0).unwrap();
///
/// let tasks = vec![Task::new("report", 2.0).with_category(Category::Work)];
/// let request = ScheduleRequest::new(tasks, start, end).with_reference_now(now);
///
/// let result = SlotScheduler::new().schedule_request(&request).unwrap();
/// assert_eq!(result.blocks.len(), 1);
/// assert_eq!(result.blocks[0].start, day.and_hms_opt(9, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SlotScheduler {
    config: SchedulerConfig,
    rule_engine: RuleEngine,
}

impl SlotScheduler {
    /// Creates a scheduler with the default configuration and the reference
    /// ordering (priority, deadline, insertion order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets a rule engine for task ordering.
    ///
    /// Ties left by the engine fall back to insertion order.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Schedules tasks without locked events.
    pub fn schedule(
        &self,
        tasks: &[Task],
        active_hours: &ActiveHoursRegistry,
        horizon_start: NaiveDateTime,
        horizon_end: NaiveDateTime,
        reference_now: NaiveDateTime,
    ) -> Result<ScheduleResult, ScheduleError> {
        self.run(
            tasks,
            active_hours,
            horizon_start,
            horizon_end,
            reference_now,
            &[],
        )
    }

    /// Schedules from a request.
    pub fn schedule_request(&self, request: &ScheduleRequest) -> Result<ScheduleResult, ScheduleError> {
        self.run(
            &request.tasks,
            &request.active_hours,
            request.horizon_start,
            request.horizon_end,
            request.reference_now,
            &request.locked,
        )
    }

    /// Runs only the feasibility pre-pass for a request.
    pub fn feasibility(&self, request: &ScheduleRequest) -> Result<FeasibilityReport, ScheduleError> {
        self.config.validate()?;
        let window = self.effective_window(
            request.horizon_start,
            request.horizon_end,
            request.reference_now,
        )?;
        request.active_hours.validate()?;
        let catalog = TaskCatalog::from_tasks(request.tasks.clone(), request.horizon_start)
            .map_err(ScheduleError::InvalidTasks)?;
        let locked = locked_intervals(&request.locked);
        Ok(feasibility::analyze(
            catalog.tasks(),
            &request.active_hours,
            &window,
            &locked,
        ))
    }

    /// The window placement may use: `[max(horizon_start, rounded now), horizon_end)`.
    ///
    /// Fails if the horizon is empty, inverted, or longer than
    /// `max_horizon_days`.
    pub fn effective_window(
        &self,
        horizon_start: NaiveDateTime,
        horizon_end: NaiveDateTime,
        reference_now: NaiveDateTime,
    ) -> Result<Interval, ScheduleError> {
        if horizon_end <= horizon_start {
            return Err(ScheduleError::InvalidHorizon {
                start: horizon_start,
                end: horizon_end,
            });
        }
        let minutes = (horizon_end - horizon_start).num_minutes();
        let days = (minutes + MINUTES_PER_DAY - 1) / MINUTES_PER_DAY;
        if days > i64::from(self.config.max_horizon_days) {
            return Err(ScheduleError::HorizonTooLarge {
                days,
                max_days: self.config.max_horizon_days,
            });
        }

        let now = round_up(reference_now, self.config.slot_granularity_minutes);
        let start = horizon_start.max(now).min(horizon_end);
        Ok(Interval::new(start, horizon_end))
    }

    fn run(
        &self,
        tasks: &[Task],
        registry: &ActiveHoursRegistry,
        horizon_start: NaiveDateTime,
        horizon_end: NaiveDateTime,
        reference_now: NaiveDateTime,
        locked: &[LockedEvent],
    ) -> Result<ScheduleResult, ScheduleError> {
        self.config.validate()?;
        let window = self.effective_window(horizon_start, horizon_end, reference_now)?;
        registry.validate()?;
        let catalog = TaskCatalog::from_tasks(tasks.to_vec(), horizon_start)
            .map_err(ScheduleError::InvalidTasks)?;

        let locked = locked_intervals(locked);
        let mut result = ScheduleResult::new();

        let report = feasibility::analyze(catalog.tasks(), registry, &window, &locked);
        for warning in report.warnings() {
            if let Warning::CategoryOverloaded {
                category,
                shortfall_minutes,
            } = &warning
            {
                warn!(%category, shortfall_minutes, "category overloaded");
            }
            result.warnings.push(warning);
        }

        let mut placer = Placer::new(registry, self.config.breaks, &locked);
        let context = SchedulingContext::at_time(window.start);
        let order = self.rule_engine.sort_indices(catalog.tasks(), &context);
        for idx in order {
            placer.place_task(&catalog.tasks()[idx], &window, &mut result);
        }
        result.breaks = placer.into_breaks();

        result.blocks.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.task_id.cmp(&b.task_id))
                .then(a.segment_index.cmp(&b.segment_index))
        });

        info!(
            tasks = catalog.len(),
            blocks = result.blocks.len(),
            unscheduled = result.unscheduled.len(),
            warnings = result.warnings.len(),
            window_start = %window.start,
            window_end = %window.end,
            "schedule complete"
        );
        Ok(result)
    }
}

/// Per-run placement state: shared occupancy and reserved breaks.
struct Placer<'a> {
    registry: &'a ActiveHoursRegistry,
    policy: Option<BreakPolicy>,
    occupancy: Occupancy,
    breaks: Vec<Interval>,
}

impl<'a> Placer<'a> {
    fn new(registry: &'a ActiveHoursRegistry, policy: Option<BreakPolicy>, locked: &[Interval]) -> Self {
        let mut occupancy = Occupancy::new();
        for interval in locked {
            occupancy.insert(*interval);
        }
        Self {
            registry,
            policy,
            occupancy,
            breaks: Vec::new(),
        }
    }

    fn into_breaks(mut self) -> Vec<Interval> {
        self.breaks.sort();
        self.breaks
    }

    /// Places one task, appending blocks, warnings, and any remainder.
    fn place_task(&mut self, task: &Task, window: &Interval, result: &mut ScheduleResult) {
        let mut remaining = task.remaining_minutes();
        if remaining == 0 {
            debug!(task_id = %task.id, "already fully scheduled");
            return;
        }
        let span_start = task
            .earliest_start
            .map_or(window.start, |earliest| earliest.max(window.start));
        let span = Interval::new(span_start, window.end);
        let mut segments = Vec::new();

        if let Some(deadline) = task.deadline {
            if deadline > span.start {
                let on_time = Interval::new(span.start, deadline.min(span.end));
                remaining = self.fill(task, &on_time, remaining, &mut segments);
            }
        }
        if remaining > 0 {
            // Split remainders go after the deadline; a non-split task is
            // still one block and may start before it.
            let late = match task.deadline {
                Some(deadline) if task.allow_split => {
                    Interval::new(deadline.max(span.start), span.end)
                }
                _ => span,
            };
            remaining = self.fill(task, &late, remaining, &mut segments);
        }

        segments.sort();
        let mut late_minutes = 0;
        for (i, segment) in segments.iter().enumerate() {
            if let Some(deadline) = task.deadline {
                late_minutes += (segment.end - segment.start.max(deadline)).num_minutes().max(0);
            }
            debug!(
                task_id = %task.id,
                start = %segment.start,
                end = %segment.end,
                segment_index = i,
                "placed block"
            );
            result.blocks.push(ScheduledBlock::new(
                task.id.clone(),
                segment.start,
                segment.end,
                i as u32,
            ));
        }

        if let Some(deadline) = task.deadline.filter(|_| late_minutes > 0) {
            warn!(task_id = %task.id, %deadline, late_minutes, "placed past deadline");
            result.warnings.push(Warning::DeadlineMissed {
                task_id: task.id.clone(),
                deadline,
                minutes_past_deadline: late_minutes,
            });
        }

        if remaining > 0 {
            let reason = if task.deadline.is_some_and(|d| d <= window.start) {
                UnscheduledReason::DeadlineMissed
            } else {
                UnscheduledReason::NoCapacity
            };
            warn!(task_id = %task.id, remaining_minutes = remaining, ?reason, "task not fully placed");
            result.unscheduled.push(UnscheduledTask {
                task: task.clone(),
                remaining_hours: minutes_to_hours(remaining),
                reason,
            });
        }
    }

    /// Fills free time inside `span` for `task`. Returns the minutes still
    /// unplaced.
    fn fill(
        &mut self,
        task: &Task,
        span: &Interval,
        mut remaining: i64,
        segments: &mut Vec<Interval>,
    ) -> i64 {
        if span.is_empty() || remaining <= 0 {
            return remaining;
        }
        // A non-splittable task is all or nothing.
        if !task.allow_split && !segments.is_empty() {
            return remaining;
        }
        let min_len = task.min_duration_minutes();
        let max_len = task.max_duration_minutes();

        for date in span.dates() {
            for active in self.registry.windows_on(task.category, date) {
                let Some(clipped) = active.intersection(span) else {
                    continue;
                };
                for gap in self.occupancy.free_within(&clipped) {
                    if !task.allow_split {
                        if let Some(block) = self.fit_whole(&gap, remaining) {
                            segments.push(block);
                            return 0;
                        }
                        continue;
                    }

                    let mut cursor = gap.start;
                    while remaining > 0 && cursor < gap.end {
                        let available = (gap.end - cursor).num_minutes();
                        let mut len = remaining.min(max_len).min(available);
                        if let Some(room) = self.room_at(cursor) {
                            if room <= 0 || (room < len && room < min_len) {
                                match self.rest_at(cursor, &gap) {
                                    Some(pause) => {
                                        cursor = pause.end;
                                        continue;
                                    }
                                    None => break,
                                }
                            }
                            len = len.min(room);
                        }
                        if len <= 0 || (len < min_len && len < remaining) {
                            break;
                        }
                        let block = Interval::new(cursor, cursor + Duration::minutes(len));
                        self.occupancy.insert_work(block);
                        segments.push(block);
                        cursor = block.end;
                        remaining -= len;
                        if let Some(pause) = self.break_after(block) {
                            cursor = cursor.max(pause.end);
                        }
                    }
                    if remaining == 0 {
                        return 0;
                    }
                }
            }
        }
        remaining
    }

    /// Places a whole non-split block at the start of `gap`, after a break
    /// if one is already due there.
    fn fit_whole(&mut self, gap: &Interval, minutes: i64) -> Option<Interval> {
        let due = self.room_at(gap.start).is_some_and(|room| room <= 0);
        let start = match (due, self.rest_minutes()) {
            (true, Some(rest)) => gap.start + Duration::minutes(rest),
            _ => gap.start,
        };
        if (gap.end - start).num_minutes() < minutes {
            return None;
        }
        if due {
            self.rest_at(gap.start, gap)?;
        }
        let block = Interval::new(start, start + Duration::minutes(minutes));
        self.occupancy.insert_work(block);
        self.break_after(block);
        Some(block)
    }

    fn rest_minutes(&self) -> Option<i64> {
        self.policy.map(|p| i64::from(p.duration_minutes))
    }

    /// Work minutes left before a break is due at `at`. `None` without a
    /// break policy.
    fn room_at(&self, at: NaiveDateTime) -> Option<i64> {
        let policy = self.policy?;
        let run = self
            .occupancy
            .run_ending_at(at, i64::from(policy.duration_minutes));
        Some(i64::from(policy.interval_minutes) - run)
    }

    /// Reserves a break starting at `at` if it fits inside `gap`.
    fn rest_at(&mut self, at: NaiveDateTime, gap: &Interval) -> Option<Interval> {
        let pause = Interval::new(at, at + Duration::minutes(self.rest_minutes()?));
        if !gap.covers(&pause) {
            return None;
        }
        self.reserve(pause)
    }

    /// Reserves a break right after `block` once its run reaches the
    /// interval.
    fn break_after(&mut self, block: Interval) -> Option<Interval> {
        if self.room_at(block.end)? > 0 {
            return None;
        }
        let pause = Interval::new(block.end, block.end + Duration::minutes(self.rest_minutes()?));
        self.reserve(pause)
    }

    fn reserve(&mut self, pause: Interval) -> Option<Interval> {
        if !self.occupancy.is_free(&pause) {
            return None;
        }
        debug!(start = %pause.start, end = %pause.end, "reserved break");
        self.occupancy.insert(pause);
        self.breaks.push(pause);
        Some(pause)
    }
}

fn locked_intervals(events: &[LockedEvent]) -> Vec<Interval> {
    events
        .iter()
        .map(LockedEvent::interval)
        .filter(|iv| !iv.is_empty())
        .collect()
}

/// Rounds up to the next multiple of `step_minutes` past midnight.
fn round_up(at: NaiveDateTime, step_minutes: u32) -> NaiveDateTime {
    let step = i64::from(step_minutes.max(1)) * 60;
    let seconds = i64::from(at.num_seconds_from_midnight());
    let rem = seconds % step;
    if rem == 0 && at.nanosecond() == 0 {
        return at;
    }
    let midnight = at.date().and_time(NaiveTime::default());
    midnight + Duration::seconds(seconds - rem + step)
}
