//! Property tests over randomly generated problems.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use u_timeblock::models::{
    ActiveHoursRegistry, Category, Interval, LockedEvent, Priority, ScheduleResult, Task,
};
use u_timeblock::validation::TaskCatalog;
use u_timeblock::{BreakPolicy, ScheduleRequest, SchedulerConfig, SlotScheduler};

const CATEGORIES: [Category; 3] = [Category::Personal, Category::Work, Category::Meeting];
const PRIORITIES: [Priority; 4] = [
    Priority::Low,
    Priority::Normal,
    Priority::High,
    Priority::Critical,
];

fn horizon_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn task_strategy() -> impl Strategy<Value = (u32, u32, bool, usize, usize, Option<i64>)> {
    (
        1u32..=24,  // duration in quarter hours
        1u32..=4,   // min duration in quarter hours (capped at duration)
        any::<bool>(),
        0usize..3,
        0usize..4,
        proptest::option::of(0i64..(3 * 24 * 60)),
    )
}

fn build_tasks(raw: &[(u32, u32, bool, usize, usize, Option<i64>)]) -> Vec<Task> {
    raw.iter()
        .enumerate()
        .map(|(i, &(quarters, min_quarters, split, cat, prio, deadline))| {
            let hours = f64::from(quarters) * 0.25;
            let min = f64::from(min_quarters.min(quarters)) * 0.25;
            let mut task = Task::new(format!("T{i}"), hours)
                .with_bounds(min, hours)
                .with_split(split)
                .with_category(CATEGORIES[cat])
                .with_priority(PRIORITIES[prio]);
            if i % 3 == 2 {
                task = task.with_scheduled_hours(f64::from(quarters / 2) * 0.25);
            }
            match deadline {
                Some(minutes) => task.with_deadline(horizon_start() + Duration::minutes(minutes)),
                None => task,
            }
        })
        .collect()
}

fn build_request(
    raw_tasks: &[(u32, u32, bool, usize, usize, Option<i64>)],
    raw_locked: &[(i64, i64)],
    now_offset: i64,
) -> ScheduleRequest {
    let start = horizon_start();
    let locked = raw_locked
        .iter()
        .map(|&(offset, len)| LockedEvent::lasting(start + Duration::minutes(offset), len))
        .collect();
    ScheduleRequest::new(build_tasks(raw_tasks), start, start + Duration::days(3))
        .with_reference_now(start + Duration::minutes(now_offset))
        .with_locked_events(locked)
}

fn run(request: &ScheduleRequest) -> ScheduleResult {
    SlotScheduler::new().schedule_request(request).unwrap()
}

fn run_with_breaks(request: &ScheduleRequest) -> ScheduleResult {
    SlotScheduler::new()
        .with_config(SchedulerConfig::default().with_breaks(BreakPolicy::new(60, 15)))
        .schedule_request(request)
        .unwrap()
}

/// Segment indices follow time order and only the final segment may be
/// shorter than the task's minimum.
fn check_segments(request: &ScheduleRequest, result: &ScheduleResult) -> Result<(), TestCaseError> {
    for task in &request.tasks {
        let blocks = result.blocks_for_task(&task.id);
        if !task.allow_split {
            prop_assert!(blocks.len() <= 1);
        }
        for (i, pair) in blocks.windows(2).enumerate() {
            prop_assert_eq!(pair[0].segment_index as usize, i);
            prop_assert!(pair[0].end <= pair[1].start);
        }
        let last = blocks.len().saturating_sub(1);
        for (i, block) in blocks.iter().enumerate() {
            if block.duration_minutes() < task.min_duration_minutes() {
                prop_assert_eq!(i, last, "short block {:?} of {} is not last", block, task.id);
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn validated_tasks_respect_bounds(raw in proptest::collection::vec(task_strategy(), 0..12)) {
        let catalog = TaskCatalog::from_tasks(build_tasks(&raw), horizon_start()).unwrap();
        for task in catalog.tasks() {
            prop_assert!(task.min_duration <= task.duration);
            prop_assert!(task.duration <= task.max_duration);
        }
    }

    #[test]
    fn scheduling_is_deterministic(
        raw in proptest::collection::vec(task_strategy(), 0..12),
        locked in proptest::collection::vec((0i64..(3 * 24 * 60), 15i64..180), 0..6),
        now in 0i64..(24 * 60),
    ) {
        let request = build_request(&raw, &locked, now);
        prop_assert_eq!(run(&request), run(&request));
    }

    #[test]
    fn minutes_are_conserved(
        raw in proptest::collection::vec(task_strategy(), 0..12),
        locked in proptest::collection::vec((0i64..(3 * 24 * 60), 15i64..180), 0..6),
        now in 0i64..(24 * 60),
    ) {
        let request = build_request(&raw, &locked, now);
        let result = run(&request);
        for task in &request.tasks {
            let placed = result.scheduled_minutes_for_task(&task.id);
            let left = result.unscheduled_for(&task.id).map_or(0, |u| u.remaining_minutes());
            prop_assert_eq!(placed + left, task.remaining_minutes(), "task {}", task.id);
        }
    }

    #[test]
    fn blocks_stay_inside_active_hours(
        raw in proptest::collection::vec(task_strategy(), 0..12),
        locked in proptest::collection::vec((0i64..(3 * 24 * 60), 15i64..180), 0..6),
        now in 0i64..(24 * 60),
    ) {
        let request = build_request(&raw, &locked, now);
        let result = run(&request);
        let registry = ActiveHoursRegistry::default();
        let window = SlotScheduler::new()
            .effective_window(request.horizon_start, request.horizon_end, request.reference_now)
            .unwrap();

        for block in &result.blocks {
            let task = request.tasks.iter().find(|t| t.id == block.task_id).unwrap();
            let inside = registry
                .windows_on(task.category, block.start.date())
                .iter()
                .any(|w| w.covers(&block.interval()));
            prop_assert!(inside, "block {:?} outside {} hours", block, task.category);
            prop_assert!(window.covers(&block.interval()));
        }
    }

    #[test]
    fn blocks_never_overlap(
        raw in proptest::collection::vec(task_strategy(), 0..12),
        locked in proptest::collection::vec((0i64..(3 * 24 * 60), 15i64..180), 0..6),
        now in 0i64..(24 * 60),
    ) {
        let request = build_request(&raw, &locked, now);
        let result = run(&request);
        let blocks: Vec<Interval> = result.blocks.iter().map(|b| b.interval()).collect();

        for (i, a) in blocks.iter().enumerate() {
            for b in &blocks[i + 1..] {
                prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
            for event in &request.locked {
                prop_assert!(!a.overlaps(&event.interval()));
            }
        }
    }

    #[test]
    fn segments_are_ordered_and_sized(
        raw in proptest::collection::vec(task_strategy(), 0..12),
        locked in proptest::collection::vec((0i64..(3 * 24 * 60), 15i64..180), 0..6),
        now in 0i64..(24 * 60),
    ) {
        let request = build_request(&raw, &locked, now);
        let result = run(&request);
        check_segments(&request, &result)?;
    }

    #[test]
    fn breaks_keep_schedule_consistent(
        raw in proptest::collection::vec(task_strategy(), 0..12),
        locked in proptest::collection::vec((0i64..(3 * 24 * 60), 15i64..180), 0..6),
        now in 0i64..(24 * 60),
    ) {
        let request = build_request(&raw, &locked, now);
        let result = run_with_breaks(&request);

        for task in &request.tasks {
            let placed = result.scheduled_minutes_for_task(&task.id);
            let left = result.unscheduled_for(&task.id).map_or(0, |u| u.remaining_minutes());
            prop_assert_eq!(placed + left, task.remaining_minutes(), "task {}", task.id);
        }
        for pause in &result.breaks {
            prop_assert_eq!(pause.duration_minutes(), 15);
            for block in &result.blocks {
                prop_assert!(!pause.overlaps(&block.interval()), "{:?} overlaps break {:?}", block, pause);
            }
            for event in &request.locked {
                prop_assert!(!pause.overlaps(&event.interval()));
            }
        }
        check_segments(&request, &result)?;
    }

    #[test]
    fn higher_priority_is_never_displaced(
        quarters in 1u32..=32,
    ) {
        // Two identical non-splittable tasks competing for one short window:
        // whichever fits, the critical one is placed first.
        let registry = ActiveHoursRegistry::new()
            .with_ranges(
                Category::Work,
                vec![u_timeblock::models::ActiveHourRange::hm(9, 0, 11, 0).unwrap()],
            )
            .unwrap();
        let hours = f64::from(quarters) * 0.25;
        let tasks = vec![
            Task::new("normal", hours),
            Task::new("critical", hours).with_priority(Priority::Critical),
        ];
        let start = horizon_start();
        let request = ScheduleRequest::new(tasks, start, start + Duration::days(1))
            .with_active_hours(registry);
        let result = run(&request);
        if hours <= 2.0 {
            let first = result.blocks.first().unwrap();
            prop_assert_eq!(first.task_id.as_str(), "critical");
        } else {
            prop_assert!(result.blocks.is_empty());
        }
    }
}
