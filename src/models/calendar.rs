//! Active hours and calendar intervals.
//!
//! Defines when each category of work may happen: recurring daily
//! time-of-day ranges per [`Category`], optionally varied by weekday, plus
//! immovable [`LockedEvent`]s that block time for every category.
//!
//! # Time Model
//! Ranges carry no date; they recur every day. [`ActiveHoursRegistry::windows_on`]
//! materialises them into concrete half-open [`Interval`]s for a given date.
//!
//! # Precedence
//! Locked events override active hours. An instant is usable for a category
//! iff it falls inside one of the category's ranges for that date AND it is
//! not covered by a locked event or an already placed block.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::Category;
use crate::error::InvalidRangeError;

/// A concrete time interval `[start, end)`.
///
/// Half-open: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Interval start (inclusive).
    pub start: NaiveDateTime,
    /// Interval end (exclusive).
    pub end: NaiveDateTime,
}

impl Interval {
    /// Creates a new interval.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Length in whole minutes (zero for empty or inverted intervals).
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes().max(0)
    }

    /// Whether the interval has no length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether an instant falls within this interval.
    #[inline]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at < self.end
    }

    /// Whether `other` lies entirely inside this interval.
    pub fn covers(&self, other: &Self) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Whether two intervals overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Overlapping part of two intervals, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end > start).then_some(Self { start, end })
    }

    /// Calendar dates touched by the interval, in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        if self.is_empty() {
            return dates;
        }
        let mut day = self.start.date();
        let last = self.end.date();
        while day <= last {
            dates.push(day);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        dates
    }
}

/// A recurring daily time-of-day window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActiveHourRange {
    /// Window start (inclusive).
    pub start: NaiveTime,
    /// Window end (exclusive).
    pub end: NaiveTime,
}

impl ActiveHourRange {
    /// Creates a range, rejecting empty or inverted ones.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, InvalidRangeError> {
        if start >= end {
            return Err(InvalidRangeError::NotIncreasing { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range from hour/minute pairs, e.g. `hm(9, 0, 17, 0)`.
    ///
    /// Out-of-range clock values are rejected as [`InvalidRangeError::NotIncreasing`].
    pub fn hm(
        start_hour: u32,
        start_minute: u32,
        end_hour: u32,
        end_minute: u32,
    ) -> Result<Self, InvalidRangeError> {
        let start = clock(start_hour, start_minute);
        let end = clock(end_hour, end_minute);
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Err(InvalidRangeError::NotIncreasing {
                start: start.unwrap_or_default(),
                end: end.unwrap_or_default(),
            }),
        }
    }

    /// Length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether two ranges overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Materialises this range on a concrete date.
    pub fn on(&self, date: NaiveDate) -> Interval {
        Interval::new(date.and_time(self.start), date.and_time(self.end))
    }
}

fn clock(hour: u32, minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Per-category recurring availability.
///
/// Each category has a daily list of ranges, and may override that list on
/// specific weekdays. An override with no ranges disables the category on
/// that weekday. Categories with no ranges have no capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveHoursRegistry {
    /// Ranges used every day unless overridden.
    daily: BTreeMap<Category, Vec<ActiveHourRange>>,
    /// Weekday overrides keyed by days from Monday (0 = Monday).
    #[serde(default)]
    weekdays: BTreeMap<Category, BTreeMap<u32, Vec<ActiveHourRange>>>,
}

impl ActiveHoursRegistry {
    /// Creates an empty registry (no capacity in any category).
    pub fn new() -> Self {
        Self {
            daily: BTreeMap::new(),
            weekdays: BTreeMap::new(),
        }
    }

    /// Default registry: personal 07:00–23:00, work 09:00–17:00,
    /// meeting 09:00–17:00 (meeting mirrors work), every day.
    pub fn standard() -> Self {
        let personal = fixed_range(7, 23);
        let office = fixed_range(9, 17);
        let mut daily = BTreeMap::new();
        daily.insert(Category::Personal, vec![personal]);
        daily.insert(Category::Work, vec![office]);
        daily.insert(Category::Meeting, vec![office]);
        Self {
            daily,
            weekdays: BTreeMap::new(),
        }
    }

    /// Sets the daily ranges for a category (replacing existing ones).
    pub fn with_ranges(
        mut self,
        category: Category,
        ranges: Vec<ActiveHourRange>,
    ) -> Result<Self, InvalidRangeError> {
        let ranges = normalize(category, ranges)?;
        self.daily.insert(category, ranges);
        Ok(self)
    }

    /// Sets a single whole-hour daily range without validation. Used for
    /// built-in fixtures whose hours are known to be well-formed.
    pub(crate) fn with_fixed_hours(
        mut self,
        category: Category,
        start_hour: u32,
        end_hour: u32,
    ) -> Self {
        self.daily
            .insert(category, vec![fixed_range(start_hour, end_hour)]);
        self
    }

    /// Overrides a category's ranges on one weekday. Pass an empty list to
    /// disable the category on that day.
    pub fn with_weekday_ranges(
        mut self,
        category: Category,
        weekday: Weekday,
        ranges: Vec<ActiveHourRange>,
    ) -> Result<Self, InvalidRangeError> {
        let ranges = normalize(category, ranges)?;
        self.weekdays
            .entry(category)
            .or_default()
            .insert(weekday.num_days_from_monday(), ranges);
        Ok(self)
    }

    /// Disables a category on the given weekdays (e.g. work at weekends).
    pub fn without_weekdays(mut self, category: Category, weekdays: &[Weekday]) -> Self {
        let overrides = self.weekdays.entry(category).or_default();
        for day in weekdays {
            overrides.insert(day.num_days_from_monday(), Vec::new());
        }
        self
    }

    /// Re-checks every range (ordering and overlap). Used on registries that
    /// were deserialised rather than built.
    pub fn validate(&self) -> Result<(), InvalidRangeError> {
        for (category, ranges) in &self.daily {
            check_ranges(*category, ranges)?;
        }
        for (category, days) in &self.weekdays {
            for ranges in days.values() {
                check_ranges(*category, ranges)?;
            }
        }
        Ok(())
    }

    /// Ranges that apply to a category on a date, ordered by start.
    pub fn ranges_for(&self, category: Category, date: NaiveDate) -> &[ActiveHourRange] {
        let weekday = date.weekday().num_days_from_monday();
        if let Some(ranges) = self
            .weekdays
            .get(&category)
            .and_then(|days| days.get(&weekday))
        {
            return ranges;
        }
        self.daily
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Concrete windows for a category on a date.
    pub fn windows_on(&self, category: Category, date: NaiveDate) -> Vec<Interval> {
        self.ranges_for(category, date)
            .iter()
            .map(|r| r.on(date))
            .collect()
    }

    /// Total active minutes for a category inside `window`, excluding time
    /// covered by `blocked` intervals.
    pub fn capacity_minutes(
        &self,
        category: Category,
        window: &Interval,
        blocked: &[Interval],
    ) -> i64 {
        let mut total = 0;
        for date in window.dates() {
            for active in self.windows_on(category, date) {
                let Some(clipped) = active.intersection(window) else {
                    continue;
                };
                let covered = merged_minutes(
                    blocked
                        .iter()
                        .filter_map(|b| b.intersection(&clipped))
                        .collect(),
                );
                total += clipped.duration_minutes() - covered;
            }
        }
        total.max(0)
    }
}

impl Default for ActiveHoursRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Sums minutes covered by a set of intervals, counting overlaps once.
fn merged_minutes(mut intervals: Vec<Interval>) -> i64 {
    intervals.sort();
    let mut total = 0;
    let mut current: Option<Interval> = None;
    for iv in intervals {
        if let Some(cur) = current.as_mut() {
            if iv.start <= cur.end {
                cur.end = cur.end.max(iv.end);
                continue;
            }
        }
        if let Some(done) = current.replace(iv) {
            total += done.duration_minutes();
        }
    }
    total + current.map_or(0, |c| c.duration_minutes())
}

fn fixed_range(start_hour: u32, end_hour: u32) -> ActiveHourRange {
    ActiveHourRange {
        start: clock(start_hour, 0).unwrap_or_default(),
        end: clock(end_hour, 0).unwrap_or_default(),
    }
}

fn normalize(
    category: Category,
    mut ranges: Vec<ActiveHourRange>,
) -> Result<Vec<ActiveHourRange>, InvalidRangeError> {
    ranges.sort();
    check_ranges(category, &ranges)?;
    Ok(ranges)
}

fn check_ranges(category: Category, ranges: &[ActiveHourRange]) -> Result<(), InvalidRangeError> {
    for r in ranges {
        if r.start >= r.end {
            return Err(InvalidRangeError::NotIncreasing {
                start: r.start,
                end: r.end,
            });
        }
    }
    let mut sorted = ranges.to_vec();
    sorted.sort();
    for pair in sorted.windows(2) {
        if pair[0].overlaps(&pair[1]) {
            return Err(InvalidRangeError::Overlapping {
                category,
                first_start: pair[0].start,
                first_end: pair[0].end,
                second_start: pair[1].start,
                second_end: pair[1].end,
            });
        }
    }
    Ok(())
}

/// An existing, immovable calendar commitment.
///
/// Blocks time for every category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedEvent {
    /// Event start.
    pub start: NaiveDateTime,
    /// Event end.
    pub end: NaiveDateTime,
    /// Optional display label.
    #[serde(default)]
    pub label: Option<String>,
}

impl LockedEvent {
    /// Creates an unlabeled locked event.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            label: None,
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The blocked interval.
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    /// Creates an event lasting `minutes` from `start`.
    pub fn lasting(start: NaiveDateTime, minutes: i64) -> Self {
        Self::new(start, start + Duration::minutes(minutes))
    }
}
