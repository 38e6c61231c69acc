//! Aggregate metrics over a window: time per category, tasks per day, daily
//! occupation and per-day gap totals.
//!
//! All figures are derived from expanded occupied intervals and computed gaps;
//! nothing here reads the event store.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::GapConfig;
use crate::event::Event;
use crate::expander::{self, OccupiedInterval, MINUTES_PER_DAY};
use crate::gaps::{self, merge_blocks, TimeGap};
use crate::window::DateWindow;

/// Category key for occurrences whose event has no category.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// How one day splits between occupied and free time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOccupation {
    pub date: NaiveDate,
    /// Minutes covered by at least one occurrence.
    pub occupied_minutes: u32,
    pub free_minutes: u32,
    /// Occurrences starting on this date.
    pub task_count: usize,
    pub category_minutes: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGapSummary {
    pub date: NaiveDate,
    pub gap_count: usize,
    pub free_seconds: u64,
}

/// Everything the metrics view shows for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub window: DateWindow,
    pub category_minutes: BTreeMap<String, u32>,
    pub tasks_per_day: Vec<DayCount>,
    pub occupation: Vec<DayOccupation>,
    pub gaps_per_day: Vec<DayGapSummary>,
}

impl MetricsReport {
    pub fn total_occupied_minutes(&self) -> u32 {
        self.occupation.iter().map(|day| day.occupied_minutes).sum()
    }

    pub fn total_free_seconds(&self) -> u64 {
        self.gaps_per_day.iter().map(|day| day.free_seconds).sum()
    }

    pub fn total_tasks(&self) -> usize {
        self.tasks_per_day.iter().map(|day| day.count).sum()
    }
}

fn category_key(interval: &OccupiedInterval) -> String {
    match interval.category.as_deref().map(str::trim) {
        Some(category) if !category.is_empty() => category.to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}

/// Minutes per category, counting only the parts of occurrences that fall on
/// window dates. Overlapping occurrences are each counted in full.
pub fn category_time(occupied: &[OccupiedInterval], window: &DateWindow) -> BTreeMap<String, u32> {
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    for interval in occupied {
        let minutes: u32 = window.iter().map(|date| interval.minutes_on(date)).sum();
        if minutes > 0 {
            *totals.entry(category_key(interval)).or_default() += minutes;
        }
    }
    totals
}

/// Number of occurrences anchored on each window date, including empty days.
pub fn tasks_per_day(occupied: &[OccupiedInterval], window: &DateWindow) -> Vec<DayCount> {
    window
        .iter()
        .map(|date| DayCount {
            date,
            count: occupied.iter().filter(|i| i.date == date).count(),
        })
        .collect()
}

/// Occupied versus free minutes on `date`.
///
/// Occupied time is the exact union of the day's occurrences, without the
/// merge tolerance the gap engine applies.
pub fn day_occupation(occupied: &[OccupiedInterval], date: NaiveDate) -> DayOccupation {
    let ranges = occupied
        .iter()
        .filter_map(|interval| interval.clock_range_on(date))
        .collect();
    let occupied_minutes: u32 = merge_blocks(ranges, 0)
        .iter()
        .map(|block| block.end - block.start)
        .sum::<u32>()
        .min(MINUTES_PER_DAY);

    let mut category_minutes: BTreeMap<String, u32> = BTreeMap::new();
    for interval in occupied {
        let minutes = interval.minutes_on(date);
        if minutes > 0 {
            *category_minutes.entry(category_key(interval)).or_default() += minutes;
        }
    }

    DayOccupation {
        date,
        occupied_minutes,
        free_minutes: MINUTES_PER_DAY - occupied_minutes,
        task_count: occupied.iter().filter(|i| i.date == date).count(),
        category_minutes,
    }
}

/// Number and total length of reported gaps per window date.
pub fn gap_summary(gaps: &[TimeGap], window: &DateWindow) -> Vec<DayGapSummary> {
    window
        .iter()
        .map(|date| {
            let day_gaps = gaps.iter().filter(|gap| gap.date == date);
            let (gap_count, free_seconds) = day_gaps.fold((0, 0u64), |(count, secs), gap| {
                (count + 1, secs + u64::from(gap.duration_seconds))
            });
            DayGapSummary {
                date,
                gap_count,
                free_seconds,
            }
        })
        .collect()
}

/// Expand `events` over `window` and compute every metric.
pub fn metrics_report(events: &[Event], window: &DateWindow, config: &GapConfig) -> MetricsReport {
    let occupied = expander::expand(events, &window.with_leading_days(1));
    let gaps = gaps::compute_gaps_with_config(&occupied, window, config);

    MetricsReport {
        window: window.clone(),
        category_minutes: category_time(&occupied, window),
        tasks_per_day: tasks_per_day(&occupied, window),
        occupation: window.iter().map(|date| day_occupation(&occupied, date)).collect(),
        gaps_per_day: gap_summary(&gaps, window),
    }
}
