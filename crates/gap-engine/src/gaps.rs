//! Compute free-time gaps from occupied intervals.
//!
//! For each date, the clock segments of the occupied intervals touching that
//! date are sorted and merged (blocks separated by no more than the merge
//! tolerance count as contiguous), then the complement of the merged blocks
//! within the day is reported, dropping gaps shorter than the minimum width.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::GapConfig;
use crate::event::Event;
use crate::expander::{self, OccupiedInterval, MINUTES_PER_DAY};
use crate::format::minutes_to_clock;
use crate::window::DateWindow;

/// A maximal free interval within one calendar day.
///
/// `end_minute` may be 1440, rendered as `24:00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeGap {
    pub date: NaiveDate,
    pub start_minute: u32,
    pub end_minute: u32,
    pub duration_seconds: u32,
}

impl TimeGap {
    fn new(date: NaiveDate, start_minute: u32, end_minute: u32) -> Self {
        Self {
            date,
            start_minute,
            end_minute,
            duration_seconds: (end_minute - start_minute) * 60,
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_seconds / 60
    }

    pub fn start_clock(&self) -> String {
        minutes_to_clock(self.start_minute)
    }

    pub fn end_clock(&self) -> String {
        minutes_to_clock(self.end_minute)
    }

    /// `YYYY-MM-DDTHH:MM:00`.
    pub fn start_iso(&self) -> String {
        format!("{}T{}:00", self.date.format("%Y-%m-%d"), self.start_clock())
    }

    /// `YYYY-MM-DDTHH:MM:00`; a gap running to midnight ends at `T24:00:00`.
    pub fn end_iso(&self) -> String {
        format!("{}T{}:00", self.date.format("%Y-%m-%d"), self.end_clock())
    }
}

/// A merged run of occupied time within one day, in clock minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub start: u32,
    pub end: u32,
}

/// Sort `(start, end)` clock segments and merge them in a single sweep.
///
/// A segment joins the running block when it starts no later than
/// `tolerance` minutes after the block's end.
pub fn merge_blocks(mut segments: Vec<(u32, u32)>, tolerance: u32) -> Vec<Block> {
    segments.sort_unstable();

    let mut merged: Vec<Block> = Vec::new();
    for (start, end) in segments {
        if let Some(current) = merged.last_mut() {
            if start <= current.end.saturating_add(tolerance) {
                trace!(start, end, into_start = current.start, into_end = current.end, "merging segment");
                current.end = current.end.max(end);
                continue;
            }
        }
        merged.push(Block { start, end });
    }

    merged
}

/// The merged occupied blocks on `date`.
pub fn occupied_blocks_for_date(
    occupied: &[OccupiedInterval],
    date: NaiveDate,
    config: &GapConfig,
) -> Vec<Block> {
    let segments = occupied
        .iter()
        .filter_map(|interval| interval.segment_on(date))
        .map(|segment| (segment.start_minute, segment.end_minute))
        .collect();
    merge_blocks(segments, config.merge_tolerance_minutes)
}

/// Free-time gaps on `date` using the default thresholds.
pub fn find_gaps_for_date(occupied: &[OccupiedInterval], date: NaiveDate) -> Vec<TimeGap> {
    find_gaps_for_date_with_config(occupied, date, &GapConfig::default())
}

pub fn find_gaps_for_date_with_config(
    occupied: &[OccupiedInterval],
    date: NaiveDate,
    config: &GapConfig,
) -> Vec<TimeGap> {
    let blocks = occupied_blocks_for_date(occupied, date, config);
    gaps_between_blocks(date, &blocks, config.min_gap_minutes)
}

/// Invert merged blocks into gaps: before the first block, between each pair
/// of blocks, and after the last one. A day with no blocks is one full-day gap.
fn gaps_between_blocks(date: NaiveDate, blocks: &[Block], min_gap_minutes: u32) -> Vec<TimeGap> {
    let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
        return vec![TimeGap::new(date, 0, MINUTES_PER_DAY)];
    };

    let mut gaps = Vec::new();
    let mut push = |start: u32, end: u32| {
        // Negative or short widths are dropped, not signalled.
        match end.checked_sub(start) {
            Some(width) if width > 0 && width >= min_gap_minutes => {
                gaps.push(TimeGap::new(date, start, end));
            }
            _ => {}
        }
    };

    if first.start > 0 {
        push(0, first.start);
    }
    for pair in blocks.windows(2) {
        push(pair[0].end, pair[1].start);
    }
    if last.end < MINUTES_PER_DAY {
        push(last.end, MINUTES_PER_DAY);
    }

    gaps
}

/// Gaps for every date in `window`, concatenated in date order.
pub fn compute_gaps(occupied: &[OccupiedInterval], window: &DateWindow) -> Vec<TimeGap> {
    compute_gaps_with_config(occupied, window, &GapConfig::default())
}

pub fn compute_gaps_with_config(
    occupied: &[OccupiedInterval],
    window: &DateWindow,
    config: &GapConfig,
) -> Vec<TimeGap> {
    let mut by_date: BTreeMap<NaiveDate, Vec<(u32, u32)>> = BTreeMap::new();
    for segment in occupied.iter().flat_map(OccupiedInterval::day_segments) {
        if window.contains(segment.date) {
            by_date
                .entry(segment.date)
                .or_default()
                .push((segment.start_minute, segment.end_minute));
        }
    }

    let mut all_gaps = Vec::new();
    for date in window.iter() {
        let segments = by_date.remove(&date).unwrap_or_default();
        let blocks = merge_blocks(segments, config.merge_tolerance_minutes);
        let day_gaps = gaps_between_blocks(date, &blocks, config.min_gap_minutes);
        trace!(%date, blocks = blocks.len(), gaps = day_gaps.len(), "computed day gaps");
        all_gaps.extend(day_gaps);
    }

    debug!(dates = window.len(), gaps = all_gaps.len(), "computed gaps");
    all_gaps
}

/// Expand `events` and compute the gaps for every date in `window`.
pub fn find_all_gaps(events: &[Event], window: &DateWindow) -> Vec<TimeGap> {
    find_all_gaps_with_config(events, window, &GapConfig::default())
}

/// Like [`find_all_gaps`] with explicit thresholds.
///
/// Expansion also covers the day before each window date so that an overnight
/// occurrence starting the previous evening still occupies the morning.
pub fn find_all_gaps_with_config(
    events: &[Event],
    window: &DateWindow,
    config: &GapConfig,
) -> Vec<TimeGap> {
    let occupied = expander::expand(events, &window.with_leading_days(1));
    compute_gaps_with_config(&occupied, window, config)
}

/// Find the first gap of at least `min_duration_minutes` in `window`.
pub fn find_first_gap(
    events: &[Event],
    window: &DateWindow,
    min_duration_minutes: u32,
) -> Option<TimeGap> {
    find_first_gap_with_config(events, window, min_duration_minutes, &GapConfig::default())
}

/// Like [`find_first_gap`] with explicit thresholds.
pub fn find_first_gap_with_config(
    events: &[Event],
    window: &DateWindow,
    min_duration_minutes: u32,
    config: &GapConfig,
) -> Option<TimeGap> {
    find_all_gaps_with_config(events, window, config)
        .into_iter()
        .find(|gap| gap.duration_minutes() >= min_duration_minutes)
}
