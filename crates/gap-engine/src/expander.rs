//! Event expansion -- turns stored events into concrete occupied intervals.
//!
//! One-off events produce a single interval spanning their raw start and end
//! timestamps. Daily events produce one interval per matching window date.
//! Overnight occurrences keep their true end on the following day; splitting
//! into per-day clock segments happens in [`OccupiedInterval::day_segments`].

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::event::Event;
use crate::window::DateWindow;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Clock minute used as the end of a segment that runs up to midnight.
pub const LAST_MINUTE: u32 = MINUTES_PER_DAY - 1;

/// A concrete occurrence of an event.
///
/// `date` is the anchor date (the day the occurrence starts). `end` may lie
/// on a later date for overnight or multi-day events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupiedInterval {
    #[serde(default)]
    pub event_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// The part of an occupied interval that falls on one calendar date, in
/// minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySegment {
    pub date: NaiveDate,
    pub start_minute: u32,
    pub end_minute: u32,
}

impl DaySegment {
    pub fn width(&self) -> u32 {
        self.end_minute.saturating_sub(self.start_minute)
    }
}

impl OccupiedInterval {
    fn new(event: &Event, date: NaiveDate, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            event_id: event.id.clone(),
            title: event.title.clone(),
            category: event.category.clone(),
            date,
            start,
            end,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether any part of this interval falls on `date`.
    pub fn touches(&self, date: NaiveDate) -> bool {
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = day_start + Duration::days(1);
        self.start < day_end && self.end > day_start
    }

    /// The exact clock range of this interval on `date`, with a range that
    /// continues past midnight ending at minute 1440.
    pub fn clock_range_on(&self, date: NaiveDate) -> Option<(u32, u32)> {
        if !self.touches(date) {
            return None;
        }
        let start_minute = if self.start.date() == date {
            clock_minute(self.start.time())
        } else {
            0
        };
        let end_minute = if self.end.date() == date {
            clock_minute(self.end.time())
        } else {
            MINUTES_PER_DAY
        };
        (end_minute > start_minute).then_some((start_minute, end_minute))
    }

    /// Occupied minutes on `date`.
    pub fn minutes_on(&self, date: NaiveDate) -> u32 {
        self.clock_range_on(date)
            .map(|(start, end)| end - start)
            .unwrap_or(0)
    }

    /// The clock segment of this interval on `date`, if it has a non-empty one.
    ///
    /// A segment that continues past midnight ends at [`LAST_MINUTE`], so an
    /// interval ending exactly at `00:00` is read as running to the end of its
    /// last day rather than as zero length. A segment starting at 23:59 keeps
    /// its end at 1440 so that its last minute is still occupied.
    pub fn segment_on(&self, date: NaiveDate) -> Option<DaySegment> {
        let (start_minute, end_minute) = self.clock_range_on(date)?;
        let end_minute = if start_minute < LAST_MINUTE {
            end_minute.min(LAST_MINUTE)
        } else {
            end_minute
        };
        (end_minute > start_minute).then_some(DaySegment {
            date,
            start_minute,
            end_minute,
        })
    }

    /// Split this interval into one clock segment per calendar date it covers.
    pub fn day_segments(&self) -> Vec<DaySegment> {
        self.start
            .date()
            .iter_days()
            .take_while(|d| *d <= self.end.date())
            .filter_map(|d| self.segment_on(d))
            .collect()
    }
}

/// Minutes since midnight, ignoring seconds.
pub fn clock_minute(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Expand events into occupied intervals for the dates in `window`.
///
/// - One-off events are emitted once, anchored on their start date, when their
///   span overlaps at least one window date.
/// - Daily events are emitted for every window date whose weekday is listed in
///   `week_days` (every date when the list is absent or empty).
/// - Events that resolve to zero or negative length are skipped.
///
/// The output is ordered by anchor date, then start time; ties keep input order.
pub fn expand(events: &[Event], window: &DateWindow) -> Vec<OccupiedInterval> {
    let mut occupied = Vec::new();

    for event in events {
        if event.is_daily {
            if !event.has_daily_span() {
                warn!(event_id = %event.id, "skipping daily event with zero duration");
                continue;
            }
            occupied.extend(
                window
                    .iter()
                    .filter(|date| event.recurs_on(*date))
                    .filter_map(|date| {
                        event
                            .occurrence_on(date)
                            .map(|(start, end)| OccupiedInterval::new(event, date, start, end))
                    }),
            );
        } else {
            let Some((start, end)) = event.one_off_span() else {
                warn!(event_id = %event.id, "skipping one-off event with missing dates or empty span");
                continue;
            };
            let interval = OccupiedInterval::new(event, start.date(), start, end);
            if window.iter().any(|date| interval.touches(date)) {
                occupied.push(interval);
            }
        }
    }

    occupied.sort_by_key(|interval| (interval.date, interval.start));
    debug!(
        events = events.len(),
        dates = window.len(),
        intervals = occupied.len(),
        "expanded events"
    );
    occupied
}
