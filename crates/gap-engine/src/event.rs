//! The stored event shape, its draft and patch forms, validation, and filters.
//!
//! Events serialize with the field names the browser front end uses
//! (`startDate`, `startTime`, `isDaily`, `weekDays`, ...), dates as
//! `YYYY-MM-DD` and clock times as `HH:MM`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{GapError, Result};

/// A calendar event as persisted by the event store.
///
/// `start_date`/`end_date` are only meaningful when `is_daily` is false. A
/// daily event recurs on every day of the active window, restricted to
/// `week_days` (0 = Sunday .. 6 = Saturday) when that list is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, with = "opt_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(default, with = "opt_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub is_daily: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_days: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Form data for a new event: everything but the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default, with = "opt_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(default, with = "opt_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub is_daily: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_days: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A partial update. Absent fields keep their current value; optional fields
/// set to `null` are cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(with = "patch_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(with = "opt_clock", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(with = "patch_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(with = "opt_clock", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_daily: Option<bool>,
    #[serde(with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    pub week_days: Option<Option<Vec<i32>>>,
    #[serde(with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl Event {
    pub fn from_draft(id: impl Into<String>, draft: EventDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            start_date: draft.start_date,
            start_time: draft.start_time,
            end_date: draft.end_date,
            end_time: draft.end_time,
            color: draft.color,
            is_daily: draft.is_daily,
            week_days: draft.week_days,
            category: draft.category,
            description: draft.description,
        }
    }

    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            start_date: self.start_date,
            start_time: self.start_time,
            end_date: self.end_date,
            end_time: self.end_time,
            color: self.color.clone(),
            is_daily: self.is_daily,
            week_days: self.week_days.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
        }
    }

    /// Return a copy of this event with `patch` applied. The id never changes.
    /// A `Some(None)` in an optional field clears it.
    pub fn apply(&self, patch: &EventPatch) -> Self {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(date) = patch.start_date {
            next.start_date = date;
        }
        if let Some(time) = patch.start_time {
            next.start_time = time;
        }
        if let Some(date) = patch.end_date {
            next.end_date = date;
        }
        if let Some(time) = patch.end_time {
            next.end_time = time;
        }
        if let Some(color) = &patch.color {
            next.color = color.clone();
        }
        if let Some(is_daily) = patch.is_daily {
            next.is_daily = is_daily;
        }
        if let Some(week_days) = &patch.week_days {
            next.week_days = week_days.clone();
        }
        if let Some(category) = &patch.category {
            next.category = category.clone();
        }
        if let Some(description) = &patch.description {
            next.description = description.clone();
        }
        next
    }

    /// True when the end clock time is earlier than the start clock time,
    /// i.e. the event runs past midnight.
    pub fn is_overnight(&self) -> bool {
        self.end_time < self.start_time
    }

    /// Whether a daily event recurs on `date`. Weekday values outside 0..=6
    /// never match.
    pub fn recurs_on(&self, date: NaiveDate) -> bool {
        match self.week_days.as_deref() {
            None | Some([]) => true,
            Some(days) => {
                let weekday = date.weekday().num_days_from_sunday() as i32;
                days.contains(&weekday)
            }
        }
    }

    /// Whether a daily occurrence has positive length. Equal clock times are
    /// degenerate unless both are `00:00`, which spans the whole day.
    pub fn has_daily_span(&self) -> bool {
        self.start_time != self.end_time || is_midnight(self.end_time)
    }

    /// The concrete span of a one-off event, or `None` if it has no dates or
    /// resolves to zero or negative length.
    pub fn one_off_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start_date = self.start_date?;
        let end_date = self.end_date?;
        resolve_span(start_date.and_time(self.start_time), end_date, self.end_time)
    }

    /// The span of a daily occurrence anchored on `date`. Overnight
    /// occurrences end on the following day.
    pub fn occurrence_on(&self, date: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
        resolve_span(date.and_time(self.start_time), date, self.end_time)
    }
}

/// Combine a start instant with an end date and clock time. An end clock
/// earlier than the start clock that would otherwise land at or before the
/// start is moved to the next day, and so is a `00:00` end equal to a
/// `00:00` start (a whole day). Other degenerate spans yield `None`.
pub(crate) fn resolve_span(
    start: NaiveDateTime,
    end_date: NaiveDate,
    end_time: NaiveTime,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut end = end_date.and_time(end_time);
    if (end <= start && end_time < start.time()) || (end == start && is_midnight(end_time)) {
        end += Duration::days(1);
    }
    (end > start).then_some((start, end))
}

fn is_midnight(time: NaiveTime) -> bool {
    time == NaiveTime::MIN
}

/// Check a draft the way the event form does before saving.
///
/// Returns one message per failed rule; an empty list means the draft is valid.
pub fn validate_draft(draft: &EventDraft) -> Vec<String> {
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push("title is required".to_string());
    }

    if draft.is_daily {
        if draft.start_time == draft.end_time && !is_midnight(draft.end_time) {
            errors.push("start and end time must differ".to_string());
        }
    } else {
        match (draft.start_date, draft.end_date) {
            (Some(start_date), Some(end_date)) => {
                let start = start_date.and_time(draft.start_time);
                if resolve_span(start, end_date, draft.end_time).is_none() {
                    errors.push("event must end after it starts".to_string());
                }
            }
            _ => errors.push("start and end dates are required for non-daily events".to_string()),
        }
    }

    if let Some(days) = &draft.week_days {
        if days.iter().any(|d| !(0..=6).contains(d)) {
            errors.push("weekdays must be between 0 (Sunday) and 6 (Saturday)".to_string());
        }
    }

    errors
}

/// Criteria for narrowing a list of stored events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFilter {
    pub category: Option<String>,
    #[serde(with = "opt_date")]
    pub date_from: Option<NaiveDate>,
    #[serde(with = "opt_date")]
    pub date_to: Option<NaiveDate>,
    /// `Some(true)` keeps only daily events, `Some(false)` only one-off events.
    pub daily_only: Option<bool>,
}

impl EventFilter {
    /// Date bounds only constrain one-off events; daily events have no dates.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(category) = &self.category {
            if event.category.as_ref() != Some(category) {
                return false;
            }
        }
        if let Some(daily) = self.daily_only {
            if event.is_daily != daily {
                return false;
            }
        }
        if !event.is_daily {
            if let (Some(from), Some(start)) = (self.date_from, event.start_date) {
                if start < from {
                    return false;
                }
            }
            if let (Some(to), Some(end)) = (self.date_to, event.end_date) {
                if end > to {
                    return false;
                }
            }
        }
        true
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| GapError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse a 24-hour `HH:MM` clock time. A trailing `:SS` is accepted.
pub fn parse_clock(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| GapError::InvalidTime(format!("'{}': {}", s, e)))
}

/// Parse a comma-separated weekday list such as `"1,3,5"` (0 = Sunday).
pub fn parse_weekdays(s: &str) -> Result<Vec<i32>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<i32>() {
            Ok(day) if (0..=6).contains(&day) => Ok(day),
            _ => Err(GapError::Validation(vec![format!(
                "invalid weekday '{}': expected 0 (Sunday) to 6 (Saturday)",
                part
            )])),
        })
        .collect()
}

mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_clock(&raw).map_err(serde::de::Error::custom)
    }
}

mod opt_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => super::parse_clock(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

/// Patch dates: absent keeps the field, `null` or `""` clears it.
mod patch_date {
    use chrono::NaiveDate;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<Option<NaiveDate>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(inner) => super::opt_date::serialize(inner, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<NaiveDate>>, D::Error> {
        super::opt_date::deserialize(deserializer).map(Some)
    }
}

/// Optional `YYYY-MM-DD` dates; the front end writes `""` for daily events.
mod opt_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => super::parse_date(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
