//! Explicit date windows.
//!
//! Every entry point takes the set of calendar dates to work on as a
//! parameter. Nothing in this crate consults the wall clock.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{GapError, Result};

/// An ordered, duplicate-free set of calendar dates. The dates need not be
/// contiguous.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<NaiveDate>", into = "Vec<NaiveDate>")]
pub struct DateWindow {
    dates: Vec<NaiveDate>,
}

impl DateWindow {
    /// Build a window from arbitrary dates; they are sorted and de-duplicated.
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let set: BTreeSet<NaiveDate> = dates.into_iter().collect();
        Self {
            dates: set.into_iter().collect(),
        }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { dates: vec![date] }
    }

    /// Every day from `first` to `last`, inclusive.
    pub fn range(first: NaiveDate, last: NaiveDate) -> Result<Self> {
        if last < first {
            return Err(GapError::InvalidWindow(format!(
                "range end {} is before start {}",
                last, first
            )));
        }
        Ok(Self {
            dates: first.iter_days().take_while(|d| *d <= last).collect(),
        })
    }

    /// Every day of the given calendar month.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| GapError::InvalidWindow(format!("no such month: {}-{:02}", year, month)))?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| GapError::InvalidWindow(format!("month out of range: {}-{:02}", year, month)))?;
        Self::range(first, next_first - Duration::days(1))
    }

    /// Every day of the month that contains `date`.
    pub fn containing_month(date: NaiveDate) -> Result<Self> {
        Self::month(date.year(), date.month())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// This window plus the `days` dates preceding each of its dates.
    pub fn with_leading_days(&self, days: u32) -> Self {
        let extended = self.dates.iter().flat_map(|date| {
            (0..=i64::from(days)).filter_map(move |back| date.checked_sub_signed(Duration::days(back)))
        });
        Self::new(extended)
    }
}

impl From<Vec<NaiveDate>> for DateWindow {
    fn from(dates: Vec<NaiveDate>) -> Self {
        Self::new(dates)
    }
}

impl From<DateWindow> for Vec<NaiveDate> {
    fn from(window: DateWindow) -> Self {
        window.dates
    }
}

impl FromIterator<NaiveDate> for DateWindow {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Parse a `YYYY-MM` month into `(year, month)`.
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let invalid = || GapError::InvalidWindow(format!("expected YYYY-MM, got '{}'", s));
    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}
