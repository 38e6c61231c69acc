//! Human-readable clock and duration labels.

use crate::gaps::TimeGap;

/// Format minutes since midnight as `HH:MM`. Minute 1440 renders as `24:00`.
pub fn minutes_to_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Format a duration in seconds as `2h`, `1h 30m` or `45m`.
///
/// Partial minutes are truncated.
pub fn format_duration(seconds: u64) -> String {
    let total_minutes = seconds / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    match (hours, minutes) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Label shown on a gap's background block in the calendar.
pub fn gap_label(gap: &TimeGap) -> String {
    format_duration(u64::from(gap.duration_seconds))
}
