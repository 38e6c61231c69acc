//! Tunable thresholds for the gap engine.

use serde::{Deserialize, Serialize};

/// Occupied blocks separated by at most this many minutes are merged.
pub const DEFAULT_MERGE_TOLERANCE_MINUTES: u32 = 15;

/// Free intervals shorter than this many minutes are not reported.
pub const DEFAULT_MIN_GAP_MINUTES: u32 = 15;

/// Thresholds controlling how occupied blocks are merged and which free
/// intervals are reported as gaps.
///
/// The defaults reproduce the calendar's behavior: separations of 15 minutes
/// or less count as contiguous, and only gaps of 15 minutes or more are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GapConfig {
    pub merge_tolerance_minutes: u32,
    pub min_gap_minutes: u32,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            merge_tolerance_minutes: DEFAULT_MERGE_TOLERANCE_MINUTES,
            min_gap_minutes: DEFAULT_MIN_GAP_MINUTES,
        }
    }
}

impl GapConfig {
    pub fn with_merge_tolerance(mut self, minutes: u32) -> Self {
        self.merge_tolerance_minutes = minutes;
        self
    }

    pub fn with_min_gap(mut self, minutes: u32) -> Self {
        self.min_gap_minutes = minutes;
        self
    }
}
