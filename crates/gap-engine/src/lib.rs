//! # gap-engine
//!
//! Free-time gap finding for a personal calendar.
//!
//! Events are one-off spans or daily recurrences (optionally limited to some
//! weekdays). The engine expands them into concrete occupied intervals over an
//! explicit window of dates, merges each day's occupied time, and reports the
//! free gaps that remain. All arithmetic is wall-clock and local-day based.
//!
//! ```rust
//! use gap_engine::{find_all_gaps, parse_date, DateWindow, Event};
//!
//! let events: Vec<Event> = serde_json::from_str(r#"[{
//!     "id": "standup", "title": "Standup",
//!     "startDate": "2024-06-10", "endDate": "2024-06-10",
//!     "startTime": "09:00", "endTime": "10:00", "isDaily": false
//! }]"#).unwrap();
//!
//! let window = DateWindow::single(parse_date("2024-06-10").unwrap());
//! let gaps = find_all_gaps(&events, &window);
//!
//! assert_eq!(gaps.len(), 2);
//! assert_eq!(gaps[0].duration_seconds, 32_400); // 00:00-09:00
//! assert_eq!(gaps[1].end_iso(), "2024-06-10T24:00:00");
//! ```
//!
//! ## Modules
//!
//! - [`event`] — stored event shape, drafts, patches, validation, filters
//! - [`window`] — explicit date windows (months, ranges, arbitrary dates)
//! - [`expander`] — events → dated occupied intervals
//! - [`gaps`] — merge occupied time and invert it into free gaps
//! - [`metrics`] — time per category, tasks per day, daily occupation
//! - [`format`] — clock and duration labels
//! - [`config`] — merge tolerance and minimum gap thresholds
//! - [`store`] — JSON file and in-memory event stores (feature `store`)
//! - [`error`] — error types

pub mod config;
pub mod error;
pub mod event;
pub mod expander;
pub mod format;
pub mod gaps;
pub mod metrics;
#[cfg(feature = "store")]
pub mod store;
pub mod window;

pub use config::GapConfig;
pub use error::GapError;
pub use event::{parse_clock, parse_date, parse_weekdays, validate_draft, Event, EventDraft, EventFilter, EventPatch};
pub use expander::{expand, OccupiedInterval};
pub use format::format_duration;
pub use gaps::{compute_gaps, find_all_gaps, find_gaps_for_date, TimeGap};
pub use metrics::{metrics_report, MetricsReport};
#[cfg(feature = "store")]
pub use store::{EventStore, JsonFileStore, MemoryStore};
pub use window::{parse_month, DateWindow};
