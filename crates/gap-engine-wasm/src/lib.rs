//! WASM bindings for gap-engine.
//!
//! Exposes event expansion, gap finding, and window metrics to the browser
//! calendar via `wasm-bindgen`. All complex types cross the boundary as JSON
//! strings: events use the stored event shape, windows are arrays of
//! `YYYY-MM-DD` dates.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p gap-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/wasm/ \
//!   target/wasm32-unknown-unknown/release/gap_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use gap_engine::{DateWindow, Event, EventDraft, GapConfig, OccupiedInterval, TimeGap};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// The gap shape the calendar UI renders.
#[derive(Serialize)]
struct GapDto {
    start: String,
    end: String,
    /// Seconds.
    duration: u32,
    date: String,
}

impl From<&TimeGap> for GapDto {
    fn from(gap: &TimeGap) -> Self {
        Self {
            start: gap.start_iso(),
            end: gap.end_iso(),
            duration: gap.duration_seconds,
            date: gap.date.format("%Y-%m-%d").to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers: JSON in, JSON out
// ---------------------------------------------------------------------------

fn parse_events_json(json: &str) -> Result<Vec<Event>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid events JSON: {}", e))
}

fn parse_window_json(json: &str) -> Result<DateWindow, String> {
    let dates: Vec<NaiveDate> =
        serde_json::from_str(json).map_err(|e| format!("Invalid window JSON: {}", e))?;
    Ok(DateWindow::new(dates))
}

fn parse_config_json(json: Option<&str>) -> Result<GapConfig, String> {
    match json {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(raw).map_err(|e| format!("Invalid config JSON: {}", e))
        }
        _ => Ok(GapConfig::default()),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn gaps_to_json(gaps: &[TimeGap]) -> Result<String, String> {
    let dtos: Vec<GapDto> = gaps.iter().map(GapDto::from).collect();
    to_json(&dtos)
}

fn expand_events_impl(events_json: &str, window_json: &str) -> Result<String, String> {
    let events = parse_events_json(events_json)?;
    let window = parse_window_json(window_json)?;
    to_json(&gap_engine::expand(&events, &window))
}

fn compute_gaps_impl(occupied_json: &str, window_json: &str) -> Result<String, String> {
    let occupied: Vec<OccupiedInterval> = serde_json::from_str(occupied_json)
        .map_err(|e| format!("Invalid occupied intervals JSON: {}", e))?;
    let window = parse_window_json(window_json)?;
    gaps_to_json(&gap_engine::compute_gaps(&occupied, &window))
}

fn find_all_gaps_impl(
    events_json: &str,
    window_json: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let events = parse_events_json(events_json)?;
    let window = parse_window_json(window_json)?;
    let config = parse_config_json(config_json)?;
    gaps_to_json(&gap_engine::gaps::find_all_gaps_with_config(
        &events, &window, &config,
    ))
}

fn month_window_impl(year: i32, month: u32) -> Result<String, String> {
    let window = DateWindow::month(year, month).map_err(|e| e.to_string())?;
    to_json(&window)
}

fn metrics_report_impl(
    events_json: &str,
    window_json: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let events = parse_events_json(events_json)?;
    let window = parse_window_json(window_json)?;
    let config = parse_config_json(config_json)?;
    to_json(&gap_engine::metrics_report(&events, &window, &config))
}

fn validate_event_impl(draft_json: &str) -> Result<String, String> {
    let draft: EventDraft =
        serde_json::from_str(draft_json).map_err(|e| format!("Invalid event JSON: {}", e))?;
    to_json(&gap_engine::validate_draft(&draft))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Expand events into occupied intervals over a window of dates.
///
/// `events_json` is an array of stored events; `window_json` an array of
/// `YYYY-MM-DD` dates. Returns an array of occupied intervals ordered by
/// date, then start.
#[wasm_bindgen(js_name = "expandEvents")]
pub fn expand_events(events_json: &str, window_json: &str) -> Result<String, JsValue> {
    expand_events_impl(events_json, window_json).map_err(|e| JsValue::from_str(&e))
}

/// Compute free gaps from already expanded occupied intervals.
///
/// Returns an array of `{start, end, duration, date}` objects.
#[wasm_bindgen(js_name = "computeGaps")]
pub fn compute_gaps(occupied_json: &str, window_json: &str) -> Result<String, JsValue> {
    compute_gaps_impl(occupied_json, window_json).map_err(|e| JsValue::from_str(&e))
}

/// Expand events and compute free gaps for every date in the window.
///
/// `config_json` optionally overrides `mergeToleranceMinutes` and
/// `minGapMinutes`; both default to 15.
#[wasm_bindgen(js_name = "findAllGaps")]
pub fn find_all_gaps(
    events_json: &str,
    window_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    find_all_gaps_impl(events_json, window_json, config_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Every date of a calendar month (`month` is 1-12), as a window JSON array.
#[wasm_bindgen(js_name = "monthWindow")]
pub fn month_window(year: i32, month: u32) -> Result<String, JsValue> {
    month_window_impl(year, month).map_err(|e| JsValue::from_str(&e))
}

/// Time per category, tasks per day, daily occupation and gap summaries.
#[wasm_bindgen(js_name = "metricsReport")]
pub fn metrics_report(
    events_json: &str,
    window_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    metrics_report_impl(events_json, window_json, config_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Validate event form data. Returns a JSON array of messages, empty when
/// the draft is valid.
#[wasm_bindgen(js_name = "validateEvent")]
pub fn validate_event(draft_json: &str) -> Result<String, JsValue> {
    validate_event_impl(draft_json).map_err(|e| JsValue::from_str(&e))
}

/// Render a duration in seconds as `"45m"`, `"2h"` or `"1h 30m"`.
#[wasm_bindgen(js_name = "formatDuration")]
pub fn format_duration(seconds: u32) -> String {
    gap_engine::format_duration(u64::from(seconds))
}
