//! Tests for gap computation: merging, inversion, thresholds and windows.

use chrono::NaiveDate;
use gap_engine::gaps::{
    compute_gaps, find_all_gaps, find_all_gaps_with_config, find_first_gap,
    find_first_gap_with_config, find_gaps_for_date, find_gaps_for_date_with_config,
    occupied_blocks_for_date, Block,
};
use gap_engine::{expand, parse_clock, parse_date, DateWindow, Event, GapConfig, OccupiedInterval};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

fn one_off(id: &str, day: &str, start: &str, end: &str) -> Event {
    Event {
        id: id.to_string(),
        title: id.to_string(),
        start_date: Some(date(day)),
        start_time: parse_clock(start).unwrap(),
        end_date: Some(date(day)),
        end_time: parse_clock(end).unwrap(),
        color: String::new(),
        is_daily: false,
        week_days: None,
        category: None,
        description: None,
    }
}

fn daily(id: &str, start: &str, end: &str) -> Event {
    Event {
        is_daily: true,
        start_date: None,
        end_date: None,
        ..one_off(id, "2024-01-01", start, end)
    }
}

fn occupied(day: &str, start: &str, end_day: &str, end: &str) -> OccupiedInterval {
    OccupiedInterval {
        event_id: "o".to_string(),
        title: "o".to_string(),
        category: None,
        date: date(day),
        start: date(day).and_time(parse_clock(start).unwrap()),
        end: date(end_day).and_time(parse_clock(end).unwrap()),
    }
}

fn span(start: &str, end: &str, seconds: u32) -> (String, String, u32) {
    (start.to_string(), end.to_string(), seconds)
}

fn june_10() -> DateWindow {
    DateWindow::single(date("2024-06-10"))
}

/// `(start, end, seconds)` triples for compact assertions.
fn spans(gaps: &[gap_engine::TimeGap]) -> Vec<(String, String, u32)> {
    gaps.iter()
        .map(|g| (g.start_clock(), g.end_clock(), g.duration_seconds))
        .collect()
}

// ---------------------------------------------------------------------------
// Single day
// ---------------------------------------------------------------------------

#[test]
fn single_event_produces_gap_before_and_after() {
    let events = vec![one_off("a", "2024-06-10", "09:00", "10:00")];

    let gaps = find_all_gaps(&events, &june_10());

    assert_eq!(
        spans(&gaps),
        vec![
            span("00:00", "09:00", 32_400),
            span("10:00", "24:00", 50_400),
        ]
    );
    assert_eq!(gaps[0].date, date("2024-06-10"));
    assert_eq!(gaps[0].start_iso(), "2024-06-10T00:00:00");
    assert_eq!(gaps[0].end_iso(), "2024-06-10T09:00:00");
    assert_eq!(gaps[1].end_iso(), "2024-06-10T24:00:00");
}

#[test]
fn day_without_events_is_one_full_day_gap() {
    let gaps = find_all_gaps(&[], &june_10());

    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].start_clock(), "00:00");
    assert_eq!(gaps[0].end_clock(), "24:00");
    assert_eq!(gaps[0].duration_seconds, 86_400);
}

#[test]
fn ten_minute_separation_merges_blocks() {
    let events = vec![
        one_off("a", "2024-06-10", "09:00", "10:00"),
        one_off("b", "2024-06-10", "10:10", "11:00"),
    ];

    let gaps = find_all_gaps(&events, &june_10());

    assert_eq!(
        spans(&gaps),
        vec![
            span("00:00", "09:00", 32_400),
            span("11:00", "24:00", 46_800),
        ]
    );
}

#[test]
fn twenty_minute_separation_yields_gap() {
    let events = vec![
        one_off("a", "2024-06-10", "09:00", "10:00"),
        one_off("b", "2024-06-10", "10:20", "11:00"),
    ];

    let gaps = find_all_gaps(&events, &june_10());

    assert_eq!(gaps.len(), 3);
    assert_eq!(gaps[1].start_clock(), "10:00");
    assert_eq!(gaps[1].end_clock(), "10:20");
    assert_eq!(gaps[1].duration_seconds, 1_200);
}

#[test]
fn exactly_fifteen_minute_separation_still_merges() {
    let events = vec![
        one_off("a", "2024-06-10", "09:00", "10:00"),
        one_off("b", "2024-06-10", "10:15", "11:00"),
    ];

    assert_eq!(find_all_gaps(&events, &june_10()).len(), 2);
}

#[test]
fn sixteen_minute_separation_is_reported() {
    let events = vec![
        one_off("a", "2024-06-10", "09:00", "10:00"),
        one_off("b", "2024-06-10", "10:16", "11:00"),
    ];

    let gaps = find_all_gaps(&events, &june_10());

    assert_eq!(gaps.len(), 3);
    assert_eq!(gaps[1].duration_seconds, 16 * 60);
}

#[test]
fn sub_threshold_gap_between_blocks_is_dropped() {
    // With merging disabled, a 10-minute gap survives merging but is too short to report.
    let config = GapConfig::default().with_merge_tolerance(0);
    let events = vec![
        one_off("a", "2024-06-10", "09:00", "10:00"),
        one_off("b", "2024-06-10", "10:10", "11:00"),
    ];

    let gaps = find_all_gaps_with_config(&events, &june_10(), &config);

    assert_eq!(
        spans(&gaps),
        vec![
            span("00:00", "09:00", 32_400),
            span("11:00", "24:00", 46_800),
        ]
    );
}

#[test]
fn short_leading_gap_is_dropped() {
    let events = vec![one_off("a", "2024-06-10", "00:10", "09:00")];

    let gaps = find_all_gaps(&events, &june_10());

    assert_eq!(spans(&gaps), vec![span("09:00", "24:00", 54_000)]);
}

#[test]
fn overlapping_and_contained_events_merge() {
    let events = vec![
        one_off("a", "2024-06-10", "10:00", "11:30"),
        one_off("b", "2024-06-10", "11:00", "12:00"),
        one_off("c", "2024-06-10", "10:15", "10:45"),
    ];

    let gaps = find_all_gaps(&events, &june_10());

    assert_eq!(
        spans(&gaps),
        vec![
            span("00:00", "10:00", 36_000),
            span("12:00", "24:00", 43_200),
        ]
    );
}

#[test]
fn unsorted_input_gives_same_gaps() {
    let sorted = vec![
        one_off("a", "2024-06-10", "08:00", "09:00"),
        one_off("b", "2024-06-10", "13:00", "14:00"),
    ];
    let reversed: Vec<Event> = sorted.iter().rev().cloned().collect();

    assert_eq!(
        find_all_gaps(&sorted, &june_10()),
        find_all_gaps(&reversed, &june_10())
    );
}

// ---------------------------------------------------------------------------
// Midnight handling
// ---------------------------------------------------------------------------

#[test]
fn event_ending_at_midnight_runs_to_end_of_day() {
    let events = vec![one_off("late", "2024-06-10", "22:00", "00:00")];
    let window = DateWindow::range(date("2024-06-10"), date("2024-06-11")).unwrap();

    let gaps = find_all_gaps(&events, &window);

    // 23:59-24:00 is a one-minute residual and is not reported.
    assert_eq!(gaps.len(), 2);
    assert_eq!(gaps[0].date, date("2024-06-10"));
    assert_eq!((gaps[0].start_clock().as_str(), gaps[0].end_clock().as_str()), ("00:00", "22:00"));
    assert_eq!(gaps[1].date, date("2024-06-11"));
    assert_eq!(gaps[1].duration_seconds, 86_400);
}

#[test]
fn all_day_event_leaves_no_gaps() {
    let occupied = vec![occupied("2024-06-10", "00:00", "2024-06-11", "00:00")];
    assert!(find_gaps_for_date(&occupied, date("2024-06-10")).is_empty());
}

#[test]
fn midnight_to_midnight_event_fills_the_whole_day() {
    let one_off_day = vec![one_off("all-day", "2024-06-10", "00:00", "00:00")];
    assert!(find_all_gaps(&one_off_day, &june_10()).is_empty());

    let daily_day = vec![daily("all-day", "00:00", "00:00")];
    let window = DateWindow::range(date("2024-06-10"), date("2024-06-12")).unwrap();
    assert!(find_all_gaps(&daily_day, &window).is_empty());
}

#[test]
fn midnight_to_midnight_event_does_not_touch_next_day() {
    let events = vec![one_off("all-day", "2024-06-10", "00:00", "00:00")];
    let window = DateWindow::range(date("2024-06-10"), date("2024-06-11")).unwrap();

    let gaps = find_all_gaps(&events, &window);

    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].date, date("2024-06-11"));
    assert_eq!(gaps[0].duration_seconds, 86_400);
}

#[test]
fn event_starting_in_last_minute_occupies_it() {
    let events = vec![one_off("late", "2024-06-10", "23:59", "00:30")];

    let gaps = find_all_gaps(&events, &june_10());

    assert_eq!(spans(&gaps), vec![span("00:00", "23:59", 1439 * 60)]);
}

#[test]
fn overnight_daily_event_occupies_both_evening_and_morning() {
    let events = vec![daily("sleep", "23:00", "01:00")];
    let window = DateWindow::range(date("2024-06-10"), date("2024-06-12")).unwrap();

    let gaps = find_all_gaps(&events, &window);

    assert_eq!(gaps.len(), 3);
    for gap in &gaps {
        assert_eq!(gap.start_clock(), "01:00");
        assert_eq!(gap.end_clock(), "23:00");
        assert_eq!(gap.duration_seconds, 22 * 3600);
    }
}

#[test]
fn compute_gaps_only_sees_supplied_intervals() {
    let events = vec![daily("sleep", "23:00", "01:00")];
    let window = DateWindow::range(date("2024-06-10"), date("2024-06-11")).unwrap();
    let occupied = expand(&events, &window);

    let gaps = compute_gaps(&occupied, &window);

    // Nothing was expanded for 2024-06-09, so the first morning is free.
    assert_eq!(gaps[0].start_clock(), "00:00");
    assert_eq!(gaps[0].end_clock(), "23:00");
    assert_eq!(gaps[1].start_clock(), "01:00");
}

#[test]
fn previous_day_interval_spills_into_target_date() {
    let occupied = vec![occupied("2024-06-09", "22:00", "2024-06-10", "06:00")];

    let gaps = find_gaps_for_date(&occupied, date("2024-06-10"));

    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].start_clock(), "06:00");
    assert_eq!(gaps[0].end_clock(), "24:00");
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

#[test]
fn window_gaps_are_concatenated_in_date_order() {
    let events = vec![
        one_off("b", "2024-06-12", "12:00", "13:00"),
        one_off("a", "2024-06-10", "09:00", "10:00"),
        one_off("a2", "2024-06-10", "14:00", "15:00"),
    ];
    let window = DateWindow::range(date("2024-06-10"), date("2024-06-12")).unwrap();

    let gaps = find_all_gaps(&events, &window);

    let summary: Vec<(NaiveDate, String)> = gaps.iter().map(|g| (g.date, g.start_clock())).collect();
    assert_eq!(
        summary,
        vec![
            (date("2024-06-10"), "00:00".to_string()),
            (date("2024-06-10"), "10:00".to_string()),
            (date("2024-06-10"), "15:00".to_string()),
            (date("2024-06-11"), "00:00".to_string()),
            (date("2024-06-12"), "00:00".to_string()),
            (date("2024-06-12"), "13:00".to_string()),
        ]
    );
}

#[test]
fn month_window_has_a_gap_per_free_day() {
    let window = DateWindow::month(2024, 6).unwrap();
    let gaps = find_all_gaps(&[], &window);
    assert_eq!(gaps.len(), 30);
}

#[test]
fn empty_window_produces_no_gaps() {
    let events = vec![one_off("a", "2024-06-10", "09:00", "10:00")];
    assert!(find_all_gaps(&events, &DateWindow::default()).is_empty());
}

#[test]
fn find_first_gap_with_minimum_duration() {
    let events = vec![
        one_off("a", "2024-06-10", "00:00", "08:00"),
        one_off("b", "2024-06-10", "08:30", "20:00"),
    ];

    let gap = find_first_gap(&events, &june_10(), 60).expect("evening gap");

    assert_eq!(gap.start_clock(), "20:00");
    assert_eq!(gap.duration_minutes(), 240);
    assert!(find_first_gap(&events, &june_10(), 300).is_none());
}

#[test]
fn find_first_gap_honours_merge_tolerance() {
    let events = vec![
        one_off("a", "2024-06-10", "00:00", "08:00"),
        one_off("b", "2024-06-10", "08:30", "20:00"),
    ];

    let default_first = find_first_gap(&events, &june_10(), 30).expect("morning gap");
    assert_eq!(default_first.start_clock(), "08:00");

    let config = GapConfig::default().with_merge_tolerance(30);
    let merged_first =
        find_first_gap_with_config(&events, &june_10(), 30, &config).expect("evening gap");
    assert_eq!(merged_first.start_clock(), "20:00");
}

// ---------------------------------------------------------------------------
// Configuration and blocks
// ---------------------------------------------------------------------------

#[test]
fn larger_minimum_gap_filters_more() {
    let config = GapConfig::default().with_min_gap(60);
    let occupied = vec![
        occupied("2024-06-10", "09:00", "2024-06-10", "10:00"),
        occupied("2024-06-10", "10:30", "2024-06-10", "23:30"),
    ];

    let gaps = find_gaps_for_date_with_config(&occupied, date("2024-06-10"), &config);

    assert_eq!(spans(&gaps), vec![span("00:00", "09:00", 32_400)]);
}

#[test]
fn occupied_blocks_are_exposed_for_rendering() {
    let occupied = vec![
        occupied("2024-06-10", "09:00", "2024-06-10", "10:00"),
        occupied("2024-06-10", "10:05", "2024-06-10", "11:00"),
        occupied("2024-06-10", "14:00", "2024-06-10", "15:00"),
    ];

    let blocks = occupied_blocks_for_date(&occupied, date("2024-06-10"), &GapConfig::default());

    assert_eq!(
        blocks,
        vec![Block { start: 540, end: 660 }, Block { start: 840, end: 900 }]
    );
}
