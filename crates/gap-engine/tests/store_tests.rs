//! Tests for the JSON file and in-memory event stores.

use gap_engine::error::GapError;
use gap_engine::{
    parse_clock, parse_date, EventDraft, EventFilter, EventPatch, EventStore, JsonFileStore,
    MemoryStore,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn draft(title: &str, day: &str, start: &str, end: &str) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        start_date: Some(parse_date(day).unwrap()),
        start_time: parse_clock(start).unwrap(),
        end_date: Some(parse_date(day).unwrap()),
        end_time: parse_clock(end).unwrap(),
        color: "#3b82f6".to_string(),
        is_daily: false,
        week_days: None,
        category: Some("work".to_string()),
        description: None,
    }
}

fn daily_draft(title: &str, start: &str, end: &str) -> EventDraft {
    EventDraft {
        is_daily: true,
        start_date: None,
        end_date: None,
        category: Some("health".to_string()),
        ..draft(title, "2024-01-01", start, end)
    }
}

// ── CRUD ────────────────────────────────────────────────────────────────────

#[test]
fn add_assigns_unique_ids() {
    let store = MemoryStore::new();

    let a = store.add(draft("a", "2024-06-10", "09:00", "10:00")).unwrap();
    let b = store.add(draft("b", "2024-06-10", "11:00", "12:00")).unwrap();

    assert!(!a.id.is_empty());
    assert_ne!(a.id, b.id);
    assert_eq!(store.load_all().unwrap().len(), 2);
}

#[test]
fn add_rejects_invalid_draft() {
    let store = MemoryStore::new();
    let mut bad = draft("  ", "2024-06-10", "09:00", "10:00");
    bad.end_date = None;

    match store.add(bad) {
        Err(GapError::Validation(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn update_applies_patch_and_keeps_id() {
    let store = MemoryStore::new();
    let event = store.add(draft("a", "2024-06-10", "09:00", "10:00")).unwrap();

    let patch = EventPatch {
        title: Some("renamed".to_string()),
        end_time: Some(parse_clock("11:30").unwrap()),
        ..EventPatch::default()
    };
    let updated = store.update(&event.id, &patch).unwrap();

    assert_eq!(updated.id, event.id);
    assert_eq!(updated.title, "renamed");
    assert_eq!(updated.start_time, event.start_time);
    assert_eq!(store.get(&event.id).unwrap(), Some(updated));
}

#[test]
fn update_unknown_id_is_not_found() {
    let store = MemoryStore::new();
    let result = store.update("missing", &EventPatch::default());
    assert!(matches!(result, Err(GapError::NotFound(id)) if id == "missing"));
}

#[test]
fn update_that_would_invalidate_event_is_rejected() {
    let store = MemoryStore::new();
    let event = store.add(draft("a", "2024-06-10", "09:00", "10:00")).unwrap();

    let patch = EventPatch {
        title: Some(String::new()),
        ..EventPatch::default()
    };

    assert!(matches!(store.update(&event.id, &patch), Err(GapError::Validation(_))));
    assert_eq!(store.get(&event.id).unwrap().unwrap().title, "a");
}

#[test]
fn remove_deletes_only_that_event() {
    let store = MemoryStore::new();
    let a = store.add(draft("a", "2024-06-10", "09:00", "10:00")).unwrap();
    let b = store.add(draft("b", "2024-06-10", "11:00", "12:00")).unwrap();

    store.remove(&a.id).unwrap();

    let remaining = store.load_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b.id);
    assert!(matches!(store.remove(&a.id), Err(GapError::NotFound(_))));
}

#[test]
fn filter_by_category_kind_and_dates() {
    let store = MemoryStore::new();
    store.add(draft("early", "2024-06-01", "09:00", "10:00")).unwrap();
    store.add(draft("late", "2024-06-20", "09:00", "10:00")).unwrap();
    store.add(daily_draft("gym", "07:00", "08:00")).unwrap();

    let daily = store
        .filter(&EventFilter {
            daily_only: Some(true),
            ..EventFilter::default()
        })
        .unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].title, "gym");

    let work = store
        .filter(&EventFilter {
            category: Some("work".to_string()),
            ..EventFilter::default()
        })
        .unwrap();
    assert_eq!(work.len(), 2);

    // Date bounds skip daily events rather than excluding them.
    let from_mid_june = store
        .filter(&EventFilter {
            date_from: Some(parse_date("2024-06-10").unwrap()),
            ..EventFilter::default()
        })
        .unwrap();
    let titles: Vec<&str> = from_mid_june.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["late", "gym"]);
}

// ── Import / export ─────────────────────────────────────────────────────────

#[test]
fn import_assigns_missing_ids_and_replaces_contents() {
    let store = MemoryStore::new();
    store.add(draft("old", "2024-06-01", "09:00", "10:00")).unwrap();

    let json = r##"[
        {"id": "keep-me", "title": "A", "startDate": "2024-06-10", "endDate": "2024-06-10",
         "startTime": "09:00", "endTime": "10:00", "color": "#fff", "isDaily": false},
        {"title": "B", "startTime": "07:00", "endTime": "08:00", "color": "#000", "isDaily": true}
    ]"##;
    let imported = store.import_json(json).unwrap();

    assert_eq!(imported.len(), 2);
    assert_eq!(imported[0].id, "keep-me");
    assert!(!imported[1].id.is_empty());
    assert_eq!(store.load_all().unwrap(), imported);
}

#[test]
fn import_gives_repeated_ids_fresh_ones() {
    let store = MemoryStore::new();
    let json = r#"[
        {"id": "dup", "title": "A", "startTime": "07:00", "endTime": "08:00", "isDaily": true},
        {"id": "dup", "title": "B", "startTime": "09:00", "endTime": "10:00", "isDaily": true},
        {"id": "dup", "title": "C", "startTime": "11:00", "endTime": "12:00", "isDaily": true}
    ]"#;

    let imported = store.import_json(json).unwrap();

    assert_eq!(imported[0].id, "dup");
    assert_ne!(imported[1].id, "dup");
    assert_ne!(imported[2].id, "dup");
    assert_ne!(imported[1].id, imported[2].id);

    store.remove("dup").unwrap();
    let titles: Vec<String> = store.load_all().unwrap().into_iter().map(|e| e.title).collect();
    assert_eq!(titles, vec!["B", "C"]);
}

#[test]
fn update_can_clear_weekday_limit() {
    let store = MemoryStore::new();
    let mut gym = daily_draft("gym", "07:00", "08:00");
    gym.week_days = Some(vec![1, 3, 5]);
    let event = store.add(gym).unwrap();

    let patch = EventPatch {
        week_days: Some(None),
        ..EventPatch::default()
    };
    let updated = store.update(&event.id, &patch).unwrap();

    assert_eq!(updated.week_days, None);
    assert_eq!(updated.category, Some("health".to_string()));
}

#[test]
fn import_rejects_non_array() {
    let store = MemoryStore::new();
    assert!(matches!(
        store.import_json(r#"{"title": "x"}"#),
        Err(GapError::Import(_))
    ));
    assert!(matches!(store.import_json("not json"), Err(GapError::Json(_))));
}

#[test]
fn export_then_import_round_trips() {
    let source = MemoryStore::new();
    source.add(draft("a", "2024-06-10", "22:00", "02:00")).unwrap();
    source.add(daily_draft("gym", "07:00", "08:00")).unwrap();

    let exported = source.export_json().unwrap();
    let target = MemoryStore::new();
    target.import_json(&exported).unwrap();

    assert_eq!(target.load_all().unwrap(), source.load_all().unwrap());
}

// ── JSON file store ─────────────────────────────────────────────────────────

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("events.json"));
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("events.json");

    let event = JsonFileStore::new(&path)
        .add(draft("a", "2024-06-10", "09:00", "10:00"))
        .unwrap();

    let reopened = JsonFileStore::new(&path);
    assert_eq!(reopened.load_all().unwrap(), vec![event]);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"startTime\": \"09:00\""));
    assert!(raw.contains("\"isDaily\": false"));
}

#[test]
fn corrupt_file_is_a_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.json");
    std::fs::write(&path, "[{").unwrap();

    assert!(matches!(JsonFileStore::new(&path).load_all(), Err(GapError::Json(_))));
}
