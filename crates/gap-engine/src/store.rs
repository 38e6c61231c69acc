//! Event persistence.
//!
//! The gap engine itself only ever sees a snapshot of events. This module is
//! the collaborator that owns them: a small CRUD surface over a backend that
//! can load and save the whole list. Ids are UUID v4 strings assigned on
//! creation and never reused.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{GapError, Result};
use crate::event::{validate_draft, Event, EventDraft, EventFilter, EventPatch};

/// A store holding the full list of events.
///
/// Implementors provide whole-list load and save; the CRUD operations are
/// built on top of them.
pub trait EventStore {
    fn load_all(&self) -> Result<Vec<Event>>;

    fn save_all(&self, events: &[Event]) -> Result<()>;

    /// Validate and persist a new event, assigning it a fresh id.
    fn add(&self, draft: EventDraft) -> Result<Event> {
        let errors = validate_draft(&draft);
        if !errors.is_empty() {
            return Err(GapError::Validation(errors));
        }
        let mut events = self.load_all()?;
        let event = Event::from_draft(new_id(), draft);
        events.push(event.clone());
        self.save_all(&events)?;
        info!(event_id = %event.id, "added event");
        Ok(event)
    }

    /// Apply `patch` to the event with `id`. The merged event must still be valid.
    fn update(&self, id: &str, patch: &EventPatch) -> Result<Event> {
        let mut events = self.load_all()?;
        let slot = events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or_else(|| GapError::NotFound(id.to_string()))?;

        let updated = slot.apply(patch);
        let errors = validate_draft(&updated.to_draft());
        if !errors.is_empty() {
            return Err(GapError::Validation(errors));
        }
        *slot = updated.clone();
        self.save_all(&events)?;
        info!(event_id = %id, "updated event");
        Ok(updated)
    }

    fn remove(&self, id: &str) -> Result<()> {
        let events = self.load_all()?;
        let before = events.len();
        let remaining: Vec<Event> = events.into_iter().filter(|event| event.id != id).collect();
        if remaining.len() == before {
            return Err(GapError::NotFound(id.to_string()));
        }
        self.save_all(&remaining)?;
        info!(event_id = %id, "removed event");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.load_all()?.into_iter().find(|event| event.id == id))
    }

    fn filter(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|event| filter.matches(event))
            .collect())
    }

    /// All events as a pretty-printed JSON array.
    fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.load_all()?)?)
    }

    /// Replace the store contents with the events in `json`, which must be a
    /// JSON array. Events without an id, or repeating an id already seen
    /// earlier in the array, are given a fresh one.
    fn import_json(&self, json: &str) -> Result<Vec<Event>> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_array() {
            return Err(GapError::Import("expected a JSON array of events".to_string()));
        }
        let events: Vec<Event> = serde_json::from_value(value)?;
        let mut seen = HashSet::new();
        let events: Vec<Event> = events
            .into_iter()
            .map(|mut event| {
                if event.id.trim().is_empty() || seen.contains(&event.id) {
                    let old = std::mem::replace(&mut event.id, new_id());
                    if !old.trim().is_empty() {
                        debug!(old_id = %old, new_id = %event.id, "reassigned duplicate id");
                    }
                }
                seen.insert(event.id.clone());
                event
            })
            .collect();
        self.save_all(&events)?;
        info!(count = events.len(), "imported events");
        Ok(events)
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Events stored as a single JSON array in one file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventStore for JsonFileStore {
    /// A missing file reads as an empty store.
    fn load_all(&self) -> Result<Vec<Event>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let events: Vec<Event> = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), count = events.len(), "loaded events");
        Ok(events)
    }

    /// Writes to a sibling temp file, then renames it over the target.
    fn save_all(&self, events: &[Event]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(events)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = events.len(), "saved events");
        Ok(())
    }
}

/// Events held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }
}

impl EventStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Event>> {
        let events = self
            .events
            .read()
            .map_err(|_| GapError::Io(std::io::Error::other("event store lock poisoned")))?;
        Ok(events.clone())
    }

    fn save_all(&self, events: &[Event]) -> Result<()> {
        let mut guard = self
            .events
            .write()
            .map_err(|_| GapError::Io(std::io::Error::other("event store lock poisoned")))?;
        *guard = events.to_vec();
        Ok(())
    }
}
