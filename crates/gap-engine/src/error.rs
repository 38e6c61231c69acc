//! Error types for gap-engine operations.
//!
//! The expansion and gap computations are total over well-formed events and
//! never fail. Errors only come from the edges: parsing user-supplied strings,
//! validating event drafts, and reading or writing the event store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GapError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    /// One message per failed validation rule.
    #[error("Invalid event: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GapError>;
