//! Audit log of VM operations.
//!
//! When `events_log` is configured, every operation appends one event in
//! NDJSON format (one JSON object per line).
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: The operation performed (create, start, stop, delete)
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `vm`: The VM name the operation targeted
//! - `details`: Project, zone, status and message of the outcome
//!
//! # Usage
//!
//! ```no_run
//! use gcevm::events::{Event, append_event};
//! use gcevm::request::OperationKind;
//! use serde_json::json;
//! use std::path::Path;
//!
//! let event = Event::new(OperationKind::Start, "vm1")
//!     .with_details(json!({"zone": "us-central1-a", "status": "success"}));
//! append_event(Path::new("events.ndjson"), &event)?;
//! # Ok::<(), gcevm::error::GcevmError>(())
//! ```

use crate::error::{GcevmError, Result};
use crate::request::OperationKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The operation that was performed.
    pub action: OperationKind,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// The VM the operation targeted.
    pub vm: String,

    /// Freeform details object.
    pub details: Value,
}

impl Event {
    /// Create a new event for an operation on `vm`.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: OperationKind, vm: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            vm: vm.into(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| GcevmError::Internal(format!("failed to serialize event to JSON: {}", e)))
    }
}

/// Get the actor string for event metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the log at `path`.
///
/// The parent directory and the file are created if missing. Each append
/// writes exactly one line with a trailing newline.
pub fn append_event(path: &Path, event: &Event) -> Result<()> {
    let json_line = event.to_ndjson_line()?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty())
        && !dir.exists()
    {
        fs::create_dir_all(dir).map_err(|e| {
            GcevmError::UserError(format!(
                "failed to create events directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            GcevmError::UserError(format!(
                "failed to open events file '{}': {}",
                path.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        GcevmError::UserError(format!(
            "failed to write event to '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}
