//! Normalized result record returned by every VM operation.
//!
//! Serializes to the shape agent runtimes expect from a tool call:
//!
//! ```json
//! {"status": "success", "result": "Successfully started VM 'vm1' in zone 'us-central1-a'."}
//! {"status": "error", "kind": "tool_failed", "error_message": "Failed to start VM 'vm1': ...", "stderr": "..."}
//! ```

use crate::error::{GcevmError, Result};
use crate::exit_codes;
use serde::{Deserialize, Serialize};

/// Category of an operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request rejected before any process was started.
    Validation,
    /// Provisioning tool exceeded its timeout and was killed.
    Timeout,
    /// Provisioning tool binary is not installed or not in PATH.
    ToolNotFound,
    /// Provisioning tool exited non-zero.
    ToolFailed,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Exit code the CLI reports for an outcome of this kind.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Validation => exit_codes::USER_ERROR,
            ErrorKind::Timeout => exit_codes::TIMEOUT,
            ErrorKind::ToolNotFound => exit_codes::TOOL_NOT_FOUND,
            ErrorKind::ToolFailed => exit_codes::TOOL_FAILURE,
            ErrorKind::Internal => exit_codes::INTERNAL_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::ToolNotFound => write!(f, "tool_not_found"),
            ErrorKind::ToolFailed => write!(f, "tool_failed"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

/// Result of a single VM operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        #[serde(rename = "result")]
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stdout: Option<String>,
    },
    Error {
        kind: ErrorKind,
        #[serde(rename = "error_message")]
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stderr: Option<String>,
    },
}

impl Outcome {
    /// Build a success outcome. Stdout is trimmed and dropped if empty.
    pub fn success(message: impl Into<String>, stdout: &str) -> Self {
        Outcome::Success {
            message: message.into(),
            stdout: non_empty_trimmed(stdout),
        }
    }

    /// Build an error outcome without captured output.
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Outcome::Error {
            kind,
            message: message.into(),
            stderr: None,
        }
    }

    /// Shorthand for a validation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::error(ErrorKind::Validation, message)
    }

    /// Attach captured stderr (trimmed, dropped if empty) to an error outcome.
    ///
    /// No-op on success outcomes.
    pub fn with_stderr(self, stderr: &str) -> Self {
        match self {
            Outcome::Error { kind, message, .. } => Outcome::Error {
                kind,
                message,
                stderr: non_empty_trimmed(stderr),
            },
            success => success,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Human-readable message for either variant.
    pub fn message(&self) -> &str {
        match self {
            Outcome::Success { message, .. } | Outcome::Error { message, .. } => message,
        }
    }

    /// Error kind, if this is an error outcome.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Error { kind, .. } => Some(*kind),
        }
    }

    /// Status string as it appears in the serialized record.
    pub fn status(&self) -> &'static str {
        if self.is_success() { "success" } else { "error" }
    }

    /// Serialize to a pretty-printed JSON object.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GcevmError::Internal(format!("failed to serialize outcome: {}", e)))
    }
}

fn non_empty_trimmed(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
