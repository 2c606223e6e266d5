//! Error types for the gcevm CLI.
//!
//! Operation failures never surface here: the dispatcher turns them into an
//! error [`Outcome`](crate::outcome::Outcome). This type covers the CLI's own
//! failures (config, arguments, output).

use crate::exit_codes;
use thiserror::Error;

/// Main error type for gcevm.
#[derive(Error, Debug)]
pub enum GcevmError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// An operation completed with an error outcome.
    ///
    /// Carries the exit code derived from the outcome's error kind so `main`
    /// can report it without re-inspecting the outcome.
    #[error("{message}")]
    OperationFailed { message: String, exit_code: i32 },

    /// Internal failure unrelated to user input.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GcevmError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GcevmError::UserError(_) => exit_codes::USER_ERROR,
            GcevmError::OperationFailed { exit_code, .. } => *exit_code,
            GcevmError::Internal(_) => exit_codes::INTERNAL_ERROR,
        }
    }
}

/// Result type alias for gcevm operations.
pub type Result<T> = std::result::Result<T, GcevmError>;
