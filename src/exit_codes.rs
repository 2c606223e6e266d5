//! Exit code constants for the gcevm CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad config, rejected request)
//! - 2: Provisioning tool exited non-zero
//! - 3: Provisioning tool not installed
//! - 4: Provisioning tool timed out
//! - 5: Internal error

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid config, or a request that failed validation.
pub const USER_ERROR: i32 = 1;

/// The provisioning tool ran and reported failure.
pub const TOOL_FAILURE: i32 = 2;

/// The provisioning tool binary could not be found.
pub const TOOL_NOT_FOUND: i32 = 3;

/// The provisioning tool was killed after exceeding its timeout.
pub const TIMEOUT: i32 = 4;

/// Anything else: spawn/IO failures, serialization errors.
pub const INTERNAL_ERROR: i32 = 5;
