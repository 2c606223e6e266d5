//! Configuration model for gcevm.
//!
//! This module defines the Config struct that represents `gcevm.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.

mod model;
mod operations;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::Config;
pub use operations::{CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE};
