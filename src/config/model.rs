//! Config struct definition and default implementation.

use crate::request::CreateOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default provisioning tool command line.
pub const DEFAULT_GCLOUD_COMMAND: &str = "gcloud";

/// Default timeout for `create`, in seconds.
pub const DEFAULT_CREATE_TIMEOUT_SECONDS: u64 = 180;

/// Default timeout for `start`, `stop` and `delete`, in seconds.
pub const DEFAULT_LIFECYCLE_TIMEOUT_SECONDS: u64 = 60;

/// Configuration for gcevm.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provisioning tool command line, split with shell-words rules into the
    /// program and any leading arguments (e.g. `docker run --rm sdk gcloud`).
    #[serde(default = "default_gcloud_command")]
    pub gcloud_command: String,

    #[serde(default = "default_create_timeout_seconds")]
    pub create_timeout_seconds: u64,

    #[serde(default = "default_lifecycle_timeout_seconds")]
    pub lifecycle_timeout_seconds: u64,

    /// Extra environment variables for the provisioning tool.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    /// NDJSON audit log path. Disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_log: Option<PathBuf>,

    /// Creation parameters used when a request does not override them.
    #[serde(default)]
    pub create_defaults: CreateOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gcloud_command: default_gcloud_command(),
            create_timeout_seconds: default_create_timeout_seconds(),
            lifecycle_timeout_seconds: default_lifecycle_timeout_seconds(),
            environment: BTreeMap::new(),
            events_log: None,
            create_defaults: CreateOptions::default(),
        }
    }
}

fn default_gcloud_command() -> String {
    DEFAULT_GCLOUD_COMMAND.to_string()
}

fn default_create_timeout_seconds() -> u64 {
    DEFAULT_CREATE_TIMEOUT_SECONDS
}

fn default_lifecycle_timeout_seconds() -> u64 {
    DEFAULT_LIFECYCLE_TIMEOUT_SECONDS
}
