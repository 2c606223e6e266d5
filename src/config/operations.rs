//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{GcevmError, Result};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "GCEVM_CONFIG";

/// Config file picked up from the current directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "gcevm.yaml";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the config file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(GcevmError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            GcevmError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Locate and load the effective config.
    ///
    /// Lookup order: `explicit` path, `$GCEVM_CONFIG`, `./gcevm.yaml`, then
    /// built-in defaults. An explicitly named file that is missing is an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return Self::load(path);
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load(local);
        }

        Ok(Self::default())
    }

    /// Parse config from a YAML string.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| GcevmError::UserError(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GcevmError::Internal(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - both timeouts must be positive
    /// - `gcloud_command` must parse into at least one word
    pub fn validate(&self) -> Result<()> {
        if self.create_timeout_seconds == 0 {
            return Err(GcevmError::UserError(
                "config validation failed: create_timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        if self.lifecycle_timeout_seconds == 0 {
            return Err(GcevmError::UserError(
                "config validation failed: lifecycle_timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        self.tool_command()?;
        Ok(())
    }

    /// Split `gcloud_command` into the program and its leading arguments.
    pub fn tool_command(&self) -> Result<(String, Vec<String>)> {
        let mut words = shell_words::split(&self.gcloud_command).map_err(|e| {
            GcevmError::UserError(format!(
                "config validation failed: cannot parse gcloud_command '{}': {}\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                self.gcloud_command, e
            ))
        })?;

        if words.is_empty() {
            return Err(GcevmError::UserError(
                "config validation failed: gcloud_command must not be empty".to_string(),
            ));
        }

        let program = words.remove(0);
        Ok((program, words))
    }

    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_seconds)
    }

    pub fn lifecycle_timeout(&self) -> Duration {
        Duration::from_secs(self.lifecycle_timeout_seconds)
    }
}
