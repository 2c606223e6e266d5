//! Tests for config functionality.

use crate::config::{CONFIG_ENV_VAR, Config};
use serial_test::serial;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.gcloud_command, "gcloud");
    assert_eq!(config.create_timeout_seconds, 180);
    assert_eq!(config.lifecycle_timeout_seconds, 60);
    assert!(config.environment.is_empty());
    assert!(config.events_log.is_none());
    assert_eq!(config.create_defaults.network, "test");
    assert_eq!(config.create_defaults.subnetwork, "test1");
    assert_eq!(config.create_defaults.machine_type, "n1-standard-1");
    assert_eq!(config.create_defaults.image_family, "debian-11");
    assert_eq!(config.create_defaults.image_project, "debian-cloud");
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
lifecycle_timeout_seconds: 30
create_defaults:
  subnetwork: ""
  network: default
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.lifecycle_timeout_seconds, 30);
    assert_eq!(config.lifecycle_timeout(), Duration::from_secs(30));
    assert_eq!(config.create_defaults.network, "default");
    assert_eq!(config.create_defaults.subnetwork, "");

    // Unspecified values should use defaults
    assert_eq!(config.create_timeout_seconds, 180);
    assert_eq!(config.create_defaults.machine_type, "n1-standard-1");
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
gcloud_command: "docker run --rm 'google/cloud-sdk' gcloud"
create_timeout_seconds: 300
lifecycle_timeout_seconds: 90
environment:
  CLOUDSDK_CORE_DISABLE_PROMPTS: "1"
events_log: /var/log/gcevm/events.ndjson
create_defaults:
  network: prod
  subnetwork: prod-subnet
  machine_type: e2-medium
  image_family: debian-12
  image_project: debian-cloud
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.create_timeout_seconds, 300);
    assert_eq!(config.lifecycle_timeout_seconds, 90);
    assert_eq!(
        config.environment.get("CLOUDSDK_CORE_DISABLE_PROMPTS"),
        Some(&"1".to_string())
    );
    assert_eq!(
        config.events_log,
        Some(PathBuf::from("/var/log/gcevm/events.ndjson"))
    );
    assert_eq!(config.create_defaults.machine_type, "e2-medium");

    let (program, prefix) = config.tool_command().unwrap();
    assert_eq!(program, "docker");
    assert_eq!(prefix, vec!["run", "--rm", "google/cloud-sdk", "gcloud"]);
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
create_timeout_seconds: 200
future_setting: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.create_timeout_seconds, 200);
}

#[test]
fn test_zero_timeout_rejected() {
    let err = Config::from_yaml("create_timeout_seconds: 0").unwrap_err();
    assert!(err.to_string().contains("create_timeout_seconds"));

    let err = Config::from_yaml("lifecycle_timeout_seconds: 0").unwrap_err();
    assert!(err.to_string().contains("lifecycle_timeout_seconds"));
}

#[test]
fn test_empty_gcloud_command_rejected() {
    let err = Config::from_yaml("gcloud_command: \"  \"").unwrap_err();
    assert!(err.to_string().contains("must not be empty"));
}

#[test]
fn test_unbalanced_quotes_rejected() {
    let err = Config::from_yaml("gcloud_command: \"gcloud 'oops\"").unwrap_err();
    assert!(err.to_string().contains("cannot parse gcloud_command"));
}

#[test]
fn test_invalid_yaml_rejected() {
    let err = Config::from_yaml("create_timeout_seconds: [1, 2").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_yaml_roundtrip_keeps_settings() {
    let mut config = Config::default();
    config.create_timeout_seconds = 240;
    config.events_log = Some(PathBuf::from("events.ndjson"));

    let reparsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(reparsed, config);
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::load(temp_dir.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
#[serial]
fn test_resolve_prefers_explicit_path() {
    let temp_dir = TempDir::new().unwrap();
    let explicit = temp_dir.path().join("explicit.yaml");
    let from_env = temp_dir.path().join("env.yaml");
    std::fs::write(&explicit, "create_timeout_seconds: 11\n").unwrap();
    std::fs::write(&from_env, "create_timeout_seconds: 22\n").unwrap();

    // SAFETY: serialized with every other test touching the environment.
    unsafe { std::env::set_var(CONFIG_ENV_VAR, &from_env) };
    let config = Config::resolve(Some(explicit.as_path()));
    unsafe { std::env::remove_var(CONFIG_ENV_VAR) };

    assert_eq!(config.unwrap().create_timeout_seconds, 11);
}

#[test]
#[serial]
fn test_resolve_uses_env_var() {
    let temp_dir = TempDir::new().unwrap();
    let from_env = temp_dir.path().join("env.yaml");
    std::fs::write(&from_env, "lifecycle_timeout_seconds: 5\n").unwrap();

    // SAFETY: serialized with every other test touching the environment.
    unsafe { std::env::set_var(CONFIG_ENV_VAR, &from_env) };
    let config = Config::resolve(None);
    unsafe { std::env::remove_var(CONFIG_ENV_VAR) };

    assert_eq!(config.unwrap().lifecycle_timeout_seconds, 5);
}

#[test]
#[serial]
fn test_resolve_falls_back_to_defaults() {
    // SAFETY: serialized with every other test touching the environment.
    unsafe { std::env::remove_var(CONFIG_ENV_VAR) };

    let config = Config::resolve(None).unwrap();
    assert_eq!(config, Config::default());
}
