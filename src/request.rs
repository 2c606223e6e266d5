//! Operation requests and provisioning-tool argument construction.
//!
//! Every operation is turned into an argument list (never a shell string):
//!
//! ```text
//! compute instances create vm1 --project=proj1 --zone=us-central1-a \
//!     --machine-type=n1-standard-1 --image-family=debian-11 \
//!     --image-project=debian-cloud --quiet --subnet=test1
//! compute instances stop vm1 --project=proj1 --zone=us-central1-a --quiet
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

pub const DEFAULT_NETWORK: &str = "test";
pub const DEFAULT_SUBNETWORK: &str = "test1";
pub const DEFAULT_MACHINE_TYPE: &str = "n1-standard-1";
pub const DEFAULT_IMAGE_FAMILY: &str = "debian-11";
pub const DEFAULT_IMAGE_PROJECT: &str = "debian-cloud";

/// Compute Engine instance naming rule (RFC1035 label, max 63 chars).
static VM_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]([-a-z0-9]{0,61}[a-z0-9])?$").expect("Invalid VM name regex")
});

/// The four supported lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Start,
    Stop,
    Delete,
}

impl OperationKind {
    /// Subcommand under `compute instances`, also the verb used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Start => "start",
            OperationKind::Stop => "stop",
            OperationKind::Delete => "delete",
        }
    }

    /// Past tense for success messages.
    pub fn past_tense(self) -> &'static str {
        match self {
            OperationKind::Create => "created",
            OperationKind::Start => "started",
            OperationKind::Stop => "stopped",
            OperationKind::Delete => "deleted",
        }
    }

    /// Whether the operation needs `--quiet` to suppress interactive prompts.
    fn needs_quiet(self) -> bool {
        !matches!(self, OperationKind::Start)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creation parameters beyond project/zone/name.
///
/// Empty strings mean "not specified" for `network` and `subnetwork`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOptions {
    pub network: String,
    pub subnetwork: String,
    pub machine_type: String,
    pub image_family: String,
    pub image_project: String,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            subnetwork: DEFAULT_SUBNETWORK.to_string(),
            machine_type: DEFAULT_MACHINE_TYPE.to_string(),
            image_family: DEFAULT_IMAGE_FAMILY.to_string(),
            image_project: DEFAULT_IMAGE_PROJECT.to_string(),
        }
    }
}

impl CreateOptions {
    /// Pick the network attachment: a subnetwork wins over a network.
    pub fn network_selector(&self) -> Option<NetworkSelector> {
        if !self.subnetwork.is_empty() {
            Some(NetworkSelector::Subnet(self.subnetwork.clone()))
        } else if !self.network.is_empty() {
            Some(NetworkSelector::Network(self.network.clone()))
        } else {
            None
        }
    }

    /// These options with every field given in `overrides` replaced.
    pub fn with_overrides(&self, overrides: &CreateOverrides) -> CreateOptions {
        let pick = |given: &Option<String>, default: &String| {
            given.clone().unwrap_or_else(|| default.clone())
        };

        CreateOptions {
            network: pick(&overrides.network, &self.network),
            subnetwork: pick(&overrides.subnetwork, &self.subnetwork),
            machine_type: pick(&overrides.machine_type, &self.machine_type),
            image_family: pick(&overrides.image_family, &self.image_family),
            image_project: pick(&overrides.image_project, &self.image_project),
        }
    }
}

/// Per-call creation parameters; `None` keeps the configured default.
///
/// `Some("")` for `subnetwork` is a real value: it selects by network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateOverrides {
    pub network: Option<String>,
    pub subnetwork: Option<String>,
    pub machine_type: Option<String>,
    pub image_family: Option<String>,
    pub image_project: Option<String>,
}

/// How a new instance is attached to the VPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkSelector {
    Subnet(String),
    Network(String),
}

impl NetworkSelector {
    fn flag(&self) -> String {
        match self {
            NetworkSelector::Subnet(s) => format!("--subnet={}", s),
            NetworkSelector::Network(n) => format!("--network={}", n),
        }
    }
}

impl std::fmt::Display for NetworkSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkSelector::Subnet(s) => write!(f, "subnet '{}'", s),
            NetworkSelector::Network(n) => write!(f, "network '{}'", n),
        }
    }
}

/// Reasons a request is rejected before any process is started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("{0} must be specified.")]
    MissingField(&'static str),

    #[error("{field} must not start with '-' (got '{value}').")]
    FlagLike { field: &'static str, value: String },

    #[error(
        "Invalid VM name '{0}': names must start with a lowercase letter, contain only \
         lowercase letters, digits and hyphens, not end with a hyphen, and be at most 63 characters."
    )]
    InvalidName(String),

    #[error("Network or Subnetwork must be specified.")]
    NoNetwork,
}

/// A single request against one VM. Built per call and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub project: String,
    pub zone: String,
    pub name: String,
    /// Present only for [`OperationKind::Create`].
    pub create: Option<CreateOptions>,
}

/// Arguments ready to hand to the provisioning tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedArgs {
    pub args: Vec<String>,
    /// The network attachment chosen for a create, used in the success message.
    pub network: Option<NetworkSelector>,
}

impl OperationRequest {
    pub fn create(
        project: impl Into<String>,
        zone: impl Into<String>,
        name: impl Into<String>,
        options: CreateOptions,
    ) -> Self {
        Self {
            kind: OperationKind::Create,
            project: project.into(),
            zone: zone.into(),
            name: name.into(),
            create: Some(options),
        }
    }

    /// A start, stop or delete request.
    ///
    /// Passing [`OperationKind::Create`] yields a create with default options.
    pub fn lifecycle(
        kind: OperationKind,
        project: impl Into<String>,
        zone: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            project: project.into(),
            zone: zone.into(),
            name: name.into(),
            create: matches!(kind, OperationKind::Create).then(CreateOptions::default),
        }
    }

    /// Check the identifying fields.
    pub fn validate(&self) -> Result<(), RequestError> {
        for (field, value) in [
            ("Project ID", &self.project),
            ("Zone", &self.zone),
            ("VM name", &self.name),
        ] {
            if value.is_empty() {
                return Err(RequestError::MissingField(field));
            }
            if value.starts_with('-') {
                return Err(RequestError::FlagLike {
                    field,
                    value: value.clone(),
                });
            }
        }

        if !VM_NAME_REGEX.is_match(&self.name) {
            return Err(RequestError::InvalidName(self.name.clone()));
        }

        Ok(())
    }

    /// Validate and build the argument list (without the program itself).
    pub fn build_args(&self) -> Result<PreparedArgs, RequestError> {
        self.validate()?;

        let mut args = vec![
            "compute".to_string(),
            "instances".to_string(),
            self.kind.as_str().to_string(),
            self.name.clone(),
            format!("--project={}", self.project),
            format!("--zone={}", self.zone),
        ];

        let mut network = None;
        if self.kind == OperationKind::Create {
            let default_options = CreateOptions::default();
            let options = self.create.as_ref().unwrap_or(&default_options);
            let selector = options.network_selector().ok_or(RequestError::NoNetwork)?;

            args.push(format!("--machine-type={}", options.machine_type));
            args.push(format!("--image-family={}", options.image_family));
            args.push(format!("--image-project={}", options.image_project));
            args.push("--quiet".to_string());
            args.push(selector.flag());
            network = Some(selector);
        } else if self.kind.needs_quiet() {
            args.push("--quiet".to_string());
        }

        Ok(PreparedArgs { args, network })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_with(network: &str, subnetwork: &str) -> OperationRequest {
        OperationRequest::create(
            "proj1",
            "us-central1-a",
            "vm1",
            CreateOptions {
                network: network.to_string(),
                subnetwork: subnetwork.to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_create_default_args() {
        let req = OperationRequest::create("proj1", "us-central1-a", "vm1", CreateOptions::default());
        let prepared = req.build_args().unwrap();

        assert_eq!(
            prepared.args,
            vec![
                "compute",
                "instances",
                "create",
                "vm1",
                "--project=proj1",
                "--zone=us-central1-a",
                "--machine-type=n1-standard-1",
                "--image-family=debian-11",
                "--image-project=debian-cloud",
                "--quiet",
                "--subnet=test1",
            ]
        );
        assert_eq!(
            prepared.network,
            Some(NetworkSelector::Subnet("test1".to_string()))
        );
    }

    #[test]
    fn test_subnetwork_wins_over_network() {
        let prepared = create_with("ignored-net", "prod-subnet").build_args().unwrap();

        assert!(prepared.args.contains(&"--subnet=prod-subnet".to_string()));
        assert!(!prepared.args.iter().any(|a| a.starts_with("--network")));
    }

    #[test]
    fn test_network_used_when_subnetwork_empty() {
        let prepared = create_with("legacy-net", "").build_args().unwrap();

        assert!(prepared.args.contains(&"--network=legacy-net".to_string()));
        assert!(!prepared.args.iter().any(|a| a.starts_with("--subnet")));
        assert_eq!(prepared.network.unwrap().to_string(), "network 'legacy-net'");
    }

    #[test]
    fn test_no_network_is_rejected() {
        let err = create_with("", "").build_args().unwrap_err();
        assert_eq!(err, RequestError::NoNetwork);
        assert_eq!(err.to_string(), "Network or Subnetwork must be specified.");
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let defaults = CreateOptions {
            machine_type: "e2-medium".to_string(),
            ..Default::default()
        };
        let options = defaults.with_overrides(&CreateOverrides {
            subnetwork: Some(String::new()),
            image_family: Some("debian-12".to_string()),
            ..Default::default()
        });

        assert_eq!(options.network, "test");
        assert_eq!(options.subnetwork, "");
        assert_eq!(options.machine_type, "e2-medium");
        assert_eq!(options.image_family, "debian-12");
        assert_eq!(options.image_project, "debian-cloud");
        assert_eq!(
            options.network_selector(),
            Some(NetworkSelector::Network("test".to_string()))
        );
    }

    #[test]
    fn test_lifecycle_args() {
        let start = OperationRequest::lifecycle(OperationKind::Start, "p", "z", "vm1");
        assert_eq!(
            start.build_args().unwrap().args,
            vec!["compute", "instances", "start", "vm1", "--project=p", "--zone=z"]
        );

        for kind in [OperationKind::Stop, OperationKind::Delete] {
            let req = OperationRequest::lifecycle(kind, "p", "z", "vm1");
            let prepared = req.build_args().unwrap();
            assert_eq!(prepared.args[2], kind.as_str());
            assert_eq!(prepared.args.last().unwrap(), "--quiet");
            assert!(prepared.network.is_none());
        }
    }

    #[test]
    fn test_lifecycle_create_uses_defaults() {
        let req = OperationRequest::lifecycle(OperationKind::Create, "p", "z", "vm1");
        assert_eq!(req.create, Some(CreateOptions::default()));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let req = OperationRequest::lifecycle(OperationKind::Start, "", "z", "vm1");
        assert_eq!(
            req.validate().unwrap_err(),
            RequestError::MissingField("Project ID")
        );

        let req = OperationRequest::lifecycle(OperationKind::Start, "p", "", "vm1");
        assert_eq!(req.validate().unwrap_err(), RequestError::MissingField("Zone"));

        let req = OperationRequest::lifecycle(OperationKind::Start, "p", "z", "");
        assert_eq!(req.validate().unwrap_err(), RequestError::MissingField("VM name"));
    }

    #[test]
    fn test_flag_like_values_rejected() {
        let req = OperationRequest::lifecycle(OperationKind::Delete, "--impersonate", "z", "vm1");
        assert!(matches!(
            req.validate().unwrap_err(),
            RequestError::FlagLike { field: "Project ID", .. }
        ));
    }

    #[test]
    fn test_shell_metacharacters_in_name_rejected() {
        let req = OperationRequest::lifecycle(OperationKind::Stop, "p", "z", "vm1; rm -rf /");
        assert!(matches!(
            req.validate().unwrap_err(),
            RequestError::InvalidName(_)
        ));
    }

    #[test]
    fn test_vm_name_rules() {
        let longest = "a".repeat(63);
        let too_long = "a".repeat(64);
        for ok in ["a", "vm1", "web-server-01", longest.as_str()] {
            let req = OperationRequest::lifecycle(OperationKind::Start, "p", "z", ok);
            assert!(req.validate().is_ok(), "{} should be valid", ok);
        }
        for bad in ["1vm", "VM1", "vm-", "vm_1", too_long.as_str()] {
            let req = OperationRequest::lifecycle(OperationKind::Start, "p", "z", bad);
            assert!(req.validate().is_err(), "{} should be invalid", bad);
        }
    }

    #[test]
    fn test_operation_kind_strings() {
        assert_eq!(OperationKind::Create.to_string(), "create");
        assert_eq!(OperationKind::Stop.past_tense(), "stopped");
        assert_eq!(OperationKind::Delete.past_tense(), "deleted");
    }
}
