//! Agent tool surface.
//!
//! Exposes the four operations the way a conversational agent runtime
//! consumes them: a manifest describing each tool and its parameters, a
//! JSON tool-call entry point, and one plain function per tool taking only
//! string parameters.

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::GcevmError;
use crate::outcome::{ErrorKind, Outcome};
use crate::request::{CreateOptions, CreateOverrides, OperationKind};
use crate::runner::ProcessRunner;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const AGENT_NAME: &str = "gcp_vm_manager";

pub const AGENT_DESCRIPTION: &str =
    "An agent that can manage Google Cloud Compute Engine virtual machines.";

pub const AGENT_INSTRUCTION: &str = "You can use your tools to manage Google Cloud virtual \
machines. You can create, start, stop, and delete VMs. To do this, you will need the Project ID, \
the name of the VM, and its zone. For creating a VM, you might also need the machine type and \
image information. Ask the user for any missing information.";

/// One callable tool per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    CreateGcpVm,
    StartGcpVm,
    StopGcpVm,
    DeleteGcpVm,
}

impl Tool {
    pub const ALL: [Tool; 4] = [
        Tool::CreateGcpVm,
        Tool::StartGcpVm,
        Tool::StopGcpVm,
        Tool::DeleteGcpVm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::CreateGcpVm => "create_gcp_vm",
            Tool::StartGcpVm => "start_gcp_vm",
            Tool::StopGcpVm => "stop_gcp_vm",
            Tool::DeleteGcpVm => "delete_gcp_vm",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn kind(self) -> OperationKind {
        match self {
            Tool::CreateGcpVm => OperationKind::Create,
            Tool::StartGcpVm => OperationKind::Start,
            Tool::StopGcpVm => OperationKind::Stop,
            Tool::DeleteGcpVm => OperationKind::Delete,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Tool::CreateGcpVm => {
                "Creates a new Google Compute Engine VM instance. The subnetwork, when given, \
                 is used instead of the network."
            }
            Tool::StartGcpVm => "Starts a Google Cloud Compute Engine VM instance.",
            Tool::StopGcpVm => "Stops a Google Cloud Compute Engine VM instance.",
            Tool::DeleteGcpVm => "Deletes a Google Cloud Compute Engine VM instance.",
        }
    }

    fn parameters(self, defaults: &CreateOptions) -> Vec<ParamSpec> {
        let mut params = vec![
            ParamSpec::required("project_id", "The Google Cloud Project ID."),
            ParamSpec::required("vm_name", "The name of the VM instance."),
            ParamSpec::required("zone", "The Google Cloud zone of the VM."),
        ];

        if self == Tool::CreateGcpVm {
            params.extend([
                ParamSpec::optional(
                    "network",
                    "Network to attach the VM to. Ignored if subnetwork is specified.",
                    &defaults.network,
                ),
                ParamSpec::optional(
                    "subnetwork",
                    "Subnetwork to attach the VM to. Pass an empty string to use the network.",
                    &defaults.subnetwork,
                ),
                ParamSpec::optional("machine_type", "Machine type of the VM.", &defaults.machine_type),
                ParamSpec::optional("image_family", "OS image family.", &defaults.image_family),
                ParamSpec::optional(
                    "image_project",
                    "Project the image belongs to.",
                    &defaults.image_project,
                ),
            ]);
        }

        params
    }
}

/// Description of everything an agent runtime needs to register the tools.
#[derive(Debug, Clone, Serialize)]
pub struct ToolManifest {
    pub name: &'static str,
    pub description: &'static str,
    pub instruction: &'static str,
    pub tools: Vec<ToolSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParamSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub param_type: &'static str,
    pub description: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParamSpec {
    fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            param_type: "string",
            description,
            required: true,
            default: None,
        }
    }

    fn optional(name: &'static str, description: &'static str, default: &str) -> Self {
        Self {
            name,
            param_type: "string",
            description,
            required: false,
            default: Some(default.to_string()),
        }
    }
}

/// Build the manifest, advertising `defaults` for the optional create parameters.
pub fn manifest(defaults: &CreateOptions) -> ToolManifest {
    ToolManifest {
        name: AGENT_NAME,
        description: AGENT_DESCRIPTION,
        instruction: AGENT_INSTRUCTION,
        tools: Tool::ALL
            .into_iter()
            .map(|tool| ToolSpec {
                name: tool.name(),
                description: tool.description(),
                parameters: tool.parameters(defaults),
            })
            .collect(),
    }
}

#[derive(Debug, Deserialize)]
struct LifecycleArgs {
    project_id: String,
    vm_name: String,
    zone: String,
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    project_id: String,
    vm_name: String,
    zone: String,
    #[serde(flatten)]
    overrides: CreateOverrides,
}

/// Perform one tool call with a JSON object of arguments.
///
/// Unknown tools and malformed arguments come back as validation outcomes.
pub fn call_tool<R: ProcessRunner>(dispatcher: &Dispatcher<R>, name: &str, args: &Value) -> Outcome {
    let Some(tool) = Tool::from_name(name) else {
        let available: Vec<_> = Tool::ALL.iter().map(|t| t.name()).collect();
        return Outcome::invalid(format!(
            "Unknown tool '{}'. Available tools: {}",
            name,
            available.join(", ")
        ));
    };

    let invalid_args =
        |e: serde_json::Error| Outcome::invalid(format!("Invalid arguments for '{}': {}", name, e));

    match tool.kind() {
        OperationKind::Create => match CreateArgs::deserialize(args) {
            Ok(a) => {
                let options = dispatcher.create_defaults().with_overrides(&a.overrides);
                dispatcher.create(&a.project_id, &a.zone, &a.vm_name, options)
            }
            Err(e) => invalid_args(e),
        },
        OperationKind::Start => match LifecycleArgs::deserialize(args) {
            Ok(a) => dispatcher.start(&a.project_id, &a.vm_name, &a.zone),
            Err(e) => invalid_args(e),
        },
        OperationKind::Stop => match LifecycleArgs::deserialize(args) {
            Ok(a) => dispatcher.stop(&a.project_id, &a.vm_name, &a.zone),
            Err(e) => invalid_args(e),
        },
        OperationKind::Delete => match LifecycleArgs::deserialize(args) {
            Ok(a) => dispatcher.delete(&a.project_id, &a.vm_name, &a.zone),
            Err(e) => invalid_args(e),
        },
    }
}

/// Run `f` against a dispatcher built from the effective config.
///
/// A missing or invalid config file is the caller's to fix and comes back as
/// a validation outcome.
fn with_default_dispatcher(f: impl FnOnce(&Dispatcher) -> Outcome) -> Outcome {
    match Config::resolve(None).and_then(|config| Dispatcher::from_config(&config)) {
        Ok(dispatcher) => f(&dispatcher),
        Err(e @ GcevmError::UserError(_)) => Outcome::invalid(e.to_string()),
        Err(e) => Outcome::error(
            ErrorKind::Internal,
            format!("An unexpected error occurred: {}", e),
        ),
    }
}

/// Creates a new VM. Empty `subnetwork` selects by `network`.
#[allow(clippy::too_many_arguments)]
pub fn create_gcp_vm(
    project_id: &str,
    zone: &str,
    vm_name: &str,
    network: &str,
    subnetwork: &str,
    machine_type: &str,
    image_family: &str,
    image_project: &str,
) -> Outcome {
    let options = CreateOptions {
        network: network.to_string(),
        subnetwork: subnetwork.to_string(),
        machine_type: machine_type.to_string(),
        image_family: image_family.to_string(),
        image_project: image_project.to_string(),
    };
    with_default_dispatcher(|d| d.create(project_id, zone, vm_name, options))
}

pub fn start_gcp_vm(project_id: &str, vm_name: &str, zone: &str) -> Outcome {
    with_default_dispatcher(|d| d.start(project_id, vm_name, zone))
}

pub fn stop_gcp_vm(project_id: &str, vm_name: &str, zone: &str) -> Outcome {
    with_default_dispatcher(|d| d.stop(project_id, vm_name, zone))
}

pub fn delete_gcp_vm(project_id: &str, vm_name: &str, zone: &str) -> Outcome {
    with_default_dispatcher(|d| d.delete(project_id, vm_name, zone))
}
