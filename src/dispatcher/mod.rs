//! The command dispatcher.
//!
//! Turns an [`OperationRequest`] into one provisioning-tool invocation and
//! normalizes whatever happens into an [`Outcome`]. Nothing is returned as a
//! Rust error: validation failures, timeouts, a missing binary and non-zero
//! exits all become error outcomes.
//!
//! There is no retry, no polling of the VM's provisioning state and no
//! idempotency check. Each call is one process execution.

use crate::config::Config;
use crate::error::Result;
use crate::events::{Event, append_event};
use crate::outcome::{ErrorKind, Outcome};
use crate::request::{CreateOptions, NetworkSelector, OperationKind, OperationRequest};
use crate::runner::{Invocation, ProcessOutput, ProcessRunner, RunError, SystemRunner};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};


/// Dispatches VM operations to the provisioning tool.
#[derive(Debug, Clone)]
pub struct Dispatcher<R = SystemRunner> {
    runner: R,
    program: String,
    base_args: Vec<String>,
    env: BTreeMap<String, String>,
    create_timeout: Duration,
    lifecycle_timeout: Duration,
    events_log: Option<PathBuf>,
    create_defaults: CreateOptions,
}

impl Dispatcher<SystemRunner> {
    /// Dispatcher that spawns real processes.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config, SystemRunner::default())
    }
}

impl<R: ProcessRunner> Dispatcher<R> {
    pub fn new(config: &Config, runner: R) -> Result<Self> {
        let (program, base_args) = config.tool_command()?;

        Ok(Self {
            runner,
            program,
            base_args,
            env: config.environment.clone(),
            create_timeout: config.create_timeout(),
            lifecycle_timeout: config.lifecycle_timeout(),
            events_log: config.events_log.clone(),
            create_defaults: config.create_defaults.clone(),
        })
    }

    /// Creation parameters to use where a caller gives none.
    pub fn create_defaults(&self) -> &CreateOptions {
        &self.create_defaults
    }

    /// Create a VM. Subnetwork takes precedence over network.
    pub fn create(&self, project: &str, zone: &str, name: &str, options: CreateOptions) -> Outcome {
        self.invoke(&OperationRequest::create(project, zone, name, options))
    }

    pub fn start(&self, project: &str, name: &str, zone: &str) -> Outcome {
        self.invoke(&OperationRequest::lifecycle(
            OperationKind::Start,
            project,
            zone,
            name,
        ))
    }

    pub fn stop(&self, project: &str, name: &str, zone: &str) -> Outcome {
        self.invoke(&OperationRequest::lifecycle(
            OperationKind::Stop,
            project,
            zone,
            name,
        ))
    }

    pub fn delete(&self, project: &str, name: &str, zone: &str) -> Outcome {
        self.invoke(&OperationRequest::lifecycle(
            OperationKind::Delete,
            project,
            zone,
            name,
        ))
    }

    /// Run any request and record it in the audit log.
    pub fn invoke(&self, request: &OperationRequest) -> Outcome {
        let outcome = self.execute(request);

        match &outcome {
            Outcome::Success { message, .. } => info!(vm = %request.name, "{}", message),
            Outcome::Error { kind, message, .. } => {
                info!(vm = %request.name, kind = %kind, "{}", message)
            }
        }

        self.record(request, &outcome);
        outcome
    }

    fn execute(&self, request: &OperationRequest) -> Outcome {
        let prepared = match request.build_args() {
            Ok(prepared) => prepared,
            Err(e) => return Outcome::invalid(e.to_string()),
        };

        let invocation = Invocation {
            program: self.program.clone(),
            args: self
                .base_args
                .iter()
                .cloned()
                .chain(prepared.args)
                .collect(),
            env: self.env.clone(),
        };
        let timeout = self.timeout_for(request.kind);

        info!(command = %invocation.display(), timeout_secs = timeout.as_secs(), "running provisioning tool");

        match self.runner.run(&invocation, timeout) {
            Ok(output) => {
                debug!(exit_code = ?output.exit_code, "provisioning tool exited");
                normalize_output(request, prepared.network.as_ref(), &output)
            }
            Err(RunError::Timeout { .. }) => Outcome::error(
                ErrorKind::Timeout,
                format!(
                    "Timeout occurred while trying to {} VM '{}'.",
                    request.kind, request.name
                ),
            ),
            Err(RunError::NotFound { program }) => Outcome::error(
                ErrorKind::ToolNotFound,
                format!(
                    "Error: '{}' command not found. Make sure Google Cloud SDK is installed and in your PATH.",
                    program
                ),
            ),
            Err(RunError::Io(e)) => Outcome::error(
                ErrorKind::Internal,
                format!("An unexpected error occurred: {}", e),
            ),
        }
    }

    fn timeout_for(&self, kind: OperationKind) -> Duration {
        match kind {
            OperationKind::Create => self.create_timeout,
            OperationKind::Start | OperationKind::Stop | OperationKind::Delete => {
                self.lifecycle_timeout
            }
        }
    }

    /// Append to the audit log. Failures are logged and otherwise ignored.
    fn record(&self, request: &OperationRequest, outcome: &Outcome) {
        let Some(path) = &self.events_log else {
            return;
        };

        let event = Event::new(request.kind, &request.name).with_details(json!({
            "project": request.project,
            "zone": request.zone,
            "status": outcome.status(),
            "kind": outcome.error_kind(),
            "message": outcome.message(),
        }));

        if let Err(e) = append_event(path, &event) {
            warn!(path = %path.display(), "failed to record event: {}", e);
        }
    }
}

fn normalize_output(
    request: &OperationRequest,
    network: Option<&NetworkSelector>,
    output: &ProcessOutput,
) -> Outcome {
    if output.is_success() {
        let mut message = format!(
            "Successfully {} VM '{}' in zone '{}'",
            request.kind.past_tense(),
            request.name,
            request.zone
        );
        if let Some(network) = network {
            message.push_str(&format!(" on {}", network));
        }
        message.push('.');
        return Outcome::success(message, &output.stdout);
    }

    let stderr = output.stderr.trim();
    let detail = if !stderr.is_empty() {
        stderr.to_string()
    } else {
        match output.exit_code {
            Some(code) => format!("exited with code {}", code),
            None => "terminated by signal".to_string(),
        }
    };

    Outcome::error(
        ErrorKind::ToolFailed,
        format!(
            "Failed to {} VM '{}': {}",
            request.kind, request.name, detail
        ),
    )
    .with_stderr(stderr)
}
