//! CLI argument parsing for gcevm.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// gcevm: create, start, stop and delete Compute Engine VMs through gcloud.
///
/// Every command prints a normalized result: a success message, or an error
/// message with the provisioning tool's stderr. `tools` and `call` expose the
/// same operations to conversational agent runtimes.
#[derive(Parser, Debug)]
#[command(name = "gcevm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: $GCEVM_CONFIG, then ./gcevm.yaml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the result record as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log more (-v info, -vv debug). GCEVM_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for gcevm.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a VM instance.
    ///
    /// The subnetwork is used when non-empty; otherwise the network.
    /// Pass `--subnetwork ""` to attach by network.
    Create(CreateArgs),

    /// Start a stopped VM instance.
    Start(TargetArgs),

    /// Stop a running VM instance.
    Stop(TargetArgs),

    /// Delete a VM instance.
    Delete(TargetArgs),

    /// Print the agent tool manifest as JSON.
    Tools,

    /// Run one agent tool call.
    ///
    /// Arguments are a JSON object, e.g.
    /// `gcevm call start_gcp_vm --args '{"project_id":"p","vm_name":"vm1","zone":"us-central1-a"}'`
    Call(CallArgs),
}

/// Identifies one VM.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// VM instance name.
    pub name: String,

    /// Google Cloud project ID.
    #[arg(short, long)]
    pub project: String,

    /// Zone of the instance (e.g., us-central1-a).
    #[arg(short, long)]
    pub zone: String,
}

/// Arguments for the `create` command.
///
/// Unset options fall back to `create_defaults` from the config.
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Network to attach to. Ignored when a subnetwork is in effect.
    #[arg(long)]
    pub network: Option<String>,

    /// Subnetwork to attach to.
    #[arg(long)]
    pub subnetwork: Option<String>,

    /// Machine type (e.g., n1-standard-1).
    #[arg(long)]
    pub machine_type: Option<String>,

    /// Image family (e.g., debian-11).
    #[arg(long)]
    pub image_family: Option<String>,

    /// Project hosting the image family (e.g., debian-cloud).
    #[arg(long)]
    pub image_project: Option<String>,
}

/// Arguments for the `call` command.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name (create_gcp_vm, start_gcp_vm, stop_gcp_vm, delete_gcp_vm).
    pub tool: String,

    /// JSON object of tool arguments, or `-` to read it from stdin.
    #[arg(long, default_value = "{}")]
    pub args: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
