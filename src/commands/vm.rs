//! Implementation of `gcevm create|start|stop|delete`.

use super::{Output, report};
use crate::cli::{CreateArgs, TargetArgs};
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::request::CreateOverrides;

pub fn cmd_create(config: &Config, args: CreateArgs, output: Output) -> Result<()> {
    let dispatcher = Dispatcher::from_config(config)?;
    let options = dispatcher.create_defaults().with_overrides(&overrides(&args));
    let target = &args.target;

    let outcome = dispatcher.create(&target.project, &target.zone, &target.name, options);
    report(&outcome, output)
}

pub fn cmd_start(config: &Config, args: TargetArgs, output: Output) -> Result<()> {
    let outcome = Dispatcher::from_config(config)?.start(&args.project, &args.name, &args.zone);
    report(&outcome, output)
}

pub fn cmd_stop(config: &Config, args: TargetArgs, output: Output) -> Result<()> {
    let outcome = Dispatcher::from_config(config)?.stop(&args.project, &args.name, &args.zone);
    report(&outcome, output)
}

pub fn cmd_delete(config: &Config, args: TargetArgs, output: Output) -> Result<()> {
    let outcome = Dispatcher::from_config(config)?.delete(&args.project, &args.name, &args.zone);
    report(&outcome, output)
}

/// Flags given on the command line win over configured defaults.
fn overrides(args: &CreateArgs) -> CreateOverrides {
    CreateOverrides {
        network: args.network.clone(),
        subnetwork: args.subnetwork.clone(),
        machine_type: args.machine_type.clone(),
        image_family: args.image_family.clone(),
        image_project: args.image_project.clone(),
    }
}
