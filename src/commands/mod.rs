//! Command implementations for gcevm.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations and renders operation outcomes.

mod tools;
mod vm;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::{GcevmError, Result};
use crate::outcome::Outcome;

/// How outcomes are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub verbose: bool,
}

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. The config is resolved
/// once and shared by every command.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;
    let output = Output {
        json: cli.json,
        verbose: cli.verbose > 0,
    };

    match cli.command {
        Command::Create(args) => vm::cmd_create(&config, args, output),
        Command::Start(args) => vm::cmd_start(&config, args, output),
        Command::Stop(args) => vm::cmd_stop(&config, args, output),
        Command::Delete(args) => vm::cmd_delete(&config, args, output),
        Command::Tools => tools::cmd_tools(&config),
        Command::Call(args) => tools::cmd_call(&config, args, output),
    }
}

/// Print an outcome and convert an error outcome into the CLI error.
///
/// Error messages are left to `main`, which prints them to stderr.
fn report(outcome: &Outcome, output: Output) -> Result<()> {
    if output.json {
        println!("{}", outcome.to_json()?);
    } else {
        match outcome {
            Outcome::Success { message, stdout } => {
                println!("{}", message);
                if output.verbose
                    && let Some(stdout) = stdout
                {
                    println!();
                    println!("{}", stdout);
                }
            }
            Outcome::Error { stderr, .. } => {
                if output.verbose
                    && let Some(stderr) = stderr
                {
                    eprintln!("{}", stderr);
                    eprintln!();
                }
            }
        }
    }

    outcome_result(outcome)
}

fn outcome_result(outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Success { .. } => Ok(()),
        Outcome::Error { kind, message, .. } => Err(GcevmError::OperationFailed {
            message: message.clone(),
            exit_code: kind.exit_code(),
        }),
    }
}
