//! Implementation of `gcevm tools` and `gcevm call`.

use super::{Output, report};
use crate::cli::CallArgs;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::{GcevmError, Result};
use crate::tools::{call_tool, manifest};
use serde_json::Value;

/// Print the tool manifest, advertising the configured create defaults.
pub fn cmd_tools(config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(&manifest(&config.create_defaults))
        .map_err(|e| GcevmError::Internal(format!("failed to serialize tool manifest: {}", e)))?;
    println!("{}", json);
    Ok(())
}

pub fn cmd_call(config: &Config, args: CallArgs, output: Output) -> Result<()> {
    let raw = if args.args == "-" {
        std::io::read_to_string(std::io::stdin()).map_err(|e| {
            GcevmError::UserError(format!("failed to read tool arguments from stdin: {}", e))
        })?
    } else {
        args.args
    };

    let tool_args = parse_tool_args(&raw)?;
    let dispatcher = Dispatcher::from_config(config)?;
    let outcome = call_tool(&dispatcher, &args.tool, &tool_args);
    report(&outcome, output)
}

fn parse_tool_args(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        GcevmError::UserError(format!(
            "invalid tool arguments: {}\n\
             Fix: pass a JSON object, e.g. --args '{{\"project_id\":\"p\",\"vm_name\":\"vm1\",\"zone\":\"us-central1-a\"}}'",
            e
        ))
    })?;

    if !value.is_object() {
        return Err(GcevmError::UserError(
            "invalid tool arguments: expected a JSON object".to_string(),
        ));
    }

    Ok(value)
}
