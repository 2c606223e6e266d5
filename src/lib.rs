//! gcevm: Compute Engine VM lifecycle operations for agent runtimes.
//!
//! Four operations (create, start, stop, delete) each run one `gcloud
//! compute instances` command in argument-list form with a bounded timeout
//! and return a normalized [`Outcome`]. No operation ever returns a Rust
//! error to its caller.
//!
//! ```no_run
//! use gcevm::{Config, CreateOptions, Dispatcher};
//!
//! let dispatcher = Dispatcher::from_config(&Config::default())?;
//! let outcome = dispatcher.create("proj1", "us-central1-a", "vm1", CreateOptions::default());
//! println!("{}", outcome.message());
//! # Ok::<(), gcevm::error::GcevmError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod outcome;
pub mod request;
pub mod runner;
pub mod tools;

pub use config::Config;
pub use dispatcher::Dispatcher;
pub use outcome::{ErrorKind, Outcome};
pub use request::{CreateOptions, CreateOverrides, OperationKind, OperationRequest};
pub use tools::{create_gcp_vm, delete_gcp_vm, start_gcp_vm, stop_gcp_vm};
