//! shotdiff CLI library
//!
//! Command-line front end for the `shotdiff` screenshot comparison crate.
//! The binary parses [`Cli`], installs logging with [`init_tracing`] and
//! dispatches to the `run_*` functions.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, CompareArgs, CompareDirArgs, DiffArgs, OutputFormatArg,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
pub use runner::{
    load_config, resolve_options, run_compare, run_compare_dir, run_config, DEFAULT_CONFIG_FILE,
};

use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins over the verbosity flags when set.
pub fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
