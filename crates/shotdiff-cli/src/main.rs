//! shotdiff: screenshot comparison for visual regression testing
//!
//! ## Usage
//!
//! ```bash
//! shotdiff compare base.png new.png               # exit 0 identical, 1 different
//! shotdiff compare base.png new.png -d diff.png   # write the diff image
//! shotdiff compare-dir __baselines__ __new__ -d __diffs__
//! shotdiff config                                 # print effective config
//! ```

use clap::Parser;
use shotdiff_cli::{
    init_tracing, load_config, run_compare, run_compare_dir, run_config, Cli, CliConfig,
    CliError, CliResult, ColorChoice, Commands, Reporter, Verbosity,
};
use std::process::ExitCode;

/// Exit status when a comparison could not be completed
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Returns whether any comparison found a difference
fn run() -> CliResult<bool> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    let settings = load_config(cli.config.as_deref())?;
    let mut reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match cli.command {
        Commands::Config => {
            run_config(&reporter, &settings)?;
            Ok(false)
        }
        Commands::Compare(args) => {
            let rt = runtime()?;
            rt.block_on(run_compare(&reporter, &settings, &args))
        }
        Commands::CompareDir(args) => {
            let rt = runtime()?;
            rt.block_on(run_compare_dir(&mut reporter, &settings, &args))
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(ColorChoice::from(cli.color.clone()))
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::invalid_argument(format!("Failed to create runtime: {e}")))
}
