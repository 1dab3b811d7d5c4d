//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// shotdiff: compare screenshots for visual regressions
#[derive(Parser, Debug)]
#[command(name = "shotdiff")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Path to a shotdiff YAML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare a baseline screenshot with a new capture
    Compare(CompareArgs),

    /// Compare every PNG in two directories
    CompareDir(CompareDirArgs),

    /// Show effective configuration
    Config,
}

/// Comparison settings shared by `compare` and `compare-dir`
#[derive(Args, Debug, Clone, Default)]
pub struct DiffArgs {
    /// Diff sensitivity in [0, 1]; lower is stricter (default from config, else 0.1)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Rows to crop from the top of both images
    #[arg(long, conflicts_with = "platform")]
    pub header_height: Option<u32>,

    /// Named platform crop from the config file
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Count anti-aliased edge pixels as differences
    #[arg(long)]
    pub include_aa: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormatArg,
}

/// Arguments for the compare command
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Baseline (known good) image
    pub baseline: PathBuf,

    /// Newly captured image
    pub candidate: PathBuf,

    /// Write the diff image here when the images differ
    #[arg(short, long)]
    pub diff_out: Option<PathBuf>,

    #[command(flatten)]
    pub diff: DiffArgs,
}

/// Arguments for the compare-dir command
#[derive(Parser, Debug)]
pub struct CompareDirArgs {
    /// Directory of baseline images
    pub baseline_dir: PathBuf,

    /// Directory of new captures with matching file names
    pub candidate_dir: PathBuf,

    /// Write diff images for differing pairs into this directory
    #[arg(short, long)]
    pub diff_dir: Option<PathBuf>,

    #[command(flatten)]
    pub diff: DiffArgs,
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
