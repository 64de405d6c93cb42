//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "adr-assess",
    version,
    about = "Causality assessment for adverse drug reaction reports",
    long_about = "Classify adverse drug reaction reports on the WHO-UMC causality scale \
                  and explain each verdict with per-feature contributions.\n\n\
                  Reads case exports (CSV or JSON) and a directory of trained model artifacts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient-identifying values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Assess every case in a CSV or JSON export.
    Assess(AssessArgs),

    /// Load and cross-check the model artifacts.
    Verify(ArtifactArgs),

    /// List the known case and derived columns.
    Columns(ColumnsArgs),

    /// Show the model id, training metrics and parameters.
    ModelInfo(ArtifactArgs),
}

#[derive(Args)]
pub struct AssessArgs {
    /// Case export to assess (.csv or .json).
    #[arg(value_name = "CASES")]
    pub cases: PathBuf,

    /// Assessment config file (TOML).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Model artifact directory (overrides the config file).
    #[arg(long = "artifacts-dir", value_name = "DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// Background data for the explainer (overrides the config file).
    #[arg(long = "background", value_name = "PATH")]
    pub background: Option<PathBuf>,

    /// Number of k-means clusters summarizing the background.
    #[arg(long = "clusters", value_name = "K")]
    pub clusters: Option<usize>,

    /// Seed for background clustering and coalition sampling.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Coalition budget per explanation.
    #[arg(long = "max-coalitions", value_name = "N")]
    pub max_coalitions: Option<usize>,

    /// Reference date for age derivation (YYYY-MM-DD).
    #[arg(long = "today", value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Write assessments as JSON to this file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Features listed per case in the summary table.
    #[arg(long = "top", default_value_t = 3)]
    pub top: usize,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct ArtifactArgs {
    /// Model artifact directory.
    #[arg(long = "artifacts-dir", value_name = "DIR", default_value = "artifacts")]
    pub artifacts_dir: PathBuf,
}

#[derive(Args)]
pub struct ColumnsArgs {
    /// Also show how a trained model uses each column.
    #[arg(long = "artifacts-dir", value_name = "DIR")]
    pub artifacts_dir: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
