//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "colstack",
    version,
    about = "Render a column stack configuration over a CSV file",
    long_about = "Render a column stack configuration over a CSV file.\n\n\
                  Columns are aliased, parsed, typed, created, filtered and binned\n\
                  as declared in a JSON configuration, and the result is written as CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Render a configuration over a CSV file and write the result.
    Run(RunArgs),

    /// Show the row counts of each bin of one binned column.
    Bins(BinsArgs),

    /// List the registered data type tags.
    Types,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Input CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// JSON column stack configuration.
    #[arg(long = "config", short = 'c', value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output CSV file (default: <INPUT stem>_output.csv beside the input).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write the effective configuration, with empty fields omitted.
    #[arg(long = "dump-config", value_name = "FILE")]
    pub dump_config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct BinsArgs {
    /// Input CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// JSON column stack configuration.
    #[arg(long = "config", short = 'c', value_name = "CONFIG")]
    pub config: PathBuf,

    /// Binned column (or its label column) to group by.
    #[arg(long = "column", value_name = "NAME")]
    pub column: String,
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
