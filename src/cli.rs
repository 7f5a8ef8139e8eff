//! Command-line argument definitions for `logweave`.
//!
//! Uses [`clap`] derive macros for argument parsing.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// Combine log files together in chronological order.
///
/// Each file's timestamp layout is detected from its first parseable line.
/// Lines without a timestamp of their own are kept with the entry they follow.
/// Directories are read recursively; gzip files are decompressed on the fly.
#[derive(Debug, Parser)]
#[command(
    name = "logweave",
    version,
    about,
    long_about = None,
    after_help = "The default timestamp format is %a %T. See https://strftime.org/ for the syntax."
)]
pub struct Cli {
    /// Log files to process. Directories are read recursively.
    #[arg(
        value_name = "FILES_AND_DIRS",
        required_unless_present_any = ["show_default_config", "show_user_config"]
    )]
    pub paths: Vec<PathBuf>,

    /// Use the full path of each log file in the output.
    #[arg(short = 'f', long = "show-path")]
    pub show_path: bool,

    /// Use a fuller timestamp format (%d/%b/%Y:%H:%M:%S %z).
    #[arg(short = '1', long, conflicts_with_all = ["short_timestamp", "time_format"])]
    pub full_timestamp: bool,

    /// Use a short timestamp format (%T).
    #[arg(short = '2', long, conflicts_with = "time_format")]
    pub short_timestamp: bool,

    /// strftime-compatible format used when printing timestamps.
    #[arg(short = 't', long)]
    pub time_format: Option<String>,

    /// Don't replace timestamps in the log line bodies.
    #[arg(short = 'd', long)]
    pub dont_replace_timestamp: bool,

    /// Token substituted for the original timestamp, for narrower output.
    #[arg(short = 'r', long)]
    pub timestamp_replacement: Option<String>,

    /// Don't prefix lines with the normalized timestamp.
    #[arg(short = 'n', long)]
    pub no_timestamp: bool,

    /// Control color output.
    ///
    /// `auto` enables colors only when stdout is a TTY and `NO_COLOR` is unset.
    #[arg(short = 'c', long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Use `tail -F` style output (headers between files, raw lines).
    #[arg(short = 'F', long = "tail-F-style")]
    pub tail_style: bool,

    /// Put the log file name on a separate header line; timestamp stays a prefix.
    #[arg(short = 'G', long)]
    pub alt_style: bool,

    /// Print a separator between lines from different log files.
    #[arg(short = 's', long)]
    pub separator: bool,

    /// Show only log entries after this point in time.
    #[arg(short = 'a', long)]
    pub after: Option<String>,

    /// Display timestamps in this timezone (IANA name, `UTC`, `Local` or an
    /// offset like `+09:00`). Defaults to the config file's value, else UTC.
    #[arg(short = 'z', long)]
    pub timezone: Option<String>,

    /// Don't list the included files before the merged output.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Path to the configuration file with extra timestamp rules.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show the built-in configuration as TOML.
    #[arg(long, conflicts_with = "show_user_config")]
    pub show_default_config: bool,

    /// Show the user's configuration file.
    #[arg(long)]
    pub show_user_config: bool,

    /// Increase diagnostic output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Enable colors only when stdout is a TTY.
    Auto,
    /// Always enable colors.
    Always,
    /// Never enable colors.
    Never,
}
