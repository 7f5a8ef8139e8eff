//! Configuration management with TOML file support.
//!
//! Merges settings from three sources (highest precedence first):
//! 1. CLI flags
//! 2. Config file (`$XDG_CONFIG_HOME/logweave/config.toml` or `~/.config/logweave/config.toml`)
//! 3. Built-in defaults
//!
//! Timestamp rules are the exception: user rules do not replace the built-in
//! ones, they are tried first.

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use jiff::fmt::strtime::BrokenDownTime;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, ColorMode};
use crate::error::WeaveError;
use crate::formatter::{Layout, OutputStyle};
use crate::rule::{RuleSpec, default_rules};
use crate::stream::ClassifyOptions;
use crate::timestamp::Resolver;

/// Default timestamp prefix format.
pub const TIME_FORMAT_DEFAULT: &str = "%a %T";
/// `--short-timestamp` format.
pub const TIME_FORMAT_SHORT: &str = "%T";
/// `--full-timestamp` format.
pub const TIME_FORMAT_LONG: &str = "%d/%b/%Y:%H:%M:%S %z";
/// Default replacement token for redacted timestamps.
pub const DEFAULT_REPLACEMENT: &str = "<T>";

/// Runtime configuration merged from defaults, config file, and CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Color output mode (auto/always/never).
    pub color_mode: ColorMode,
    /// Timestamp rules in evaluation order.
    pub rules: Vec<RuleSpec>,
    /// Only entries strictly after this instant are shown.
    pub cutoff: Timestamp,
    /// Token replacing the matched timestamp text; `None` leaves lines untouched.
    pub replacement: Option<String>,
    /// Rendering of emitted lines.
    pub style: OutputStyle,
    /// Suppress the `Including file` banner.
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Auto,
            rules: default_rules(),
            cutoff: Timestamp::MIN,
            replacement: Some(DEFAULT_REPLACEMENT.to_string()),
            style: OutputStyle::default(),
            quiet: false,
        }
    }
}

impl Config {
    /// Build a [`Config`] from CLI arguments, loading the config file if present.
    ///
    /// Merge precedence: CLI flags > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, WeaveError> {
        let mut config = Self::default();

        let file_config = match &cli.config {
            // An explicitly named config file must exist
            Some(path) => Some(FileConfig::load(path)?),
            None => {
                let path = Self::default_config_path();
                if path.exists() {
                    Some(FileConfig::load(&path)?)
                } else {
                    None
                }
            }
        };
        if let Some(file_config) = file_config {
            config.apply_file_config(file_config)?;
        }

        // CLI overrides
        config.color_mode = cli.color;
        config.quiet = cli.quiet;

        if cli.full_timestamp {
            config.style.time_format = TIME_FORMAT_LONG.to_string();
        } else if cli.short_timestamp {
            config.style.time_format = TIME_FORMAT_SHORT.to_string();
        } else if let Some(format) = &cli.time_format {
            config.style.time_format.clone_from(format);
        }

        if let Some(token) = &cli.timestamp_replacement {
            config.replacement = Some(token.clone());
        }
        // Tail style has no timestamp prefix, so redacting would hide the time entirely
        if cli.dont_replace_timestamp || cli.tail_style {
            config.replacement = None;
        }

        config.style.layout = if cli.tail_style {
            Layout::Tail
        } else if cli.alt_style {
            Layout::Alternate
        } else {
            Layout::Columns
        };
        config.style.show_timestamp = !cli.no_timestamp;
        config.style.full_path = cli.show_path;
        config.style.separator = cli.separator;
        if let Some(tz) = &cli.timezone {
            config.style.timezone = parse_timezone(tz)?;
        }

        if let Some(after) = &cli.after {
            config.cutoff = Resolver::new().infer(after).ok_or_else(|| {
                WeaveError::Config(format!("did not understand --after argument '{after}'"))
            })?;
        }

        validate_time_format(&config.style.time_format)?;

        Ok(config)
    }

    /// Classification settings handed to the merge.
    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            cutoff: self.cutoff,
            replacement: self.replacement.clone(),
        }
    }

    /// Default config file path: `$XDG_CONFIG_HOME/logweave/config.toml` or `~/.config/logweave/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("logweave").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("logweave")
                .join("config.toml")
        } else {
            PathBuf::from(".config/logweave/config.toml")
        }
    }

    /// Apply settings from a parsed config file.
    fn apply_file_config(&mut self, file: FileConfig) -> Result<(), WeaveError> {
        if !file.rules.is_empty() {
            let mut rules = file.rules;
            rules.append(&mut self.rules);
            self.rules = rules;
        }

        if let Some(format) = file.timestamp_format {
            self.style.time_format = format;
        }

        if let Some(token) = file.replacement {
            self.replacement = Some(token);
        }

        if let Some(tz) = file.timezone {
            self.style.timezone = parse_timezone(&tz)?;
        }
        Ok(())
    }
}

/// Render the built-in rules as a config file.
pub fn default_config_toml() -> Result<String, WeaveError> {
    let file = FileConfig {
        rules: default_rules(),
        ..FileConfig::default()
    };
    toml::to_string(&file).map_err(|e| WeaveError::Config(format!("cannot render defaults: {e}")))
}

/// Resolve a timezone name.
///
/// `UTC`, `Local` and fixed offsets (`+09:00`, `-0530`) are handled without
/// the tz database.
pub fn parse_timezone(name: &str) -> Result<TimeZone, WeaveError> {
    if name.eq_ignore_ascii_case("utc") {
        return Ok(TimeZone::UTC);
    }
    if name.eq_ignore_ascii_case("local") {
        return Ok(TimeZone::system());
    }
    if name.starts_with(['+', '-'])
        && let Some(offset) = ["%:z", "%z"].iter().find_map(|format| {
            BrokenDownTime::parse(*format, name)
                .ok()
                .and_then(|tm| tm.offset())
        })
    {
        return Ok(TimeZone::fixed(offset));
    }
    TimeZone::get(name)
        .map_err(|e| WeaveError::Config(format!("error interpreting '{name}' as a timezone: {e}")))
}

/// Reject strftime formats jiff cannot render.
fn validate_time_format(format: &str) -> Result<(), WeaveError> {
    let now = jiff::Zoned::now();
    jiff::fmt::strtime::format(format, &now)
        .map(|_| ())
        .map_err(|e| WeaveError::Config(format!("{format} is an invalid format: {e}")))
}

/// Config file structure (TOML deserialization).
#[derive(Debug, Default, Serialize, Deserialize)]
struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    replacement: Option<String>,
    #[serde(default, rename = "match")]
    rules: Vec<RuleSpec>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, WeaveError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WeaveError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
