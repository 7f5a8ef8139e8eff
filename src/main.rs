use std::io::{self, BufWriter, IsTerminal, Write};
use std::process::ExitCode;

use clap::Parser;

use logweave::cli::{Cli, ColorMode};
use logweave::config::{Config, default_config_toml};
use logweave::formatter::Formatter;
use logweave::inputs::{open_inputs, resolve_inputs};
use logweave::logging;
use logweave::merge::{MergeEvent, Merger};
use logweave::rule::RuleSet;
use logweave::WeaveError;

fn main() -> ExitCode {
    // Reset SIGPIPE to default behavior so `logweave ... | head` exits quietly.
    reset_sigpipe();

    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose) {
        eprintln!("logweave: {e}");
        return ExitCode::from(1);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(WeaveError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("logweave: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), WeaveError> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    if cli.show_default_config {
        write!(writer, "{}", default_config_toml()?)?;
        writer.flush()?;
        return Ok(());
    }
    if cli.show_user_config {
        let path = cli.config.clone().unwrap_or_else(Config::default_config_path);
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            write!(writer, "{content}")?;
        }
        writer.flush()?;
        return Ok(());
    }

    let config = Config::from_cli(cli)?;
    // Every pattern is compiled before any input is touched
    let rules = RuleSet::compile(&config.rules)?;

    let inputs = resolve_inputs(&cli.paths)?;
    let opened = open_inputs(&inputs)?;
    for skipped in &opened.skipped {
        eprintln!("logweave: warning: {skipped}");
    }

    let mut style = config.style.clone();
    style.palette = if resolve_color_mode(config.color_mode) {
        detect_palette()
    } else {
        0
    };
    let mut formatter = Formatter::new(style, &opened.paths());
    let mut merger = Merger::new(opened.into_streams(), rules, config.classify_options());

    let mut line_buf = String::new();
    if !config.quiet {
        formatter.banner(&mut line_buf);
        writeln!(writer, "{line_buf}")?;
    }

    while let Some(event) = merger.next_event()? {
        match event {
            MergeEvent::Line(line) => {
                line_buf.clear();
                formatter.format(&line, &mut line_buf);
                writeln!(writer, "{line_buf}")?;
            }
            MergeEvent::SkipWarning { path, .. } => {
                eprintln!(
                    "logweave: warning: skipping unparsed lines from start of {}...",
                    path.display()
                );
            }
        }
    }

    writer.flush()?;
    Ok(())
}

fn resolve_color_mode(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            if std::env::var_os("FORCE_COLOR").is_some_and(|v| !v.is_empty() && v != "0") {
                return true;
            }
            let stdout = io::stdout();
            if !stdout.is_terminal() {
                return false;
            }
            if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
                return false;
            }
            if std::env::var("TERM").is_ok_and(|v| v == "dumb") {
                return false;
            }
            true
        }
    }
}

/// Number of colors to assume once color output is enabled.
///
/// Forced color on a non-terminal reports no level; fall back to 8.
fn detect_palette() -> u16 {
    supports_color::on(supports_color::Stream::Stdout)
        .map_or(8, |level| if level.has_256 { 256 } else { 8 })
}

/// Reset SIGPIPE to the default (terminate) behavior.
///
/// By default, Rust ignores SIGPIPE to surface `BrokenPipe` I/O errors.
/// Restoring `SIG_DFL` lets a downstream `head` or pager close the pipe
/// without an error message.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}
