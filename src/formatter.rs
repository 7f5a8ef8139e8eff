//! Output formatter for merged lines.
//!
//! Renders each [`EmittedLine`] with an optional timestamp prefix (converted
//! to the target timezone), a source label column, and separator or header
//! lines when the source changes:
//!
//! ```text
//! Mon 10:00:00 | app.log | <T> request started
//! Mon 10:00:00 |         |   continuation detail
//! Mon 10:00:02 | db.log  | <T> query executed
//! ```
//!
//! The only state kept between lines is the last emitted source, used to
//! suppress repeated labels.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use jiff::tz::TimeZone;
use owo_colors::{OwoColorize, XtermColors};

use crate::merge::EmittedLine;

/// Width of the body column in separator lines.
const BODY_RULE_WIDTH: usize = 40;

/// Overall line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// `timestamp | label | body`.
    #[default]
    Columns,
    /// File name on its own header line, then `timestamp | body`.
    Alternate,
    /// Like `tail -F`: header line on source change, bare bodies.
    Tail,
}

/// How emitted lines are rendered.
#[derive(Debug, Clone)]
pub struct OutputStyle {
    pub layout: Layout,
    /// Prefix lines with the normalized timestamp.
    pub show_timestamp: bool,
    /// Label with the full path instead of the file name.
    pub full_path: bool,
    /// Print a separator line whenever the source changes.
    pub separator: bool,
    /// strftime-compatible format for the timestamp prefix.
    pub time_format: String,
    /// Timezone timestamps are displayed in.
    pub timezone: TimeZone,
    /// Number of terminal colors available; below 8 disables color.
    pub palette: u16,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            layout: Layout::Columns,
            show_timestamp: true,
            full_path: false,
            separator: false,
            time_format: "%a %T".to_string(),
            timezone: TimeZone::UTC,
            palette: 0,
        }
    }
}

/// Color index for the `source`-th input given a palette size.
///
/// Small palettes cycle through 1..=6, skipping black and white; 16+ color
/// palettes use the bright variants 9..=14.
pub fn color_index(source: usize, palette: u16) -> Option<u8> {
    #[allow(clippy::cast_possible_truncation)] // always < 6
    let offset = (source % 6) as u8;
    match palette {
        0..=7 => None,
        8..=15 => Some(1 + offset),
        _ => Some(9 + offset),
    }
}

/// Render `timestamp` in `tz` with `format`, falling back to RFC 3339 output
/// if the format cannot be applied.
pub fn render_timestamp(timestamp: Timestamp, tz: &TimeZone, format: &str) -> String {
    let zdt = timestamp.to_zoned(tz.clone());
    jiff::fmt::strtime::format(format, &zdt).unwrap_or_else(|_| zdt.to_string())
}

#[derive(Debug, Clone)]
struct Label {
    path: PathBuf,
    name: String,
    color: Option<u8>,
}

/// Stateful line renderer.
#[derive(Debug, Clone)]
pub struct Formatter {
    style: OutputStyle,
    labels: Vec<Label>,
    label_width: usize,
    separator: String,
    last_source: Option<usize>,
}

impl Formatter {
    /// Build a formatter for inputs listed in input-index order.
    pub fn new<P: AsRef<Path>>(style: OutputStyle, paths: &[P]) -> Self {
        let labels: Vec<Label> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let path = p.as_ref().to_path_buf();
                let name = if style.full_path {
                    path.display().to_string()
                } else {
                    path.file_name().map_or_else(
                        || path.display().to_string(),
                        |n| n.to_string_lossy().into_owned(),
                    )
                };
                Label {
                    path,
                    name,
                    color: color_index(i, style.palette),
                }
            })
            .collect();
        let label_width = labels
            .iter()
            .map(|l| l.name.chars().count())
            .max()
            .unwrap_or(0);
        let separator = build_separator(&style, label_width);

        Self {
            style,
            labels,
            label_width,
            separator,
            last_source: None,
        }
    }

    /// Write the `Including file ...` banner, one line per input plus a blank line.
    pub fn banner(&self, out: &mut String) {
        for label in &self.labels {
            let line = format!("Including file {}", label.path.display());
            self.paint(&line, label.color, out);
            out.push('\n');
        }
    }

    /// Render `line` into `out` (without a trailing newline).
    ///
    /// May produce several physical lines when a separator or header is due.
    pub fn format(&mut self, line: &EmittedLine, out: &mut String) {
        let source_changed = self.last_source != Some(line.source);
        let color = self.labels.get(line.source).and_then(|l| l.color);
        let name = self
            .labels
            .get(line.source)
            .map_or("", |l| l.name.as_str());

        if source_changed && self.style.separator && self.style.layout != Layout::Tail {
            // Only between sources, never before the first line
            if self.last_source.is_some() {
                self.paint(&self.separator, color, out);
                out.push('\n');
            }
        }

        if source_changed && self.style.layout != Layout::Columns {
            out.push('\n');
            self.paint(&format!("==> {name} <=="), color, out);
            out.push('\n');
        }

        let label = if line.continuation || !source_changed {
            ""
        } else {
            name
        };

        let mut text = String::with_capacity(line.text.len() + 48);
        match self.style.layout {
            Layout::Tail => text.push_str(&line.text),
            Layout::Alternate | Layout::Columns => {
                if self.style.show_timestamp {
                    text.push_str(&render_timestamp(
                        line.timestamp,
                        &self.style.timezone,
                        &self.style.time_format,
                    ));
                    text.push_str(" | ");
                }
                if self.style.layout == Layout::Columns {
                    let _ = write!(text, "{label:<width$} | ", width = self.label_width);
                }
                text.push_str(&line.text);
            }
        }
        self.paint(&text, color, out);

        self.last_source = Some(line.source);
    }

    fn paint(&self, text: &str, color: Option<u8>, out: &mut String) {
        match color {
            Some(index) => {
                let _ = write!(out, "{}", text.color(XtermColors::from(index)));
            }
            None => out.push_str(text),
        }
    }
}

/// Separator line made of `=` runs sized to each column.
fn build_separator(style: &OutputStyle, label_width: usize) -> String {
    let body = "=".repeat(BODY_RULE_WIDTH);
    let mut columns = Vec::with_capacity(3);
    if style.show_timestamp {
        let sample = render_timestamp(Timestamp::now(), &style.timezone, &style.time_format);
        columns.push("=".repeat(sample.chars().count()));
    }
    if style.layout == Layout::Columns {
        columns.push("=".repeat(label_width));
    }
    columns.push(body);
    columns.join(" | ")
}
