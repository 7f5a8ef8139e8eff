//! Per-stream state: one input, its buffered line, and its classification.
//!
//! A stream starts out [`Phase::Seeking`], trying every rule against its
//! lines and dropping those nothing matches. The first rule that yields a
//! timestamp is bound permanently ([`Phase::Established`]); from then on
//! each new line is either an advance (its own timestamp, not earlier than
//! the stored one) or a continuation of the entry emitted just before it.

use std::path::{Path, PathBuf};

use jiff::Timestamp;

use crate::error::WeaveError;
use crate::rule::{RuleMatch, RuleSet};
use crate::source::Source;

/// Whether a stream has bound its timestamp rule yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No rule has matched yet; every rule is tried.
    Seeking,
    /// Bound to the rule at this index for the rest of the stream.
    Established(usize),
}

/// Settings that influence line classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Timestamps at or before this instant are not "past cutoff".
    pub cutoff: Timestamp,
    /// Token substituted for the matched timestamp text; `None` keeps lines intact.
    pub replacement: Option<String>,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            cutoff: Timestamp::MIN,
            replacement: Some("<T>".to_string()),
        }
    }
}

/// One input stream and its merge state.
#[derive(Debug)]
pub struct StreamState {
    index: usize,
    path: PathBuf,
    display_name: String,
    source: Option<Source>,
    line: String,
    pending: bool,
    phase: Phase,
    past_cutoff: bool,
    timestamp: Timestamp,
    continuation: bool,
    warned_skip: bool,
    skip_notice: bool,
}

impl StreamState {
    /// Create the state for the `index`-th input (its position in the input list).
    pub fn new(index: usize, source: Source) -> Self {
        let path = source.path().to_path_buf();
        let display_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            index,
            path,
            display_name,
            source: Some(source),
            line: String::new(),
            pending: false,
            phase: Phase::Seeking,
            past_cutoff: false,
            timestamp: Timestamp::MIN,
            continuation: false,
            warned_skip: false,
            skip_notice: false,
        }
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without directories.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The buffered line (meaningful only while [`has_pending_line`](Self::has_pending_line)).
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Timestamp of the last entry that advanced this stream.
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub const fn is_continuation(&self) -> bool {
        self.continuation
    }

    pub const fn is_past_cutoff(&self) -> bool {
        self.past_cutoff
    }

    pub const fn has_pending_line(&self) -> bool {
        self.pending
    }

    /// No buffered line and nothing left to read.
    pub const fn is_exhausted(&self) -> bool {
        !self.pending && self.source.is_none()
    }

    /// Returns `true` once, right after the stream first dropped an unparseable leading line.
    pub fn take_skip_notice(&mut self) -> bool {
        std::mem::take(&mut self.skip_notice)
    }

    /// Read lines until one is buffered for emission or the input ends.
    ///
    /// Must only be called when no line is pending: either at startup or
    /// right after this stream's previous line was emitted.
    pub fn refill(&mut self, rules: &RuleSet, options: &ClassifyOptions) -> Result<(), WeaveError> {
        debug_assert!(
            !self.pending,
            "refill of {} while a line is still pending",
            self.path.display()
        );

        loop {
            let Some(source) = self.source.as_mut() else {
                return Ok(());
            };
            let Some(line) = source.next_line()? else {
                tracing::debug!(path = %self.path.display(), "end of stream");
                // Release the handle as soon as the input is exhausted
                self.source = None;
                return Ok(());
            };
            if self.classify(line, rules, options) {
                self.pending = true;
                return Ok(());
            }
        }
    }

    /// Classify a freshly read line. Returns `false` when it is dropped.
    fn classify(&mut self, line: String, rules: &RuleSet, options: &ClassifyOptions) -> bool {
        match self.phase {
            Phase::Seeking => match rules.match_any(&line) {
                Some((index, found)) => {
                    tracing::debug!(
                        path = %self.path.display(),
                        rule = index,
                        pattern = rules.get(index).map(|r| r.pattern()),
                        "timestamp rule established"
                    );
                    self.phase = Phase::Established(index);
                    if found.timestamp > options.cutoff {
                        self.advance(line, &found, options);
                        true
                    } else {
                        false
                    }
                }
                None => {
                    if !self.warned_skip {
                        self.warned_skip = true;
                        self.skip_notice = true;
                    }
                    false
                }
            },
            Phase::Established(index) => {
                match rules
                    .match_rule(index, &line)
                    .filter(|found| found.timestamp > options.cutoff)
                {
                    Some(found) if found.timestamp < self.timestamp => {
                        tracing::trace!(
                            path = %self.path.display(),
                            stored = %self.timestamp,
                            found = %found.timestamp,
                            "timestamp regression, treating as continuation"
                        );
                        self.line = line;
                        self.continuation = true;
                        true
                    }
                    Some(found) => {
                        self.advance(line, &found, options);
                        true
                    }
                    None if self.past_cutoff => {
                        self.line = line;
                        self.continuation = true;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Accept `line` as a new entry at `found.timestamp`.
    fn advance(&mut self, mut line: String, found: &RuleMatch, options: &ClassifyOptions) {
        if let Some(token) = &options.replacement {
            line.replace_range(found.span.clone(), token);
        }
        self.line = line;
        self.timestamp = found.timestamp;
        self.past_cutoff = true;
        self.continuation = false;
    }

    /// Hand out the buffered line and mark it consumed.
    ///
    /// Returns the line text and whether it was a continuation; both the
    /// pending and continuation flags are cleared.
    pub fn take_line(&mut self) -> Option<(String, bool)> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        let continuation = std::mem::take(&mut self.continuation);
        Some((std::mem::take(&mut self.line), continuation))
    }
}
