//! The merge scheduler: a k-way merge over the frontier of live streams.
//!
//! Each cycle refills every stream that has no buffered line, drops the
//! exhausted ones, orders the rest by `(continuation first, timestamp,
//! input index)` and emits the head. Continuations therefore always follow
//! the entry they belong to, with nothing interleaved from other streams.

use std::cmp::Reverse;
use std::collections::VecDeque;
use std::path::PathBuf;

use jiff::Timestamp;

use crate::error::WeaveError;
use crate::rule::RuleSet;
use crate::stream::{ClassifyOptions, StreamState};

/// A line chosen for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedLine {
    /// Input index of the stream the line came from.
    pub source: usize,
    /// The stream's stored timestamp when the line was emitted.
    pub timestamp: Timestamp,
    /// Whether the line continues the previous entry of the same stream.
    pub continuation: bool,
    /// Line body, with the timestamp span redacted when enabled.
    pub text: String,
}

/// Something the merge produced, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeEvent {
    Line(EmittedLine),
    /// A stream began with lines no rule could parse; they are being dropped.
    SkipWarning { source: usize, path: PathBuf },
}

/// Drives the merge over a set of streams.
#[derive(Debug)]
pub struct Merger {
    streams: Vec<StreamState>,
    rules: RuleSet,
    options: ClassifyOptions,
    notices: VecDeque<MergeEvent>,
}

impl Merger {
    pub fn new(streams: Vec<StreamState>, rules: RuleSet, options: ClassifyOptions) -> Self {
        Self {
            streams,
            rules,
            options,
            notices: VecDeque::new(),
        }
    }

    /// Streams still taking part in the merge, in current frontier order.
    pub fn streams(&self) -> &[StreamState] {
        &self.streams
    }

    /// Produce the next event, or `None` once every stream is drained.
    ///
    /// Skip warnings raised while refilling are returned before the line
    /// that follows them.
    pub fn next_event(&mut self) -> Result<Option<MergeEvent>, WeaveError> {
        if let Some(notice) = self.notices.pop_front() {
            return Ok(Some(notice));
        }

        for stream in &mut self.streams {
            if stream.has_pending_line() {
                continue;
            }
            stream.refill(&self.rules, &self.options)?;
            if stream.take_skip_notice() {
                tracing::debug!(path = %stream.path().display(), "skipping unparsed leading lines");
                self.notices.push_back(MergeEvent::SkipWarning {
                    source: stream.index(),
                    path: stream.path().to_path_buf(),
                });
            }
        }

        self.streams.retain(|stream| !stream.is_exhausted());

        if let Some(notice) = self.notices.pop_front() {
            return Ok(Some(notice));
        }

        self.streams.sort_by_key(|stream| {
            (
                Reverse(stream.is_continuation()),
                stream.timestamp(),
                stream.index(),
            )
        });

        let Some(head) = self.streams.first_mut() else {
            return Ok(None);
        };
        let timestamp = head.timestamp();
        let source = head.index();
        Ok(head.take_line().map(|(text, continuation)| {
            MergeEvent::Line(EmittedLine {
                source,
                timestamp,
                continuation,
                text,
            })
        }))
    }
}

impl Iterator for Merger {
    type Item = Result<MergeEvent, WeaveError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
