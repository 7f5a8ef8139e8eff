//! `logweave`: merge log files into a single chronologically ordered stream.
//!
//! Each input's timestamp layout is inferred from the first line any
//! configured rule can parse. Lines without a usable timestamp, or whose
//! timestamp goes backwards, stay attached to the entry they follow.
//! Gzip-compressed inputs are decompressed transparently.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use logweave::{ClassifyOptions, MergeEvent, Merger, RuleSet, Source, StreamState, default_rules};
//!
//! let a = Source::from_reader("a.log", Cursor::new(b"2020-01-01 10:00:00 a1\n2020-01-01 10:00:05 a2\n".to_vec())).unwrap();
//! let b = Source::from_reader("b.log", Cursor::new(b"2020-01-01 10:00:02 b1\n".to_vec())).unwrap();
//! let streams = vec![StreamState::new(0, a), StreamState::new(1, b)];
//! let rules = RuleSet::compile(&default_rules()).unwrap();
//!
//! let order: Vec<usize> = Merger::new(streams, rules, ClassifyOptions::default())
//!     .filter_map(|event| match event.unwrap() {
//!         MergeEvent::Line(line) => Some(line.source),
//!         MergeEvent::SkipWarning { .. } => None,
//!     })
//!     .collect();
//! assert_eq!(order, vec![0, 1, 0]);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod inputs;
pub mod logging;
pub mod merge;
pub mod rule;
pub mod source;
pub mod stream;
pub mod timestamp;

// Re-export primary API types for convenience.
pub use config::Config;
pub use error::WeaveError;
pub use formatter::{Formatter, Layout, OutputStyle, color_index};
pub use inputs::{Input, OpenedInputs, open_inputs, resolve_inputs};
pub use merge::{EmittedLine, MergeEvent, Merger};
pub use rule::{Rule, RuleMatch, RuleSet, RuleSpec, default_rules};
pub use source::Source;
pub use stream::{ClassifyOptions, Phase, StreamState};
pub use timestamp::Resolver;
