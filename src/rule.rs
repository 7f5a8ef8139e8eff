//! Timestamp-extraction rules and the pattern matcher.
//!
//! A rule is a regular expression whose first capture group spans the
//! timestamp text, optionally paired with an explicit strftime-style format.
//! Rules are compiled once at startup and evaluated in order, first match
//! wins. A rule only "matches" a line when its capture also resolves to an
//! instant.

use std::ops::Range;

use jiff::Timestamp;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::WeaveError;
use crate::timestamp::Resolver;

/// Rule as written in a configuration file.
///
/// ```toml
/// [[match]]
/// match = '^(\d{4}-\d\d-\d\d \d\d:\d\d:\d\d)'
/// format = "%Y-%m-%d %H:%M:%S"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Regular expression; capture group 1 is the timestamp span.
    #[serde(rename = "match")]
    pub pattern: String,
    /// Explicit strftime-style format for the captured text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl RuleSpec {
    pub fn new(pattern: impl Into<String>, format: Option<&str>) -> Self {
        Self {
            pattern: pattern.into(),
            format: format.map(str::to_string),
        }
    }
}

/// Built-in rules, appended after any user rules.
const DEFAULT_RULES: &[(&str, Option<&str>)] = &[
    // 2020-10-05 16:06:40, 2020-10-05T16:06:40.123Z, 2020-10-05 16:06:40,123+02:00
    (
        r"(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:?\d{2})?)",
        None,
    ),
    // Apache / nginx access logs: [10/Oct/2000:13:55:36 -0700]
    (
        r"\[(\d{2}/[A-Z][a-z]{2}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4})\]",
        Some("%d/%b/%Y:%H:%M:%S %z"),
    ),
    // Classic syslog: Oct  5 16:06:15
    (
        r"^([A-Z][a-z]{2} +\d{1,2} \d{2}:\d{2}:\d{2})",
        Some("%b %d %H:%M:%S"),
    ),
    // ctime style: Mon Oct  5 16:06:15 2020
    (
        r"([A-Z][a-z]{2} [A-Z][a-z]{2} +\d{1,2} \d{2}:\d{2}:\d{2} \d{4})",
        None,
    ),
    // nginx error log: 2020/10/05 16:06:15
    (
        r"(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}(?:\.\d+)?)",
        Some("%Y/%m/%d %H:%M:%S"),
    ),
    // Leading Unix epoch, optionally bracketed: [1601913975.123]
    (r"^\[?(\d{10}(?:\.\d+)?)\]?\s", None),
];

/// The built-in rule list.
pub fn default_rules() -> Vec<RuleSpec> {
    DEFAULT_RULES
        .iter()
        .map(|(pattern, format)| RuleSpec::new(*pattern, *format))
        .collect()
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    format: Option<String>,
}

/// A successful rule application: where the timestamp sits and what it says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Byte span of the timestamp text within the line.
    pub span: Range<usize>,
    /// The resolved instant.
    pub timestamp: Timestamp,
}

impl Rule {
    /// Compile a rule, rejecting patterns without a capture group.
    pub fn compile(spec: &RuleSpec) -> Result<Self, WeaveError> {
        let pattern = Regex::new(&spec.pattern).map_err(|e| WeaveError::Pattern {
            pattern: spec.pattern.clone(),
            reason: e.to_string(),
        })?;
        if pattern.captures_len() < 2 {
            return Err(WeaveError::Pattern {
                pattern: spec.pattern.clone(),
                reason: "pattern needs a capture group around the timestamp".to_string(),
            });
        }
        Ok(Self {
            pattern,
            format: spec.format.clone(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Apply the rule to `line`.
    ///
    /// Returns `None` unless the pattern matches and the captured text
    /// resolves to an instant.
    pub fn apply(&self, line: &str, resolver: &Resolver) -> Option<RuleMatch> {
        let capture = self.pattern.captures(line)?.get(1)?;
        let timestamp = resolver.resolve(capture.as_str(), self.format())?;
        Some(RuleMatch {
            span: capture.range(),
            timestamp,
        })
    }
}

/// Ordered list of compiled rules plus the resolver they share.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    resolver: Resolver,
}

impl RuleSet {
    /// Compile every rule in order; the first bad pattern aborts.
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, WeaveError> {
        let rules = specs.iter().map(Rule::compile).collect::<Result<_, _>>()?;
        Ok(Self {
            rules,
            resolver: Resolver::new(),
        })
    }

    /// Replace the resolver (e.g. to pin the year used for year-less formats).
    #[must_use]
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Try every rule in order; returns the index of the first one that matches.
    pub fn match_any(&self, line: &str) -> Option<(usize, RuleMatch)> {
        self.rules
            .iter()
            .enumerate()
            .find_map(|(index, rule)| Some((index, rule.apply(line, &self.resolver)?)))
    }

    /// Try only the rule at `index`.
    pub fn match_rule(&self, index: usize, line: &str) -> Option<RuleMatch> {
        self.rules.get(index)?.apply(line, &self.resolver)
    }
}
