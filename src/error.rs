//! Error types for `logweave`.
//!
//! Uses [`thiserror`] for ergonomic error derivation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring or running a merge.
///
/// Maps to exit codes via [`WeaveError::exit_code`]: configuration problems
/// exit 1, input and I/O problems exit 2.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// Configuration error (invalid flag combination, bad timezone, bad format).
    #[error("configuration error: {0}")]
    Config(String),

    /// A timestamp pattern failed to compile or has no capture group.
    #[error("invalid timestamp pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    /// An input could not be opened or inspected.
    #[error("cannot open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A gzip-compressed input contained malformed data.
    #[error("cannot decompress {}: {source}", path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl WeaveError {
    /// Process exit code for this error.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Pattern { .. } | Self::Toml(_) => 1,
            Self::Open { .. } | Self::Decompress { .. } | Self::Io(_) => 2,
        }
    }
}
