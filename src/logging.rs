//! Diagnostic logging setup.
//!
//! Configures `tracing-subscriber` to write to stderr so diagnostics never mix
//! with the merged output on stdout. The level comes from `LOGWEAVE_LOG`
//! when set, otherwise from the `-v` count.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::WeaveError;

/// Environment variable overriding the diagnostic filter.
pub const LOG_ENV: &str = "LOGWEAVE_LOG";

/// Map `-v` occurrences to a default filter directive.
pub const fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the global tracing subscriber.
///
/// Must be called at most once, before any tracing macros are used.
pub fn init_tracing(verbose: u8) -> Result<(), WeaveError> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| WeaveError::Config(format!("failed to initialize logging: {e}")))
}
