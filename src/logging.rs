//! Diagnostic logging for the command-line tools
//!
//! Tool output goes to stdout and must stay byte-exact, so all log lines are
//! written to stderr.

use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Installs a global `tracing` subscriber writing to stderr
///
/// The filter is read from `RUST_LOG`. Calling this twice is harmless; the
/// second call leaves the first subscriber in place.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
