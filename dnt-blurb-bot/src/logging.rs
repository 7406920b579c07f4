//! Logging setup using `tracing-subscriber`.
//!
//! Human-readable output on stderr by default, one JSON object per line
//! with `--json-logs` (for log shippers). The filter comes from `RUST_LOG`,
//! falling back to the configured level.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Call once, early in `main`.
pub fn init(default_level: &str, json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
