#![allow(missing_docs)]

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Diagnostics go to stderr so stdout carries
/// only events.
pub fn init(color: bool, json: bool, levels: &str) {
    let filter = EnvFilter::try_new(levels).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    // A subscriber may already be installed, e.g. by tests.
    let _ = if json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.try_init()
    };
}
