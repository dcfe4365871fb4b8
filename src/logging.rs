//! Tracing subscriber setup for binaries

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LogSettings};

/// Install a global fmt subscriber writing to stderr
///
/// `RUST_LOG` wins over `settings.filter`. Calling this more than once is a
/// no-op.
pub fn init_logging(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Ignore "already set" so tests and embedders can call this freely
    let _ = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}
