//! Logging init: structured `tracing` output on stderr.

use tracing_subscriber::EnvFilter;

/// Default filter for a given `-v` count; `RUST_LOG` wins when set.
pub fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,magnet_debrid=info",
        _ => "info,magnet_debrid=debug",
    }
}

/// Initialize logging to stderr. Notifications and the summary go to the
/// terminal separately, so the default level stays quiet.
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
