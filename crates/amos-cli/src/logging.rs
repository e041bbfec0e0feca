//! Subscriber setup
//!
//! Logs go to stderr so reports on stdout stay pipeable.

use tracing_subscriber::EnvFilter;

/// Default filter for a `-v` count when `RUST_LOG` is unset
#[must_use]
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber; `RUST_LOG` wins over `verbosity`
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .try_init();
}
