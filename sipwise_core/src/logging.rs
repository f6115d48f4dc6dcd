//! Tracing setup for the sipwise binary.
//!
//! Diagnostics always go to stderr: stdout carries estimates and `--json`
//! reports that other tools parse.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for a `-v` count: warn, then info, then debug and trace
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber for a CLI run with `verbosity` `-v` flags.
///
/// `RUST_LOG`, when set, replaces the verbosity-derived filter.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Route engine logs through the test harness's captured output
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
