//! Tracing subscriber setup.
//!
//! Verbosity maps onto the `pwm` target: 0 → warn, 1 → info, 2 → debug,
//! 3 and above → trace.  `RUST_LOG`, when set, takes precedence.

use tracing_subscriber::EnvFilter;

/// Log level for the crate target at `verbose`.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pwm={},warn", level_for(verbose))));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
