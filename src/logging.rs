//! Tracing subscriber setup.
//!
//! All crate logging goes through [`tracing`]; call [`init`] once at startup
//! to install a formatted subscriber. Verbosity follows `RUST_LOG`
//! (e.g. `RUST_LOG=waypoint=debug`), defaulting to `info`.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Repeated calls are no-ops, so tests may call this freely.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
