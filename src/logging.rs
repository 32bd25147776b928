//! Tracing subscriber setup
//!
//! Diagnostics go to stderr so stdout only carries the report.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `RUST_LOG` takes precedence; otherwise the
/// crate logs at `info`, or `debug` when `verbose` is set.
pub fn init(verbose: bool) {
    let default_level = if verbose { "churnforge=debug" } else { "churnforge=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second call (e.g. from tests) leaves the first subscriber in place.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
