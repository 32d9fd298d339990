//! Process-wide `tracing` subscriber setup.

use std::io;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs a stderr formatter filtered by `RUST_LOG`.
///
/// Without `RUST_LOG` the level is `info`, or `debug` when `debug` is set.
/// Calling this twice keeps the first subscriber.
pub fn init(debug: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let _already_installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

const fn default_directive(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}
