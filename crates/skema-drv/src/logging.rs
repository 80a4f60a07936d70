//! Logging setup for the `skema` binary.
//!
//! The library crates emit through the `log` facade; the binary
//! installs a `tracing-subscriber` stack whose log-compatibility
//! bridge picks those records up alongside native `tracing` events.
//! `--verbose` opens the debug level, otherwise info and up. Output
//! goes to stderr so the interpreter's own output stream stays clean.

use std::io;

use anyhow::anyhow;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. Fails if one is already set.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let format = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}
