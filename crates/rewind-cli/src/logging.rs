#![forbid(unsafe_code)]

//! Process-wide `tracing` setup for the shell.
//!
//! Logs go to stderr so that stdout carries only shell output. `RUST_LOG`
//! takes precedence over the configured level.

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

/// Build the filter: `RUST_LOG` if set and valid, else `fallback`.
pub fn filter(fallback: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(fallback).map_err(|err| CliError::Logging {
            message: format!("invalid filter {fallback:?}: {err}"),
        }),
    }
}

/// Install the global fmt subscriber.
///
/// A subscriber that is already installed (tests, embedding) is left in place.
pub fn init(fallback: &str) -> Result<()> {
    let filter = filter(fallback)?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Err(err) = installed {
        debug!(error = %err, "keeping existing tracing subscriber");
    }
    Ok(())
}
