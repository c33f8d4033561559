//! Tracing subscriber setup.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Overrides `RUST_LOG` when set.
pub const LOG_ENV: &str = "PLANT_SIM_LOG";

/// Builds the event filter.
///
/// `PLANT_SIM_LOG` wins, then `RUST_LOG`, then `default_level`. An invalid
/// directive falls back to `default_level` with a note on stderr.
pub fn build_filter(default_level: &str) -> EnvFilter {
    let fallback = || EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("info"));
    match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(&directive).unwrap_or_else(|err| {
            eprintln!("invalid {LOG_ENV} directive ({err}); using \"{default_level}\"");
            fallback()
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
    }
}

/// Installs the global subscriber, writing to stderr so stdout stays free
/// for snapshot output.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(default_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
