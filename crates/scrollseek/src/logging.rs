//! Tracing setup.
//!
//! The engine only emits `tracing` events; binaries and tests opt into
//! output by installing a subscriber here. `RUST_LOG` overrides the default
//! filter.

use tracing_subscriber::EnvFilter;

use crate::result::{SeekError, SeekResult};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "scrollseek=info";

/// Install a global fmt subscriber writing to stderr.
///
/// # Errors
///
/// [`SeekError::Config`] if the filter cannot be parsed or a global
/// subscriber is already installed.
pub fn try_init_tracing(default_filter: &str) -> SeekResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| SeekError::config(format!("invalid log filter {default_filter:?}: {e}")))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| SeekError::config(format!("tracing already initialized: {e}")))
}

/// Install a global subscriber with [`DEFAULT_FILTER`]; later calls are no-ops
pub fn init_tracing() {
    let _ = try_init_tracing(DEFAULT_FILTER);
}
