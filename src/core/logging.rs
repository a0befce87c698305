//! Logging initialization
//!
//! The rest of the crate logs through the `log` macros; tracing-subscriber's
//! default `tracing-log` bridge picks those records up.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize the global logger.
///
/// Honors `RUST_LOG`; defaults to `info` when unset.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_logger() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}
