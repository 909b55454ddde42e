//! Logging setup

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a `tracing` subscriber at `level`; `RUST_LOG` takes precedence.
///
/// Only the first call installs a subscriber. Later calls keep the existing
/// one and return `Ok`; an invalid `level` is still an error.
pub fn setup_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    if let Err(err) = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .with(filter)
        .try_init()
    {
        debug!(%err, "global subscriber already installed, keeping it");
    }

    Ok(())
}
