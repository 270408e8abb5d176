//! Diagnostics logging
//!
//! Console progress lines are written by [`crate::ui`]; this module only
//! installs the `tracing` subscriber used for debug diagnostics on stderr.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is not provided.
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Filter used by `--verbose`.
const VERBOSE_LOG_LEVEL: &str = "debug";

/// Configure and install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `verbose`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        VERBOSE_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
