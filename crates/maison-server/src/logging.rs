//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. JSON output keeps the
/// target for structured queries; text output hides it.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry
            .with(fmt::layer().json().with_target(true).with_ansi(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    result.map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}
