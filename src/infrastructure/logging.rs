//! Tracing subscriber setup.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Installs the global `fmt` subscriber.
///
/// The filter comes from `RUST_LOG` when set and falls back to
/// [`Config::log_level`]. `LOG_FORMAT=json` switches to one JSON object per line.
///
/// # Errors
///
/// Returns an error if the log level cannot be parsed or a global subscriber
/// is already installed.
pub fn init(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if config.log_format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
