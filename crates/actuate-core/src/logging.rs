//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::{GeneralConfig, LogFormat};
use crate::error::{ActuateError, Result};

/// Build the env filter: `RUST_LOG` wins, then the configured level.
pub fn env_filter(config: &GeneralConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Install the global fmt subscriber.
///
/// Fails if a global subscriber has already been set.
pub fn init(config: &GeneralConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(config));
    let installed = match config.log_format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    installed.map_err(|e| ActuateError::Logging(e.to_string()))
}
