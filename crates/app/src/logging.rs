//! Tracing subscriber setup

use assessor_domain::{AssessorError, LoggingConfig, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured filter.
///
/// # Errors
/// Returns `AssessorError::Config` for an invalid filter directive or when a
/// global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|e| {
            AssessorError::Config(format!("invalid log filter {:?}: {e}", config.filter))
        })?,
    };

    let builder = fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| AssessorError::Config(format!("tracing already initialised: {e}")))
}
