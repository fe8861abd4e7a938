//! Tracing initialization.
//!
//! Log output goes to stdout through a `tracing-subscriber` fmt layer. The filter comes from
//! `RUST_LOG` when set, otherwise from `logging.level` in the configuration, so
//!
//! ```bash
//! RUST_LOG=catalog=debug,tower_http=info catalog
//! ```
//!
//! overrides whatever the config file says. `logging.format` picks between the compact
//! single-line format and the multi-line pretty one.

use crate::config::{LogFormat, LoggingConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Build the filter from `RUST_LOG`, falling back to the configured level
fn env_filter(config: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.level)?),
    }
}

/// Initialize the global tracing subscriber.
///
/// Fails if the configured level is not a valid filter directive or a subscriber is already set.
pub fn init_telemetry(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = env_filter(config)?;

    match config.format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?,
    }

    info!(format = ?config.format, "Telemetry initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        // only meaningful when RUST_LOG does not take precedence
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "catalog=loud".to_string(),
            format: LogFormat::Compact,
        };
        assert!(env_filter(&config).is_err());
    }

    #[test]
    fn test_directives_are_accepted() {
        let config = LoggingConfig {
            level: "info,catalog=debug,sqlx=warn".to_string(),
            format: LogFormat::Pretty,
        };
        assert!(env_filter(&config).is_ok());
    }
}
