//! Tracing subscriber setup.
//!
//! Level comes from `--log-level` when given, else `[logging] level`.
//! `RUST_LOG` directives are layered on top. Logs go to stderr so command
//! output on stdout stays clean.

use crate::config::{ConfigError, LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Resolve the base level: an explicit override wins over config.
pub fn level(logging: &LoggingConfig, override_level: Option<&str>) -> Result<LevelFilter, ConfigError> {
    match override_level {
        Some(raw) => LoggingConfig {
            level: raw.to_string(),
            format: logging.format,
        }
        .level_filter(),
        None => logging.level_filter(),
    }
}

/// Install the global subscriber. Call once, from `main`.
pub fn init(logging: &LoggingConfig, override_level: Option<&str>) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level(logging, override_level)?.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_config() {
        let config = LoggingConfig::default();
        assert_eq!(level(&config, Some("trace")).unwrap(), LevelFilter::TRACE);
        assert_eq!(level(&config, None).unwrap(), LevelFilter::INFO);
    }

    #[test]
    fn bad_override_is_rejected() {
        assert!(level(&LoggingConfig::default(), Some("chatty")).is_err());
    }
}
