//! Tracing subscriber setup for binaries and tests embedding this crate.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level '{level}': {source}")]
    InvalidLogLevel {
        level: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to initialize the tracing subscriber: {0}")]
    InitError(String),
}

/// Initialize tracing with the given level filter.
///
/// `json_format` switches the console layer to JSON output. Fails if a
/// global subscriber is already installed.
pub fn init(level: &str, json_format: bool) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(level).map_err(|source| LoggingError::InvalidLogLevel {
        level: level.to_string(),
        source,
    })?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if json_format {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    };

    result.map_err(|e| LoggingError::InitError(e.to_string()))
}

/// Initialize tracing from a [`config::LogConfig`].
pub fn init_from_config(config: &config::LogConfig) -> Result<(), LoggingError> {
    init(&config.level, config.json)
}
