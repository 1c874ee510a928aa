use crate::ConfigError;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log Level
    ///
    /// Env: RETRIEVER_LOG_LEVEL
    /// Valid values: trace, debug, info, warn, error
    /// Default: info
    #[serde(default = "default_level")]
    pub level: String,

    /// Output logs in JSON format
    ///
    /// Env: RETRIEVER_LOG_JSON
    /// Default: false
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl LogConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];

        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::ValidateError(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
