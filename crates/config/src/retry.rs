use crate::ConfigError;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts for a retried operation
    ///
    /// Env: RETRIEVER_RETRY_MAX_ATTEMPTS
    /// Must be at least 1
    /// Default: 3
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts, in milliseconds
    ///
    /// Env: RETRIEVER_RETRY_INTER_ATTEMPT_DELAY_MS
    /// Default: 0
    #[serde(default)]
    pub inter_attempt_delay_ms: u64,

    /// Whether to keep retrying when the fallback itself fails
    ///
    /// Env: RETRIEVER_RETRY_RETRY_ON_FALLBACK_ERROR
    /// Default: true
    #[serde(default = "default_retry_on_fallback_error")]
    pub retry_on_fallback_error: bool,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_on_fallback_error() -> bool {
    true
}

impl RetryConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ValidateError(
                "Retry max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            inter_attempt_delay_ms: 0,
            retry_on_fallback_error: default_retry_on_fallback_error(),
        }
    }
}
