mod args;
mod error;
mod log;
mod retry;
mod substrate;

pub use args::Args;
pub use error::ConfigError;
pub use log::LogConfig;
pub use retry::RetryConfig;
pub use substrate::SubstrateConfig;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RetrieverConfig {
    #[serde(default)]
    pub substrate: SubstrateConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl RetrieverConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = envy::prefixed("RETRIEVER_").from_env::<Self>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.substrate.validate()?;
        self.retry.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            substrate: SubstrateConfig::default(),
            retry: RetryConfig::default(),
            log: LogConfig::default(),
        }
    }
}
