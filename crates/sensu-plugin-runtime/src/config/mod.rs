//! Runtime configuration: schema, layered loading and validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ENV_PREFIX, FILE_STEM};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, RuntimeConfig, SpanEventConfig,
};
pub use validation::validate_config;

/// Loads the configuration from the default sources and validates it.
pub fn load_config() -> ConfigResult<RuntimeConfig> {
    load_with(ConfigLoader::new())
}

/// Loads the configuration through `loader` and validates it.
pub fn load_with(loader: ConfigLoader) -> ConfigResult<RuntimeConfig> {
    let config = loader.load()?;
    validate_config(&config)?;
    Ok(config)
}
