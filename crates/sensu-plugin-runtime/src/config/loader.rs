//! Configuration loader using figment.
//!
//! # Sources (lowest to highest priority)
//!
//! 1. Built-in defaults
//! 2. The first `sensu-plugin.{toml,yaml,yml}` found in the search paths, or
//!    an explicit file set with [`ConfigLoader::file`]
//! 3. Environment variables (`SENSU_PLUGIN_*`)
//! 4. Programmatic overrides from [`ConfigLoader::merge`]
//!
//! Without explicit search paths the current directory and
//! `<config dir>/sensu-plugin` are searched, in that order.
//!
//! # Environment Variable Mapping
//!
//! Nested keys are separated by `__`:
//!
//! - `SENSU_PLUGIN_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `SENSU_PLUGIN_LOGGING__OUTPUT=file` → `logging.output = "file"`
//!
//! # Feature Flags
//!
//! - `toml-config`: search and accept `.toml` files
//! - `yaml-config`: search and accept `.yaml` / `.yml` files

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, trace};

use super::error::{ConfigError, ConfigResult};
use super::schema::RuntimeConfig;

/// Prefix of environment variables read by default.
pub const ENV_PREFIX: &str = "SENSU_PLUGIN_";

/// Base name of searched configuration files.
pub const FILE_STEM: &str = "sensu-plugin";

/// Extensions searched for in each search path, in order.
const EXTENSIONS: &[&str] = &[
    #[cfg(feature = "toml-config")]
    "toml",
    #[cfg(feature = "yaml-config")]
    "yaml",
    #[cfg(feature = "yaml-config")]
    "yml",
];

/// Layered configuration loader.
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("/etc/sensu/sensu-plugin.toml")
///     .load()?;
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    overrides: Vec<RuntimeConfig>,
    search_paths: Vec<PathBuf>,
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader with the default search paths and env prefix.
    pub fn new() -> Self {
        Self {
            overrides: Vec::new(),
            search_paths: Vec::new(),
            config_file: None,
            env_prefix: Some(ENV_PREFIX.to_string()),
        }
    }

    /// Adds a search path. The first one added replaces the defaults.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching. The file must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads environment variables with the given prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Ignores environment variables.
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Merges a configuration on top of every other source.
    pub fn merge(mut self, config: RuntimeConfig) -> Self {
        self.overrides.push(config);
        self
    }

    /// Loads the configuration.
    pub fn load(self) -> ConfigResult<RuntimeConfig> {
        let config: RuntimeConfig = self.figment()?.extract()?;

        debug!(
            level = %config.logging.level,
            output = ?config.logging.output,
            "Runtime configuration loaded"
        );
        Ok(config)
    }

    /// Builds the layered figment without extracting it.
    pub fn figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(RuntimeConfig::default()));

        match &self.config_file {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "Loading configuration file");
                figment = merge_file(figment, path)?;
            }
            Some(path) => return Err(ConfigError::FileNotFound(path.clone())),
            None => {
                if let Some(path) = self.find_file() {
                    debug!(path = %path.display(), "Loading configuration file");
                    figment = merge_file(figment, &path)?;
                } else {
                    trace!("No configuration file found");
                }
            }
        }

        if let Some(prefix) = &self.env_prefix {
            trace!(prefix = %prefix, "Loading environment variables");
            figment = figment.merge(Env::prefixed(prefix).split("__"));
        }

        for config in &self.overrides {
            figment = figment.merge(Serialized::defaults(config));
        }

        Ok(figment)
    }

    fn search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }

        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(FILE_STEM));
        }
        paths
    }

    /// First existing candidate, scanning paths before extensions.
    fn find_file(&self) -> Option<PathBuf> {
        self.search_paths().into_iter().find_map(|dir| {
            EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{FILE_STEM}.{ext}")))
                .find(|candidate| candidate.is_file())
        })
    }
}

/// Merges one file, dispatching on its extension.
fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}
