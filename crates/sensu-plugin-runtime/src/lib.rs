//! # Sensu Plugin Runtime
//!
//! Everything around a handler run that is not option resolution:
//!
//! - [`config`]: layered [`RuntimeConfig`] loading with figment
//!   (defaults, `sensu-plugin.toml`, `SENSU_PLUGIN_*` variables, overrides)
//! - [`logging`]: a `tracing-subscriber` setup writing to stderr by default
//! - [`runner`]: loads both, runs one [`Handler`](sensu_plugin_framework::Handler)
//!   and turns the result into an exit code
//!
//! ```rust,ignore
//! fn main() -> std::process::ExitCode {
//!     sensu_plugin_runtime::run(build_handler())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runner;

pub use config::{ConfigError, ConfigLoader, ConfigResult, LoggingConfig, RuntimeConfig};
pub use error::{LoggingError, LoggingResult, RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, init_from_config};
pub use runner::{Outcome, PluginRunner, report, run};

// Re-export tracing for use by handler crates
pub use tracing;
pub use tracing_subscriber;

/// Serializes tests that read or write the process environment.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
