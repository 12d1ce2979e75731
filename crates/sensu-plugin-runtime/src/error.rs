//! Runtime error types.

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::rolling::InitError;
use tracing_subscriber::util::TryInitError;

use crate::config::ConfigError;

/// Errors raised while installing the log subscriber.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// File output without `file_path`.
    #[error("File output requested but no log file path configured")]
    MissingFilePath,

    #[error("Log file path has no file name: {}", .0.display())]
    InvalidFilePath(PathBuf),

    /// The rolling appender could not create its directory or file.
    #[error("Failed to open log file: {0}")]
    Appender(#[from] InitError),

    /// A global subscriber is already installed.
    #[error("Failed to install log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Errors that prevent a plugin from starting.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Result type for logging setup.
pub type LoggingResult<T> = Result<T, LoggingError>;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
