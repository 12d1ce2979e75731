//! Logging setup on top of `tracing-subscriber`.
//!
//! Logs go to stderr unless configured otherwise so they never mix with
//! handler output on stdout.
//!
//! ```rust,ignore
//! use sensu_plugin_runtime::{config, logging};
//!
//! let config = config::load_config()?;
//! logging::init_from_config(&config.logging)?;
//!
//! // or by hand
//! LoggingBuilder::new()
//!     .level(LogLevel::Debug)
//!     .directive("sensu_plugin_framework=trace")
//!     .try_init()?;
//! ```

use std::path::Path;

use tracing_appender::rolling::{Builder as AppenderBuilder, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};
use crate::error::{LoggingError, LoggingResult};

/// Installs the global subscriber described by `config`.
///
/// Fails if a global subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) -> LoggingResult<()> {
    LoggingBuilder::from_config(config).try_init()
}

/// Builder for the global `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    directives: Vec<String>,
    with_target: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Builder with the default [`LoggingConfig`].
    pub fn new() -> Self {
        Self::from_config(&LoggingConfig::default())
    }

    /// Builder mirroring a loaded configuration.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut directives: Vec<String> = config
            .filters
            .iter()
            .map(|(target, level)| format!("{target}={level}"))
            .collect();
        directives.sort();

        Self {
            config: config.clone(),
            directives,
            with_target: true,
        }
    }

    /// Sets the global level.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Adds a filter directive such as `sensu_plugin_framework=trace`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.config.output = output;
        self
    }

    /// Routes output to a file, switching `output` to [`LogOutput::File`].
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.config.output = LogOutput::File;
        self.config.file_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn span_events(mut self, events: SpanEventConfig) -> Self {
        self.config.span_events = events;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.config.thread_ids = enabled;
        self
    }

    /// Include source file and line number.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.config.file_location = enabled;
        self
    }

    /// `RUST_LOG` if set, otherwise the configured level, plus directives.
    /// Directives that fail to parse are skipped.
    fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_str()));

        for directive in &self.directives {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }

    fn writer(&self) -> LoggingResult<BoxMakeWriter> {
        match self.config.output {
            LogOutput::Stdout => Ok(BoxMakeWriter::new(std::io::stdout)),
            LogOutput::Stderr => Ok(BoxMakeWriter::new(std::io::stderr)),
            LogOutput::File => {
                let path = self
                    .config
                    .file_path
                    .as_deref()
                    .ok_or(LoggingError::MissingFilePath)?;
                let name = path
                    .file_name()
                    .ok_or_else(|| LoggingError::InvalidFilePath(path.to_path_buf()))?;
                let dir = match path.parent() {
                    Some(dir) if !dir.as_os_str().is_empty() => dir,
                    _ => Path::new("."),
                };

                let mut builder = AppenderBuilder::new()
                    .rotation(rotation(self.config.rotation))
                    .filename_prefix(name.to_string_lossy());
                if self.config.max_files > 0 {
                    builder = builder.max_log_files(self.config.max_files as usize);
                }
                Ok(BoxMakeWriter::new(builder.build(dir)?))
            }
        }
    }

    fn layer(&self) -> LoggingResult<Box<dyn Layer<Registry> + Send + Sync>> {
        let writer = self.writer()?;
        let span_events = fmt_span(&self.config.span_events);
        let base = fmt::layer()
            .with_writer(writer)
            .with_span_events(span_events)
            .with_target(self.with_target)
            .with_thread_ids(self.config.thread_ids)
            .with_file(self.config.file_location)
            .with_line_number(self.config.file_location);

        let layer = match self.config.format {
            LogFormat::Compact => base.compact().boxed(),
            LogFormat::Full => base.boxed(),
            LogFormat::Pretty => base.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => base.json().boxed(),
        };
        Ok(layer)
    }

    /// Installs the subscriber globally.
    pub fn try_init(self) -> LoggingResult<()> {
        let layer = self.layer()?;
        tracing_subscriber::registry()
            .with(layer)
            .with(self.filter())
            .try_init()?;
        Ok(())
    }
}

fn fmt_span(events: &SpanEventConfig) -> FmtSpan {
    let mut span = FmtSpan::NONE;
    if events.new {
        span |= FmtSpan::NEW;
    }
    if events.enter {
        span |= FmtSpan::ENTER;
    }
    if events.exit {
        span |= FmtSpan::EXIT;
    }
    if events.close {
        span |= FmtSpan::CLOSE;
    }
    span
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Never => Rotation::NEVER,
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_become_sorted_directives() {
        let mut config = LoggingConfig::default();
        config
            .filters
            .insert("sensu_plugin_framework".into(), LogLevel::Trace);
        config.filters.insert("figment".into(), LogLevel::Error);

        let builder = LoggingBuilder::from_config(&config).directive("tempfile=off");
        assert_eq!(
            builder.directives,
            ["figment=error", "sensu_plugin_framework=trace", "tempfile=off"]
        );
    }

    #[test]
    fn test_span_events() {
        assert_eq!(fmt_span(&SpanEventConfig::default()), FmtSpan::NONE);

        let events = SpanEventConfig {
            new: true,
            close: true,
            ..Default::default()
        };
        assert_eq!(fmt_span(&events), FmtSpan::NEW | FmtSpan::CLOSE);
    }

    #[test]
    fn test_file_output_without_path() {
        let builder = LoggingBuilder::new().output(LogOutput::File);
        assert!(matches!(
            builder.writer(),
            Err(LoggingError::MissingFilePath)
        ));
    }

    #[test]
    fn test_file_output_creates_appender() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handler.log");

        let builder = LoggingBuilder::new().file(&path);
        assert_eq!(builder.config.output, LogOutput::File);
        assert!(builder.layer().is_ok());
    }

    #[test]
    fn test_stderr_is_default_output() {
        let builder = LoggingBuilder::new();
        assert_eq!(builder.config.output, LogOutput::Stderr);
        assert!(builder.layer().is_ok());
    }
}
