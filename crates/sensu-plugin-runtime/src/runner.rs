//! Process wiring: configuration, logging, one handler run, exit code.
//!
//! ```rust,ignore
//! fn main() -> ExitCode {
//!     let handler = Handler::new(config, options, validate, execute);
//!     sensu_plugin_runtime::run(handler)
//! }
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use sensu_plugin_framework::{Handler, HandlerResult};
use tracing::debug;

use crate::config::{self, ConfigLoader};
use crate::error::RuntimeResult;
use crate::logging;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Both callbacks succeeded.
    Success,
    /// `--help` was requested and printed.
    Help,
    /// Anything else.
    Failure,
}

impl Outcome {
    /// Process exit status.
    pub fn code(self) -> u8 {
        match self {
            Self::Success | Self::Help => 0,
            Self::Failure => 1,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome.code())
    }
}

/// Runs `handler` with the default runner.
pub fn run(handler: Handler) -> ExitCode {
    PluginRunner::new().run(handler)
}

/// Loads runtime configuration, installs logging and runs one handler.
#[derive(Debug)]
pub struct PluginRunner {
    loader: ConfigLoader,
    init_logging: bool,
}

impl Default for PluginRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRunner {
    pub fn new() -> Self {
        Self {
            loader: ConfigLoader::new(),
            init_logging: true,
        }
    }

    /// Replaces the configuration loader.
    pub fn config_loader(mut self, loader: ConfigLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Leaves the global subscriber alone.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Runs the handler and reports to the process stdout and stderr.
    pub fn run(self, handler: Handler) -> ExitCode {
        let mut stdout = io::stdout().lock();
        let mut stderr = io::stderr().lock();
        self.run_with(handler, &mut stdout, &mut stderr).into()
    }

    /// Runs the handler and reports to the given writers.
    pub fn run_with(
        self,
        mut handler: Handler,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> Outcome {
        if let Err(e) = self.setup() {
            let _ = writeln!(err, "Error: {e}");
            return Outcome::Failure;
        }
        report(handler.execute(), out, err)
    }

    fn setup(self) -> RuntimeResult<()> {
        let config = config::load_with(self.loader)?;
        if self.init_logging {
            logging::init_from_config(&config.logging)?;
        }
        Ok(())
    }
}

/// Writes the result of a run and maps it to an [`Outcome`].
///
/// Help goes to `out`; errors go to `err` as `Error: <message>` and are
/// only logged at debug level so they are not printed twice.
pub fn report(result: HandlerResult<()>, out: &mut impl Write, err: &mut impl Write) -> Outcome {
    match result {
        Ok(()) => Outcome::Success,
        Err(e) if e.is_display_request() => {
            let _ = write!(out, "{e}");
            debug!("Help displayed");
            Outcome::Help
        }
        Err(e) => {
            debug!(error = %e, "Handler failed");
            let _ = writeln!(err, "Error: {e}");
            Outcome::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use sensu_plugin_core::EventError;
    use sensu_plugin_framework::{BoxError, HandlerConfig, HandlerConfigOption, HandlerError, Slot};

    const EVENT: &str = r#"{
        "timestamp": 1700000000,
        "entity": {"metadata": {"name": "web-01"}},
        "check": {"metadata": {"name": "disk"}, "status": 2}
    }"#;

    fn handler(input: &str, args: &[&str], fail: bool) -> Handler {
        // `Handler::new` snapshots the process environment.
        let _env = crate::env_lock();
        let level = Slot::<String>::new();
        let options = vec![
            HandlerConfigOption::new("level", "info")
                .shorthand('l')
                .usage("Level to log at")
                .bind(&level),
        ];
        Handler::new(
            HandlerConfig::new("runner-test", "Runner test handler"),
            options,
            |_event| Ok(()),
            move |_event| -> Result<(), BoxError> {
                if fail {
                    return Err("boom".into());
                }
                Ok(())
            },
        )
        .with_reader(std::io::Cursor::new(input.as_bytes().to_vec()))
        .with_args(args.iter().copied())
        .with_env(Vec::<(String, String)>::new())
    }

    fn quiet_runner(dir: &tempfile::TempDir) -> PluginRunner {
        PluginRunner::new()
            .config_loader(ConfigLoader::new().search_path(dir.path()).without_env())
            .without_logging()
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Success.code(), 0);
        assert_eq!(Outcome::Help.code(), 0);
        assert_eq!(Outcome::Failure.code(), 1);
    }

    #[test]
    fn test_success() {
        let dir = tempfile::tempdir().unwrap();
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let outcome = quiet_runner(&dir).run_with(handler(EVENT, &[], false), &mut out, &mut err);
        assert_eq!(outcome, Outcome::Success);
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn test_help_goes_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let outcome =
            quiet_runner(&dir).run_with(handler("", &["--help"], false), &mut out, &mut err);
        assert_eq!(outcome, Outcome::Help);

        let help = String::from_utf8(out).unwrap();
        assert!(help.contains("Runner test handler"));
        assert!(help.contains("--level"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_execution_error_goes_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let outcome = quiet_runner(&dir).run_with(handler(EVENT, &[], true), &mut out, &mut err);
        assert_eq!(outcome, Outcome::Failure);
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "Error: error executing handler: boom\n"
        );
    }

    #[test]
    fn test_invalid_event_goes_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let outcome = quiet_runner(&dir).run_with(
            handler(r#"{"timestamp": 0}"#, &[], false),
            &mut out,
            &mut err,
        );
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(
            String::from_utf8(err).unwrap(),
            format!("Error: {}\n", EventError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_bad_config_fails_before_run() {
        let dir = tempfile::tempdir().unwrap();
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let runner = PluginRunner::new()
            .config_loader(
                ConfigLoader::new()
                    .file(dir.path().join("missing.toml"))
                    .without_env(),
            )
            .without_logging();
        let outcome = runner.run_with(handler(EVENT, &[], false), &mut out, &mut err);

        assert_eq!(outcome, Outcome::Failure);
        assert!(
            String::from_utf8(err)
                .unwrap()
                .starts_with("Error: Configuration file not found")
        );
    }

    #[test]
    fn test_report_unknown_flag() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let clap_error = clap_error();

        let outcome = report(Err(clap_error), &mut out, &mut err);
        assert_eq!(outcome, Outcome::Failure);
        assert!(String::from_utf8(err).unwrap().starts_with("Error: "));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failure_reported_once_at_default_level() {
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let outcome = tracing::subscriber::with_default(subscriber, || {
            report(
                Err(HandlerError::Unmarshal("EOF".into())),
                &mut out,
                &mut err,
            )
        });

        assert_eq!(outcome, Outcome::Failure);
        assert!(logs.0.lock().unwrap().is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "Error: Failed to unmarshal STDIN data: EOF\n"
        );
    }

    fn clap_error() -> HandlerError {
        let mut h = handler(EVENT, &["--nope"], false);
        h.execute().unwrap_err()
    }
}
