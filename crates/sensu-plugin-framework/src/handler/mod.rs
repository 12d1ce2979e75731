//! Handler execution.
//!
//! A [`Handler`] ties together the event read from stdin, the declared
//! options and two callbacks:
//!
//! ```text
//! args ──▶ flags ─────────────────────────────┐
//! stdin ─▶ bytes ─▶ Event ─▶ validate_event ─▶ resolve options ─▶ validate() ─▶ execute()
//! env ────────────────────────────────────────┘
//! ```
//!
//! Every step gates the next one. Errors from the callbacks are wrapped so
//! that callers can tell input problems from handler problems; every other
//! error is returned as is.
//!
//! # Example
//!
//! ```rust,ignore
//! use sensu_plugin_framework::{Handler, HandlerConfig, HandlerConfigOption, Slot};
//!
//! let url = Slot::<String>::new();
//! let config = HandlerConfig::new("webhook-handler", "Posts events to a webhook")
//!     .keyspace("sensu.io/plugins/webhook/config");
//! let options = vec![
//!     HandlerConfigOption::new("url", "").env("WEBHOOK_URL").path("url").bind(&url),
//! ];
//!
//! let check_url = url.clone();
//! let mut handler = Handler::new(
//!     config,
//!     options,
//!     move |_event| {
//!         if check_url.value_or_default().is_empty() {
//!             return Err("url must be set".into());
//!         }
//!         Ok(())
//!     },
//!     move |event| {
//!         post(&url.value_or_default(), event)?;
//!         Ok(())
//!     },
//! );
//! handler.execute()?;
//! ```

use std::ffi::OsString;
use std::fmt;
use std::io::Read;

use sensu_plugin_core::{Event, EventError};
use tracing::{debug, debug_span, info};

use crate::command::parse_command_line;
use crate::error::{BoxError, HandlerError, HandlerResult};
use crate::option::{HandlerConfig, HandlerConfigOption};
use crate::resolver::{Environment, OptionResolver, ResolvedOptions};

/// Callback invoked with the validated event.
pub type EventFn = Box<dyn FnMut(&Event) -> Result<(), BoxError>>;

/// A handler plugin: configuration, options and the two callbacks.
pub struct Handler {
    config: HandlerConfig,
    options: Vec<HandlerConfigOption>,
    validate: EventFn,
    execute: EventFn,
    reader: Box<dyn Read>,
    args: Vec<OsString>,
    env: Environment,
    event: Option<Event>,
    resolved: ResolvedOptions,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("config", &self.config)
            .field("options", &self.options)
            .field("args", &self.args)
            .field("event", &self.event)
            .field("resolved", &self.resolved)
            .finish_non_exhaustive()
    }
}

impl Handler {
    /// Creates a handler reading from stdin, with the process arguments and
    /// a snapshot of the process environment.
    pub fn new<V, E>(
        config: HandlerConfig,
        options: Vec<HandlerConfigOption>,
        validate: V,
        execute: E,
    ) -> Self
    where
        V: FnMut(&Event) -> Result<(), BoxError> + 'static,
        E: FnMut(&Event) -> Result<(), BoxError> + 'static,
    {
        Self {
            config,
            options,
            validate: Box::new(validate),
            execute: Box::new(execute),
            reader: Box::new(std::io::stdin()),
            args: std::env::args_os().skip(1).collect(),
            env: process_environment(),
            event: None,
            resolved: ResolvedOptions::default(),
        }
    }

    /// Replaces the event source.
    pub fn with_reader(mut self, reader: impl Read + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// Replaces the command line arguments (without the program name).
    pub fn with_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the environment visible to option resolution.
    pub fn with_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = env.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Handler configuration.
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Declared options.
    pub fn options(&self) -> &[HandlerConfigOption] {
        &self.options
    }

    /// Event of the last run that reached the callbacks.
    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    /// Options resolved during the last run.
    pub fn resolved(&self) -> &ResolvedOptions {
        &self.resolved
    }

    /// Runs the handler once.
    pub fn execute(&mut self) -> HandlerResult<()> {
        let span = debug_span!("handler", name = %self.config.name);
        let _guard = span.enter();

        self.event = None;
        self.resolved = ResolvedOptions::default();

        let command_line = parse_command_line(&self.config, &self.options, self.args.clone())?;

        let event = self.read_event()?;
        event.validate()?;
        debug!(event = %event.summary(), timestamp = event.timestamp, "Event accepted");

        let resolver = OptionResolver::new(&self.config, &command_line, &self.env);
        self.resolved = resolver.resolve_all(&self.options, &event)?;
        let event = self.event.insert(event);

        (self.validate)(event).map_err(HandlerError::Validation)?;
        debug!("Input validated");

        (self.execute)(event).map_err(HandlerError::Execution)?;
        info!(event = %event.summary(), "Handler executed");

        Ok(())
    }

    fn read_event(&mut self) -> HandlerResult<Event> {
        let mut bytes = Vec::new();
        self.reader
            .read_to_end(&mut bytes)
            .map_err(|e| HandlerError::Unmarshal(e.to_string()))?;
        debug!(len = bytes.len(), "Read event input");

        let event: Option<Event> =
            serde_json::from_slice(&bytes).map_err(|e| HandlerError::Unmarshal(e.to_string()))?;
        event.ok_or(HandlerError::Event(EventError::Missing))
    }
}

/// Snapshot of the process environment, skipping entries that are not
/// valid UTF-8.
fn process_environment() -> Environment {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}
