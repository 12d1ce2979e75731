//! # Sensu Plugin
//!
//! Harness for Sensu event handler plugins. A handler declares its options,
//! supplies a validate and an execute callback, and gets:
//!
//! - the event read from stdin and checked for a timestamp, entity and check
//! - every option resolved from, in priority order, its command line flag,
//!   its environment variable, a check annotation, an entity annotation, or
//!   its default
//! - `--help` generated from the declarations
//! - logging and an exit code
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sensu_plugin::prelude::*;
//!
//! fn main() -> ExitCode {
//!     let url = Slot::<String>::new();
//!     let options = vec![
//!         HandlerConfigOption::new("url", "http://localhost:8080")
//!             .shorthand('u')
//!             .env("WEBHOOK_URL")
//!             .path("url")
//!             .usage("Webhook URL")
//!             .bind(&url),
//!     ];
//!     let config = HandlerConfig::new("webhook-handler", "Posts events to a webhook")
//!         .keyspace("sensu.io/plugins/webhook-handler/config");
//!
//!     let handler = Handler::new(config, options, |_| Ok(()), move |event| {
//!         info!(url = %url.value_or_default(), event = %event.summary(), "Posting");
//!         Ok(())
//!     });
//!     run(handler)
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: `sensu-plugin.toml` runtime configuration
//! - `yaml-config`: `sensu-plugin.yaml` runtime configuration
//! - `json-log`: JSON log format

pub use sensu_plugin_core as core;
pub use sensu_plugin_framework as framework;
pub use sensu_plugin_runtime as runtime;

/// Prelude module for convenient imports.
pub mod prelude {
    // Event model
    pub use sensu_plugin_core::{Check, CheckState, Entity, Event, EventError, ObjectMeta};

    // Declaring and resolving options
    pub use sensu_plugin_framework::{
        BoxError, Handler, HandlerConfig, HandlerConfigOption, HandlerError, HandlerResult,
        OptionSource, OptionValue, ResolvedOptions, Slot,
    };

    // Running
    pub use sensu_plugin_runtime::{PluginRunner, run};
    pub use std::process::ExitCode;

    // Logging macros
    pub use sensu_plugin_runtime::tracing::{debug, error, info, trace, warn};
}
