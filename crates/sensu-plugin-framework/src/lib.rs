//! # Sensu Plugin Framework
//!
//! Option resolution and execution for handler plugins.
//!
//! - **Options**: [`HandlerConfig`], [`HandlerConfigOption`], typed
//!   [`OptionValue`]s and write-once [`Slot`]s
//! - **Flags**: [`build_command`] turns option declarations into a clap
//!   command
//! - **Resolution**: [`OptionResolver`] merges command line, environment,
//!   check annotations, entity annotations and defaults
//! - **Execution**: [`Handler`] reads the event, validates it, resolves the
//!   options and runs the validate and execute callbacks

pub mod command;
pub mod error;
pub mod handler;
pub mod option;
pub mod resolver;
pub mod slot;
pub mod value;

pub use command::{CommandLineValues, build_command, parse_command_line};
pub use error::{BoxError, HandlerError, HandlerResult, OptionError, OptionResult};
pub use handler::{EventFn, Handler};
pub use option::{HandlerConfig, HandlerConfigOption};
pub use resolver::{
    Environment, OptionResolver, OptionSource, ResolvedOptions, set_option_value,
};
pub use slot::{ErasedSlot, Slot};
pub use value::{OptionValue, ValueKind};
