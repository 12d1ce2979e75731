//! Error types for option resolution and handler execution.

use sensu_plugin_core::EventError;
use thiserror::Error;

use crate::value::ValueKind;

/// Boxed error returned by handler callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while resolving option values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    /// The option has no value slot to write into.
    #[error("option value must be bound for option {argument}")]
    MissingValueSlot {
        /// Flag name of the option.
        argument: String,
    },

    /// A textual value could not be coerced into the option's type.
    #[error("invalid {kind} value {value:?} for option {argument}: {reason}")]
    InvalidValue {
        /// Flag name of the option.
        argument: String,
        /// The offending text.
        value: String,
        /// Target kind.
        kind: ValueKind,
        /// Parser diagnostic.
        reason: String,
    },

    /// The option's slot holds a type the resolver cannot coerce into.
    #[error("unsupported type {type_name} for option {argument}")]
    UnsupportedType {
        /// Flag name of the option.
        argument: String,
        /// Concrete type behind the slot.
        type_name: &'static str,
    },

    /// The declared default does not match the slot type.
    #[error("default for option {argument} is {found}, expected {expected}")]
    DefaultTypeMismatch {
        /// Flag name of the option.
        argument: String,
        /// Kind of the slot.
        expected: ValueKind,
        /// Kind of the default.
        found: ValueKind,
    },

    /// The slot was already written.
    #[error("value for option {argument} was already set")]
    SlotAlreadySet {
        /// Flag name of the option.
        argument: String,
    },
}

impl OptionError {
    /// Creates an invalid value error.
    pub fn invalid_value(
        argument: impl Into<String>,
        value: impl Into<String>,
        kind: ValueKind,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            argument: argument.into(),
            value: value.into(),
            kind,
            reason: reason.into(),
        }
    }

    /// Creates a missing value slot error.
    pub fn missing_slot(argument: impl Into<String>) -> Self {
        Self::MissingValueSlot {
            argument: argument.into(),
        }
    }
}

/// Result type for option resolution.
pub type OptionResult<T> = Result<T, OptionError>;

/// Errors returned by [`Handler::execute`](crate::Handler::execute).
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The command line could not be parsed, or help was requested.
    #[error(transparent)]
    Arguments(#[from] clap::Error),

    /// The input could not be read or decoded into an event.
    #[error("Failed to unmarshal STDIN data: {0}")]
    Unmarshal(String),

    /// The event failed structural validation.
    #[error(transparent)]
    Event(#[from] EventError),

    /// An option could not be resolved.
    #[error(transparent)]
    Option(#[from] OptionError),

    /// The validation callback rejected the event.
    #[error("error validating input: {0}")]
    Validation(#[source] BoxError),

    /// The execution callback failed.
    #[error("error executing handler: {0}")]
    Execution(#[source] BoxError),
}

impl HandlerError {
    /// Returns `true` if the error only carries help or version output.
    pub fn is_display_request(&self) -> bool {
        matches!(
            self,
            Self::Arguments(e) if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            )
        )
    }
}

/// Result type for handler execution.
pub type HandlerResult<T> = Result<T, HandlerError>;
