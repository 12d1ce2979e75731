//! Event validation error types.

use thiserror::Error;

/// Structural problems detected in an incoming event.
///
/// Only the first violated rule is ever reported, in the order the variants
/// are declared (after [`EventError::Missing`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The input decoded to nothing (e.g. a JSON `null`).
    #[error("event is missing")]
    Missing,

    /// The timestamp is absent or not strictly positive.
    #[error("timestamp is missing or must be greater than zero")]
    InvalidTimestamp,

    /// The event carries no entity.
    #[error("entity is missing from event")]
    MissingEntity,

    /// The entity has an empty name.
    #[error("entity name must not be empty")]
    InvalidEntityName,

    /// The event carries no check.
    #[error("check is missing from event")]
    MissingCheck,

    /// The check has an empty name.
    #[error("check name must not be empty")]
    InvalidCheckName,
}

/// Result type for event validation.
pub type EventResult<T> = Result<T, EventError>;
