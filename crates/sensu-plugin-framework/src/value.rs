//! Typed option values.

use std::fmt;

use crate::error::{OptionError, OptionResult};

/// The kinds of value an option can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// UTF-8 string.
    String,
    /// Unsigned 64-bit integer.
    Uint64,
    /// Boolean.
    Bool,
}

impl ValueKind {
    /// Returns the kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Uint64 => "uint64",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved or default option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    String(String),
    Uint64(u64),
    Bool(bool),
}

impl OptionValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Uint64(_) => ValueKind::Uint64,
            Self::Bool(_) => ValueKind::Bool,
        }
    }

    /// Coerces a textual value into `kind`.
    ///
    /// - strings are taken verbatim, empty included
    /// - integers are plain base 10 digits, no sign
    /// - booleans accept exactly `true` and `false`
    pub fn parse(kind: ValueKind, argument: &str, raw: &str) -> OptionResult<Self> {
        match kind {
            ValueKind::String => Ok(Self::String(raw.to_string())),
            ValueKind::Uint64 if raw.starts_with('+') => Err(OptionError::invalid_value(
                argument,
                raw,
                kind,
                "invalid digit found in string",
            )),
            ValueKind::Uint64 => raw
                .parse::<u64>()
                .map(Self::Uint64)
                .map_err(|e| OptionError::invalid_value(argument, raw, kind, e.to_string())),
            ValueKind::Bool => match raw {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(OptionError::invalid_value(
                    argument,
                    raw,
                    kind,
                    "expected `true` or `false`",
                )),
            },
        }
    }

    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint64(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Uint64(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        Self::Uint64(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
