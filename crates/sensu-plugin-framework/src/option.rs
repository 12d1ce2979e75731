//! Handler identity and option declarations.

use std::time::Duration;

use crate::slot::{ErasedSlot, Slot};
use crate::value::{OptionValue, ValueKind};

/// Static identity of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Handler name, also the command name in help output.
    pub name: String,
    /// One-line description.
    pub short: String,
    /// Execution timeout enforced by the host, not by the handler.
    pub timeout: Duration,
    /// Annotation namespace, e.g. `sensu.io/plugins/slack/config`.
    ///
    /// Empty disables annotation lookups.
    pub keyspace: String,
}

impl HandlerConfig {
    /// Creates a config with no keyspace and a ten second timeout.
    pub fn new(name: impl Into<String>, short: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: short.into(),
            timeout: Duration::from_secs(10),
            keyspace: String::new(),
        }
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the annotation keyspace.
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = keyspace.into();
        self
    }

    /// Full annotation key for `path`, or `None` when no keyspace is set.
    pub fn annotation_key(&self, path: &str) -> Option<String> {
        if self.keyspace.is_empty() {
            None
        } else {
            Some(format!("{}/{}", self.keyspace, path))
        }
    }
}

/// One configurable value and all the places it can come from.
///
/// # Example
///
/// ```rust,ignore
/// let webhook = Slot::<String>::new();
///
/// let option = HandlerConfigOption::new("webhook-url", "")
///     .shorthand('w')
///     .env("SLACK_WEBHOOK_URL")
///     .path("webhook-url")
///     .usage("The webhook url to send messages to")
///     .bind(&webhook);
/// ```
#[derive(Debug, Clone)]
pub struct HandlerConfigOption {
    /// Long flag name.
    pub argument: String,
    /// Single character flag alias.
    pub shorthand: Option<char>,
    /// Help text.
    pub usage: String,
    /// Environment variable name. Empty disables the environment source.
    pub env: String,
    /// Annotation key suffix, joined to the keyspace with `/`.
    pub path: String,
    /// Value used when no other source provides one.
    pub default: OptionValue,
    /// Destination of the resolved value.
    pub value: Option<ErasedSlot>,
}

impl HandlerConfigOption {
    /// Creates an option with the given flag name and default.
    pub fn new(argument: impl Into<String>, default: impl Into<OptionValue>) -> Self {
        Self {
            argument: argument.into(),
            shorthand: None,
            usage: String::new(),
            env: String::new(),
            path: String::new(),
            default: default.into(),
            value: None,
        }
    }

    /// Sets the single character alias.
    pub fn shorthand(mut self, shorthand: char) -> Self {
        self.shorthand = Some(shorthand);
        self
    }

    /// Sets the help text.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Sets the environment variable name.
    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.env = env.into();
        self
    }

    /// Sets the annotation key suffix.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Binds the destination slot.
    pub fn bind<T: Send + Sync + 'static>(mut self, slot: &Slot<T>) -> Self {
        self.value = Some(slot.erase());
        self
    }

    /// Kind used when parsing the flag: the slot's kind if known, otherwise
    /// the default's.
    pub fn kind(&self) -> ValueKind {
        self.value
            .as_ref()
            .and_then(ErasedSlot::kind)
            .unwrap_or_else(|| self.default.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_key() {
        let config = HandlerConfig::new("TestHandler", "Short Description");
        assert_eq!(config.annotation_key("path1"), None);

        let config = config.keyspace("sensu.io/plugins/segp/config");
        assert_eq!(
            config.annotation_key("path1").as_deref(),
            Some("sensu.io/plugins/segp/config/path1")
        );
    }

    #[test]
    fn test_option_builder() {
        let slot = Slot::<u64>::new();
        let option = HandlerConfigOption::new("arg2", 33333u64)
            .shorthand('e')
            .env("ENV_2")
            .path("path2")
            .usage("Second argument")
            .bind(&slot);

        assert_eq!(option.argument, "arg2");
        assert_eq!(option.shorthand, Some('e'));
        assert_eq!(option.env, "ENV_2");
        assert_eq!(option.path, "path2");
        assert_eq!(option.default, OptionValue::Uint64(33333));
        assert_eq!(option.kind(), ValueKind::Uint64);
        assert!(option.value.is_some());
    }

    #[test]
    fn test_kind_follows_slot() {
        let slot = Slot::<bool>::new();
        let option = HandlerConfigOption::new("arg1", "Default1");
        assert_eq!(option.kind(), ValueKind::String);
        assert_eq!(option.bind(&slot).kind(), ValueKind::Bool);
    }
}
