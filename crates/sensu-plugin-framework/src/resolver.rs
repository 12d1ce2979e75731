//! Option resolution.
//!
//! Each option is resolved from the first source that provides a value:
//!
//! | Priority | Source | Lookup |
//! |----------|--------|--------|
//! | 1 | Command line | `--<argument>` supplied explicitly |
//! | 2 | Environment | variable `env` is set |
//! | 3 | Check annotation | `<keyspace>/<path>` on the check |
//! | 4 | Entity annotation | `<keyspace>/<path>` on the entity |
//! | 5 | Default | the option's typed default |
//!
//! Sources 1 to 4 are textual and coerced into the option's kind. Annotation
//! sources are skipped entirely when the keyspace is empty.

use std::collections::HashMap;
use std::fmt;

use sensu_plugin_core::Event;
use tracing::{debug, trace};

use crate::command::CommandLineValues;
use crate::error::{OptionError, OptionResult};
use crate::option::{HandlerConfig, HandlerConfigOption};
use crate::value::OptionValue;

/// Environment variables visible to the resolver.
pub type Environment = HashMap<String, String>;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionSource {
    CommandLine,
    Environment,
    CheckAnnotation,
    EntityAnnotation,
    Default,
}

impl OptionSource {
    /// Returns the source name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommandLine => "command-line",
            Self::Environment => "environment",
            Self::CheckAnnotation => "check-annotation",
            Self::EntityAnnotation => "entity-annotation",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved values keyed by option argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    values: HashMap<String, (OptionValue, OptionSource)>,
}

impl ResolvedOptions {
    /// Returns the value resolved for `argument`.
    pub fn get(&self, argument: &str) -> Option<&OptionValue> {
        self.values.get(argument).map(|(value, _)| value)
    }

    /// Returns where the value for `argument` came from.
    pub fn source(&self, argument: &str) -> Option<OptionSource> {
        self.values.get(argument).map(|(_, source)| *source)
    }

    /// Returns the string value resolved for `argument`.
    pub fn get_str(&self, argument: &str) -> Option<&str> {
        self.get(argument).and_then(OptionValue::as_str)
    }

    /// Returns the integer value resolved for `argument`.
    pub fn get_u64(&self, argument: &str) -> Option<u64> {
        self.get(argument).and_then(OptionValue::as_u64)
    }

    /// Returns the boolean value resolved for `argument`.
    pub fn get_bool(&self, argument: &str) -> Option<bool> {
        self.get(argument).and_then(OptionValue::as_bool)
    }

    /// Number of resolved options.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, argument: &str, value: OptionValue, source: OptionSource) {
        self.values.insert(argument.to_string(), (value, source));
    }
}

/// Coerces `raw` into the option's kind and writes it to the option's slot.
///
/// The slot is left untouched when coercion fails.
pub fn set_option_value(option: &HandlerConfigOption, raw: &str) -> OptionResult<OptionValue> {
    let slot = option
        .value
        .as_ref()
        .ok_or_else(|| OptionError::missing_slot(&option.argument))?;
    let kind = slot.kind().ok_or_else(|| OptionError::UnsupportedType {
        argument: option.argument.clone(),
        type_name: slot.type_name(),
    })?;

    let value = OptionValue::parse(kind, &option.argument, raw)?;
    slot.store(&option.argument, value.clone())?;
    Ok(value)
}

/// Resolves options against one event.
///
/// The resolver never reads process state: command line values and the
/// environment are passed in explicitly.
#[derive(Debug, Clone, Copy)]
pub struct OptionResolver<'a> {
    config: &'a HandlerConfig,
    command_line: &'a CommandLineValues,
    env: &'a Environment,
}

impl<'a> OptionResolver<'a> {
    /// Creates a resolver.
    pub fn new(
        config: &'a HandlerConfig,
        command_line: &'a CommandLineValues,
        env: &'a Environment,
    ) -> Self {
        Self {
            config,
            command_line,
            env,
        }
    }

    /// Finds the highest priority textual value for `option`.
    pub fn lookup<'e>(
        &self,
        option: &HandlerConfigOption,
        event: &'e Event,
    ) -> Option<(&'e str, OptionSource)>
    where
        'a: 'e,
    {
        if let Some(value) = self.command_line.get(&option.argument) {
            return Some((value, OptionSource::CommandLine));
        }

        if !option.env.is_empty()
            && let Some(value) = self.env.get(&option.env)
        {
            return Some((value.as_str(), OptionSource::Environment));
        }

        let key = self.config.annotation_key(&option.path)?;

        if let Some(value) = event
            .check
            .as_ref()
            .and_then(|check| check.annotations().get(&key))
        {
            return Some((value.as_str(), OptionSource::CheckAnnotation));
        }

        event
            .entity
            .as_ref()
            .and_then(|entity| entity.annotations().get(&key))
            .map(|value| (value.as_str(), OptionSource::EntityAnnotation))
    }

    /// Resolves a single option and writes its slot.
    pub fn resolve(
        &self,
        option: &HandlerConfigOption,
        event: &Event,
    ) -> OptionResult<(OptionValue, OptionSource)> {
        let slot = option
            .value
            .as_ref()
            .ok_or_else(|| OptionError::missing_slot(&option.argument))?;

        let resolved = match self.lookup(option, event) {
            Some((raw, source)) => {
                trace!(argument = %option.argument, %source, raw, "Coercing option value");
                (set_option_value(option, raw)?, source)
            }
            None => {
                slot.store(&option.argument, option.default.clone())?;
                (option.default.clone(), OptionSource::Default)
            }
        };

        debug!(
            argument = %option.argument,
            source = %resolved.1,
            value = %resolved.0,
            "Option resolved"
        );
        Ok(resolved)
    }

    /// Resolves every option in declaration order.
    ///
    /// All slots are checked before anything is written; the first unbound
    /// option fails the whole resolution.
    pub fn resolve_all(
        &self,
        options: &[HandlerConfigOption],
        event: &Event,
    ) -> OptionResult<ResolvedOptions> {
        if let Some(option) = options.iter().find(|o| o.value.is_none()) {
            return Err(OptionError::missing_slot(&option.argument));
        }

        let mut resolved = ResolvedOptions::default();
        for option in options {
            let (value, source) = self.resolve(option, event)?;
            resolved.insert(&option.argument, value, source);
        }
        Ok(resolved)
    }
}
