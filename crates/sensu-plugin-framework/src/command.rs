//! Command line flags generated from option declarations.
//!
//! Every [`HandlerConfigOption`] becomes one flag:
//!
//! - `--<argument> <value>` or `--<argument>=<value>`
//! - `-<shorthand> <value>` when a shorthand is declared
//! - boolean options also accept a bare `--<argument>` meaning `true`, and
//!   require the `=` form for an explicit value (`--verbose=false`)
//!
//! The token after a string or integer flag is always its value, even when it
//! starts with `-`. An option declaring shorthand `h` or argument `help`
//! replaces the matching built-in help flag.
//!
//! Values are kept as text. Coercion happens during resolution so that all
//! sources share the same rules and the same errors.

use std::collections::HashMap;
use std::ffi::OsString;

use clap::builder::ValueParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::trace;

use crate::error::HandlerResult;
use crate::option::{HandlerConfig, HandlerConfigOption};
use crate::value::ValueKind;

/// Flags explicitly supplied on the command line, keyed by option argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLineValues {
    values: HashMap<String, String>,
}

impl CommandLineValues {
    /// Creates an empty set of values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value for `argument`.
    pub fn insert(&mut self, argument: impl Into<String>, value: impl Into<String>) {
        self.values.insert(argument.into(), value.into());
    }

    /// Returns the value supplied for `argument`, if any.
    pub fn get(&self, argument: &str) -> Option<&str> {
        self.values.get(argument).map(String::as_str)
    }

    /// Returns `true` if no flag was supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Collects the flags that came from the command line itself.
    pub fn from_matches(matches: &ArgMatches, options: &[HandlerConfigOption]) -> Self {
        let mut values = Self::new();
        for option in options {
            if matches.value_source(&option.argument) != Some(ValueSource::CommandLine) {
                continue;
            }
            if let Some(value) = matches.get_one::<String>(&option.argument) {
                trace!(argument = %option.argument, "Flag supplied on command line");
                values.insert(option.argument.clone(), value.clone());
            }
        }
        values
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CommandLineValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

/// Builds the [`Command`] for a handler.
///
/// Name and about text come from the config; the long help also shows the
/// timeout and the annotation keyspace.
pub fn build_command(config: &HandlerConfig, options: &[HandlerConfigOption]) -> Command {
    let mut after_help = format!("Timeout: {}s", config.timeout.as_secs());
    if !config.keyspace.is_empty() {
        after_help.push_str(&format!("\nAnnotation keyspace: {}", config.keyspace));
    }

    let mut command = Command::new(config.name.clone())
        .about(config.short.clone())
        .after_help(after_help);

    for option in options {
        command = command.arg(build_arg(option));
    }

    // A declared `-h` or `--help` takes the flag from the built-in help.
    let short_taken = options.iter().any(|o| o.shorthand == Some('h'));
    let long_taken = options.iter().any(|o| o.argument == "help");
    if short_taken || long_taken {
        command = command.disable_help_flag(true);
        if !long_taken {
            command = command.arg(
                Arg::new("help")
                    .long("help")
                    .help("Print help")
                    .action(ArgAction::Help),
            );
        }
    }
    command
}

fn build_arg(option: &HandlerConfigOption) -> Arg {
    let mut help = option.usage.clone();
    if !option.env.is_empty() {
        help.push_str(&format!(" [env: {}]", option.env));
    }
    help.push_str(&format!(" [default: {}]", option.default));

    let mut arg = Arg::new(option.argument.clone())
        .long(option.argument.clone())
        .help(help.trim_start().to_string())
        .action(ArgAction::Set)
        .value_parser(ValueParser::string());

    if let Some(shorthand) = option.shorthand {
        arg = arg.short(shorthand);
    }

    match option.kind() {
        ValueKind::Bool => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true"),
        ValueKind::String | ValueKind::Uint64 => arg.num_args(1).allow_hyphen_values(true),
    }
}

/// Parses `args` (without the program name) against the handler's flags.
pub fn parse_command_line<I, T>(
    config: &HandlerConfig,
    options: &[HandlerConfigOption],
    args: I,
) -> HandlerResult<CommandLineValues>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv = std::iter::once(OsString::from(config.name.clone()))
        .chain(args.into_iter().map(Into::into));
    let matches = build_command(config, options).try_get_matches_from(argv)?;
    Ok(CommandLineValues::from_matches(&matches, options))
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;
    use crate::error::HandlerError;
    use crate::slot::Slot;

    fn options() -> Vec<HandlerConfigOption> {
        vec![
            HandlerConfigOption::new("arg1", "Default1")
                .shorthand('d')
                .usage("First argument")
                .bind(&Slot::<String>::new()),
            HandlerConfigOption::new("arg2", 33333u64)
                .shorthand('e')
                .bind(&Slot::<u64>::new()),
            HandlerConfigOption::new("arg3", false)
                .shorthand('f')
                .bind(&Slot::<bool>::new()),
        ]
    }

    fn config() -> HandlerConfig {
        HandlerConfig::new("TestHandler", "Short Description")
    }

    #[test]
    fn test_no_flags() {
        let values = parse_command_line(&config(), &options(), Vec::<String>::new()).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_long_flags() {
        let args = ["--arg1", "value-arg1", "--arg2", "7531", "--arg3=false"];
        let values = parse_command_line(&config(), &options(), args).unwrap();
        assert_eq!(values.get("arg1"), Some("value-arg1"));
        assert_eq!(values.get("arg2"), Some("7531"));
        assert_eq!(values.get("arg3"), Some("false"));
    }

    #[test]
    fn test_short_flags_and_bare_bool() {
        let args = ["-d", "x", "--arg2=12", "--arg3"];
        let values = parse_command_line(&config(), &options(), args).unwrap();
        assert_eq!(values.get("arg1"), Some("x"));
        assert_eq!(values.get("arg2"), Some("12"));
        assert_eq!(values.get("arg3"), Some("true"));
    }

    #[test]
    fn test_empty_string_value() {
        let values = parse_command_line(&config(), &options(), ["--arg1="]).unwrap();
        assert_eq!(values.get("arg1"), Some(""));
    }

    #[test]
    fn test_unknown_flag() {
        let err = parse_command_line(&config(), &options(), ["--nope", "1"]).unwrap_err();
        match err {
            HandlerError::Arguments(e) => assert_eq!(e.kind(), ErrorKind::UnknownArgument),
            other => panic!("Expected Arguments, got {other:?}"),
        }
    }

    #[test]
    fn test_help() {
        let config = config().keyspace("sensu.io/plugins/segp/config");
        let err = parse_command_line(&config, &options(), ["--help"]).unwrap_err();
        assert!(err.is_display_request());

        let help = err.to_string();
        assert!(help.contains("Short Description"));
        assert!(help.contains("--arg1"));
        assert!(help.contains("Timeout: 10s"));
        assert!(help.contains("sensu.io/plugins/segp/config"));
    }

    #[test]
    fn test_hyphen_values() {
        let args = ["--arg1", "-x", "-e", "-5"];
        let values = parse_command_line(&config(), &options(), args).unwrap();
        assert_eq!(values.get("arg1"), Some("-x"));
        assert_eq!(values.get("arg2"), Some("-5"));
    }

    #[test]
    fn test_shorthand_h_replaces_help_short() {
        let mut options = options();
        options.push(
            HandlerConfigOption::new("host", "localhost")
                .shorthand('h')
                .bind(&Slot::<String>::new()),
        );

        let values = parse_command_line(&config(), &options, ["-h", "example.org"]).unwrap();
        assert_eq!(values.get("host"), Some("example.org"));

        let err = parse_command_line(&config(), &options, ["--help"]).unwrap_err();
        assert!(err.is_display_request());
        assert!(err.to_string().contains("--host"));
    }

    #[test]
    fn test_help_argument_replaces_help_flag() {
        let mut options = options();
        options.push(HandlerConfigOption::new("help", false).bind(&Slot::<bool>::new()));

        let values = parse_command_line(&config(), &options, ["--help"]).unwrap();
        assert_eq!(values.get("help"), Some("true"));
    }

    #[test]
    fn test_from_iter() {
        let values: CommandLineValues = [("arg1", "a")].into_iter().collect();
        assert_eq!(values.get("arg1"), Some("a"));
        assert_eq!(values.get("arg2"), None);
    }
}
