// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line argument source parser.
//!
//! This module provides a parser that reads option values from the raw
//! arguments given to [`Registry::parse`], using a `clap` command built from the
//! options registered for the command line.

use crate::domain::convert::split_list;
use crate::domain::{OptionSpec, RegistryError, Result, ScalarKind, Value, ValueType};
use crate::ports::SourceParser;
use crate::service::Registry;
use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::HashSet;
use std::path::Path;

const POSITIONAL_ID: &str = "__positional";
const VERSION_ID: &str = "__version";

#[derive(Debug, Clone)]
struct Binding {
    id: String,
    group: String,
    option: String,
    sequence: bool,
}

/// Source parser for command-line arguments.
///
/// Every option registered with `cli` set becomes a long flag named after its
/// qualified name: `--port` for an option of the default group, `--db.host` for
/// option `host` of group `db`. Single-character short aliases of default-group
/// options become short flags (`-p`). Boolean options accept `--flag` and
/// `--flag=false`; sequence options accept repeated flags and comma-separated
/// values. Arguments that are not flags are stored with [`Registry::set_args`].
///
/// # Priority
///
/// Command-line arguments have a priority of 100, which means they override both
/// environment variables (50) and configuration files (10).
///
/// # Examples
///
/// ```rust
/// use optreg::adapters::CommandLineParser;
/// use optreg::domain::OptionSpec;
/// use optreg::service::Registry;
///
/// let registry = Registry::new();
/// registry
///     .register_option("", OptionSpec::of::<u16>("port").short("p").build().unwrap(), true)
///     .unwrap();
/// registry
///     .register_option("db", OptionSpec::of::<String>("host").build().unwrap(), true)
///     .unwrap();
/// registry.add_source_parser(CommandLineParser::new()).unwrap();
///
/// registry.parse(["-p", "8080", "--db.host=localhost", "input.txt"]).unwrap();
/// assert_eq!(registry.get::<u16>("", "port").unwrap(), 8080);
/// assert_eq!(registry.get::<String>("db", "host").unwrap(), "localhost");
/// assert_eq!(registry.args().unwrap(), vec!["input.txt"]);
/// ```
#[derive(Debug)]
pub struct CommandLineParser {
    program: String,
    about: Option<String>,
    priority: i32,
    exit_on_help: bool,
    bindings: Vec<Binding>,
    matches: Option<ArgMatches>,
}

impl CommandLineParser {
    /// Creates a command-line parser named after the running program.
    pub fn new() -> Self {
        let program = std::env::args()
            .next()
            .and_then(|arg0| {
                Path::new(&arg0)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "app".to_string());
        Self {
            program,
            about: None,
            priority: 100,
            exit_on_help: true,
            bindings: Vec::new(),
            matches: None,
        }
    }

    /// Sets the program name shown in help and usage messages.
    pub fn program_name(mut self, name: impl Into<String>) -> Self {
        self.program = name.into();
        self
    }

    /// Sets the description shown in help messages.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Overrides the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets whether `--help` and the version flag print and exit the process.
    ///
    /// When disabled they make setup fail with the rendered text as the message.
    /// Enabled by default.
    pub fn exit_on_help(mut self, exit: bool) -> Self {
        self.exit_on_help = exit;
        self
    }

    fn build_command(&mut self, registry: &Registry) -> Command {
        let settings = registry.settings();
        let mut command = Command::new(self.program.clone()).no_binary_name(true);
        if let Some(about) = &self.about {
            command = command.about(about.clone());
        }

        let mut longs: HashSet<String> = HashSet::from(["help".to_string()]);
        let mut shorts: HashSet<char> = HashSet::from(['h']);

        if let Some(version) = registry.version() {
            longs.insert(version.flag.clone());
            command = command
                .version(version.version)
                .disable_version_flag(true)
                .arg(
                    Arg::new(VERSION_ID)
                        .long(version.flag)
                        .help(version.help)
                        .action(ArgAction::Version),
                );
        }

        self.bindings.clear();
        for group in registry.groups() {
            let is_default = settings.is_default_group(group.full_path());
            for spec in group.cli_options() {
                let long = settings.qualified_name(group.full_path(), spec.name());
                if !longs.insert(long.clone()) {
                    tracing::warn!(flag = %long, "Skipping conflicting command-line flag");
                    continue;
                }

                let mut arg = self.arg_for(&long, &spec);
                if is_default {
                    if let Some(short) = single_char(spec.short()) {
                        if shorts.insert(short) {
                            arg = arg.short(short);
                        } else {
                            tracing::warn!(flag = %long, short = %short, "Skipping conflicting short flag");
                        }
                    }
                }

                command = command.arg(arg);
                self.bindings.push(Binding {
                    id: long,
                    group: group.full_path().to_string(),
                    option: spec.name().to_string(),
                    sequence: spec.value_type().is_sequence(),
                });
            }
        }

        command.arg(
            Arg::new(POSITIONAL_ID)
                .num_args(0..)
                .action(ArgAction::Append)
                .hide(true),
        )
    }

    fn arg_for(&self, long: &str, spec: &OptionSpec) -> Arg {
        let mut help = spec.help().to_string();
        if let Some(default) = spec.default() {
            if help.is_empty() {
                help = format!("(default: {})", default);
            } else {
                help = format!("{} (default: {})", help, default);
            }
        }

        let arg = Arg::new(long.to_string()).long(long.to_string()).help(help);
        let value_type = spec.value_type();
        if value_type.is_sequence() {
            arg.action(ArgAction::Append).allow_negative_numbers(true)
        } else if value_type == ValueType::Scalar(ScalarKind::Bool) {
            arg.action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
        } else {
            arg.action(ArgAction::Set).allow_negative_numbers(true)
        }
    }
}

fn single_char(short: Option<&str>) -> Option<char> {
    let mut chars = short?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl Default for CommandLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for CommandLineParser {
    fn name(&self) -> &str {
        "cli"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn setup(&mut self, registry: &Registry) -> Result<()> {
        let command = self.build_command(registry);
        let args = registry.cli_args();
        tracing::debug!(
            flags = self.bindings.len(),
            args = args.len(),
            "Parsing command-line arguments"
        );

        match command.try_get_matches_from(args) {
            Ok(matches) => {
                self.matches = Some(matches);
                Ok(())
            }
            Err(e) => {
                let informational =
                    matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
                if informational && self.exit_on_help {
                    e.exit();
                }
                Err(RegistryError::SourceError {
                    source_name: "cli".to_string(),
                    message: e.to_string(),
                    source: Some(Box::new(e)),
                })
            }
        }
    }

    fn resolve(&mut self, registry: &Registry) -> Result<()> {
        let Some(matches) = &self.matches else {
            return Ok(());
        };

        for binding in &self.bindings {
            if matches.value_source(&binding.id) != Some(ValueSource::CommandLine) {
                continue;
            }
            let value = if binding.sequence {
                let items = matches
                    .get_many::<String>(&binding.id)
                    .into_iter()
                    .flatten()
                    .flat_map(|raw| split_list(raw))
                    .map(Value::from)
                    .collect::<Vec<_>>();
                Value::List(items)
            } else {
                match matches.get_one::<String>(&binding.id) {
                    Some(raw) => Value::String(raw.clone()),
                    None => continue,
                }
            };
            tracing::debug!(group = %binding.group, option = %binding.option, "Setting option from command line");
            registry.set_option_value(self.priority, &binding.group, &binding.option, value)?;
        }

        let positionals: Vec<String> = matches
            .get_many::<String>(POSITIONAL_ID)
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        registry.set_args(positionals);
        Ok(())
    }

    fn teardown(&mut self, _registry: &Registry) -> Result<()> {
        self.matches = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionInfo;
    use std::time::Duration;

    fn registry() -> Registry {
        let registry = Registry::new();
        registry
            .register_options(
                "",
                vec![
                    OptionSpec::of::<u16>("port").short("p").default_value(80u16).build().unwrap(),
                    OptionSpec::of::<bool>("verbose").short("v").build().unwrap(),
                    OptionSpec::of::<Vec<String>>("tag").build().unwrap(),
                ],
                true,
            )
            .unwrap();
        registry
            .register_option(
                "db",
                OptionSpec::of::<Duration>("timeout").short("t").build().unwrap(),
                true,
            )
            .unwrap();
        registry
            .register_option("db", OptionSpec::of::<String>("password").build().unwrap(), false)
            .unwrap();
        registry
            .add_source_parser(CommandLineParser::new().exit_on_help(false))
            .unwrap();
        registry
    }

    #[test]
    fn test_cli_parser_name_and_priority() {
        let parser = CommandLineParser::new();
        assert_eq!(parser.name(), "cli");
        assert_eq!(parser.priority(), 100);
        assert_eq!(parser.with_priority(7).priority(), 7);
    }

    #[test]
    fn test_cli_long_and_short_flags() {
        let registry = registry();
        registry
            .parse(["-p", "8080", "--db.timeout", "1m30s", "-v"])
            .unwrap();

        assert_eq!(registry.get::<u16>("", "port").unwrap(), 8080);
        assert_eq!(
            registry.get::<Duration>("db", "timeout").unwrap(),
            Duration::from_secs(90)
        );
        assert!(registry.get::<bool>("", "verbose").unwrap());
    }

    #[test]
    fn test_cli_bool_with_explicit_value() {
        let registry = registry();
        registry.parse(["--verbose=false", "file"]).unwrap();
        assert!(!registry.get::<bool>("", "verbose").unwrap());
        assert_eq!(registry.args().unwrap(), vec!["file"]);
    }

    #[test]
    fn test_cli_sequences() {
        let registry = registry();
        registry.parse(["--tag", "a", "--tag=b,c"]).unwrap();
        assert_eq!(
            registry.get::<Vec<String>>("", "tag").unwrap(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_cli_defaults_are_not_written() {
        let registry = registry();
        registry.parse(Vec::<String>::new()).unwrap();
        assert!(!registry.group("").unwrap().is_set("port"));
        assert_eq!(registry.get::<u16>("", "port").unwrap(), 80);
    }

    #[test]
    fn test_cli_negative_numbers() {
        let registry = registry();
        registry
            .register_options(
                "",
                vec![
                    OptionSpec::of::<i32>("offset").build().unwrap(),
                    OptionSpec::of::<Vec<i64>>("shift").build().unwrap(),
                ],
                true,
            )
            .unwrap();
        registry
            .parse(["--offset", "-5", "--shift", "-1", "--shift=-2"])
            .unwrap();

        assert_eq!(registry.get::<i32>("", "offset").unwrap(), -5);
        assert_eq!(registry.get::<Vec<i64>>("", "shift").unwrap(), vec![-1, -2]);
    }

    #[test]
    fn test_cli_positionals() {
        let registry = registry();
        registry.parse(["one", "--port=1", "two"]).unwrap();
        assert_eq!(registry.args().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_cli_ignores_non_cli_options() {
        let registry = registry();
        let err = registry.parse(["--db.password=secret"]).unwrap_err();
        assert!(matches!(err, RegistryError::ParserFailed { stage: "setup", .. }));
        assert!(!registry.is_parsed());
    }

    #[test]
    fn test_cli_short_only_for_default_group() {
        let registry = registry();
        let err = registry.parse(["-t", "5s"]).unwrap_err();
        assert!(err.to_string().contains("cli"));
    }

    #[test]
    fn test_cli_invalid_value_fails_resolve() {
        let registry = registry();
        let err = registry.parse(["--port", "http"]).unwrap_err();
        assert!(matches!(err, RegistryError::ParserFailed { stage: "resolve", .. }));
    }

    #[test]
    fn test_cli_help_without_exit() {
        let registry = registry();
        let err = registry.parse(["--help"]).unwrap_err();
        assert!(err.to_string().contains("--db.timeout"));
    }

    #[test]
    fn test_cli_version_flag() {
        let registry = registry();
        registry.set_version(VersionInfo::new("1.4.2")).unwrap();
        let err = registry.parse(["--version"]).unwrap_err();
        assert!(err.to_string().contains("1.4.2"));
    }

    #[test]
    fn test_single_char() {
        assert_eq!(single_char(Some("x")), Some('x'));
        assert_eq!(single_char(Some("xy")), None);
        assert_eq!(single_char(None), None);
    }
}
