// SPDX-License-Identifier: MIT OR Apache-2.0

//! The option registry.
//!
//! [`Registry`] owns the group tree, the ordered source parsers, the validators
//! and the change observer, and runs the one-shot parse pipeline:
//!
//! 1. `setup` hooks of every parser, in ascending priority
//! 2. `resolve` hooks, which write values through [`Registry::set_option_value`]
//! 3. `teardown` hooks
//! 4. zero values for optional options left empty, when zero mode is on
//! 5. required-option checks, group by group
//! 6. validators, in registration order
//!
//! A failure in step 1 leaves the registry unparsed; any later failure leaves it
//! [`Phase::Failed`].

use crate::domain::{
    FromValue, OptionSpec, RegistryError, RegistrySettings, Result, Value, VersionInfo,
};
use crate::ports::{ChangeCallback, OptionStruct, SourceParser, Validate};
use crate::service::group::Group;
use crate::service::phase::Phase;
use std::collections::BTreeMap;
use std::sync::{
    Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

/// Emits at `info` when the registry's debug setting is on, at `debug` otherwise.
macro_rules! log_event {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

type Validator = Box<dyn Fn(&Registry) -> Result<()> + Send + Sync>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Copy, Debug)]
enum Hook {
    Setup,
    Resolve,
    Teardown,
}

impl Hook {
    fn name(self) -> &'static str {
        match self {
            Hook::Setup => "setup",
            Hook::Resolve => "resolve",
            Hook::Teardown => "teardown",
        }
    }

    fn call(self, parser: &mut dyn SourceParser, registry: &Registry) -> Result<()> {
        match self {
            Hook::Setup => parser.setup(registry),
            Hook::Resolve => parser.resolve(registry),
            Hook::Teardown => parser.teardown(registry),
        }
    }
}

/// A registry of typed options organized in groups.
///
/// Options are registered before [`Registry::parse`]; parsing runs every source
/// parser once and freezes the structure. Values remain writable afterwards
/// through [`Registry::set_option_value`], subject to the priority rule.
///
/// `Registry` is `Send + Sync`; writes and reads may happen from any thread.
///
/// # Examples
///
/// ```rust
/// use optreg::domain::{OptionSpec, Result};
/// use optreg::service::Registry;
///
/// # fn main() -> Result<()> {
/// let registry = Registry::new();
/// registry.register_option("", OptionSpec::of::<i64>("port").default_value(8080).build()?, true)?;
/// registry.register_option("db", OptionSpec::of::<String>("host").required(true).build()?, true)?;
///
/// registry.set_option_value(0, "db", "host", "localhost")?;
/// registry.parse(Vec::<String>::new())?;
///
/// assert_eq!(registry.get::<i64>("", "port")?, 8080);
/// assert_eq!(registry.get::<String>("db", "host")?, "localhost");
/// # Ok(())
/// # }
/// ```
pub struct Registry {
    settings: RwLock<RegistrySettings>,
    phase: RwLock<Phase>,
    groups: RwLock<BTreeMap<String, Arc<Group>>>,
    parsers: Mutex<Vec<Box<dyn SourceParser>>>,
    // names of the parsers taken out of `parsers` while a parse runs them
    running: RwLock<Vec<String>>,
    validators: Mutex<Vec<(String, Validator)>>,
    observer: Arc<OnceLock<ChangeCallback>>,
    version: RwLock<Option<VersionInfo>>,
    cli_args: RwLock<Vec<String>>,
    args: RwLock<Vec<String>>,
}

impl Registry {
    /// Creates an empty registry with default settings.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use optreg::service::{Phase, Registry};
    ///
    /// let registry = Registry::new();
    /// assert_eq!(registry.phase(), Phase::Unparsed);
    /// assert!(registry.all_groups().is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_settings(RegistrySettings::default())
    }

    pub(crate) fn with_settings(settings: RegistrySettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            phase: RwLock::new(Phase::Unparsed),
            groups: RwLock::new(BTreeMap::new()),
            parsers: Mutex::new(Vec::new()),
            running: RwLock::new(Vec::new()),
            validators: Mutex::new(Vec::new()),
            observer: Arc::new(OnceLock::new()),
            version: RwLock::new(None),
            cli_args: RwLock::new(Vec::new()),
            args: RwLock::new(Vec::new()),
        }
    }

    /// Creates a new registry builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Creates a registry reading from the usual sources.
    ///
    /// This includes a YAML file from the OS-appropriate configuration directory
    /// (if it exists), environment variables prefixed with the upper-cased
    /// application name, and the command line, as far as the corresponding
    /// features are enabled.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use optreg::service::Registry;
    ///
    /// # fn main() -> optreg::domain::Result<()> {
    /// let registry = Registry::with_defaults("myapp", "com.example")?;
    /// # Ok(())
    /// # }
    /// ```
    #[allow(unused_mut, unused_variables)]
    pub fn with_defaults(app_name: &str, qualifier: &str) -> Result<Self> {
        let mut builder = Self::builder();

        #[cfg(feature = "yaml")]
        {
            use crate::adapters::YamlFileParser;
            if let Ok(parser) = YamlFileParser::from_default_location(app_name, qualifier) {
                builder = builder.with_parser(Box::new(parser));
            }
        }

        #[cfg(feature = "env")]
        {
            let prefix = format!("{}_", app_name.to_uppercase().replace('-', "_"));
            builder = builder.with_env_prefix(prefix);
        }

        #[cfg(feature = "cli")]
        {
            builder = builder.with_cli();
        }

        builder.build()
    }

    /// Returns the current phase of the parse pipeline.
    pub fn phase(&self) -> Phase {
        *read(&self.phase)
    }

    /// Reports whether resolution has begun.
    pub fn is_parsed(&self) -> bool {
        self.phase().is_parsed()
    }

    /// Returns a copy of the registry settings.
    pub fn settings(&self) -> RegistrySettings {
        read(&self.settings).clone()
    }

    fn update_settings(&self, change: impl FnOnce(&mut RegistrySettings) -> Result<()>) -> Result<()> {
        let phase = read(&self.phase);
        if *phase != Phase::Unparsed {
            return Err(RegistryError::AlreadyParsed);
        }
        let mut settings = write(&self.settings);
        let mut updated = settings.clone();
        change(&mut updated)?;
        updated.validate()?;
        *settings = updated;
        Ok(())
    }

    fn ensure_no_groups(&self, setting: &str) -> Result<()> {
        if read(&self.groups).is_empty() {
            Ok(())
        } else {
            Err(RegistryError::InvalidSetting {
                setting: setting.to_string(),
                message: "groups have already been registered".to_string(),
            })
        }
    }

    /// Sets the name of the default group.
    ///
    /// Fails with `InvalidSetting` once a group exists.
    pub fn set_default_group_name(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.update_settings(|settings| {
            self.ensure_no_groups("default_group_name")?;
            settings.default_group_name = name;
            Ok(())
        })
    }

    /// Sets the separator between group path segments.
    ///
    /// Fails with `InvalidSetting` once a group exists.
    pub fn set_group_separator(&self, separator: impl Into<String>) -> Result<()> {
        let separator = separator.into();
        self.update_settings(|settings| {
            self.ensure_no_groups("group_separator")?;
            settings.group_separator = separator;
            Ok(())
        })
    }

    /// Treats every option as required.
    pub fn set_strict(&self, strict: bool) -> Result<()> {
        self.update_settings(|settings| {
            settings.strict = strict;
            Ok(())
        })
    }

    /// Gives optional options left empty their type's zero value.
    pub fn set_zero(&self, zero: bool) -> Result<()> {
        self.update_settings(|settings| {
            settings.zero = zero;
            Ok(())
        })
    }

    /// Surfaces registration and pipeline events at `info` level.
    pub fn set_debug(&self, debug: bool) -> Result<()> {
        self.update_settings(|settings| {
            settings.debug = debug;
            Ok(())
        })
    }

    /// Replaces re-registered options instead of failing.
    pub fn set_ignore_reregister(&self, ignore: bool) -> Result<()> {
        self.update_settings(|settings| {
            settings.ignore_reregister = ignore;
            Ok(())
        })
    }

    /// Sets the version information exposed by command-line parsers.
    pub fn set_version(&self, version: VersionInfo) -> Result<()> {
        let phase = read(&self.phase);
        if *phase != Phase::Unparsed {
            return Err(RegistryError::AlreadyParsed);
        }
        *write(&self.version) = Some(version);
        Ok(())
    }

    /// Returns the version information, if set.
    pub fn version(&self) -> Option<VersionInfo> {
        read(&self.version).clone()
    }

    fn ensure_group(&self, settings: &RegistrySettings, path: &str) -> Arc<Group> {
        let mut groups = write(&self.groups);
        let mut full_path = String::new();
        let mut leaf = None;

        for segment in settings.segments(path) {
            if !full_path.is_empty() {
                full_path.push_str(&settings.group_separator);
            }
            full_path.push_str(segment);
            let group = groups.entry(full_path.clone()).or_insert_with(|| {
                tracing::trace!(group = %full_path, "Created group");
                Arc::new(Group::new(
                    segment,
                    full_path.clone(),
                    Arc::clone(&self.observer),
                ))
            });
            leaf = Some(Arc::clone(group));
        }

        match leaf {
            Some(group) => group,
            None => {
                let name = settings.default_group_name.clone();
                let group = groups.entry(name.clone()).or_insert_with(|| {
                    tracing::trace!(group = %name, "Created default group");
                    Arc::new(Group::new(
                        name.clone(),
                        name.clone(),
                        Arc::clone(&self.observer),
                    ))
                });
                Arc::clone(group)
            }
        }
    }

    /// Creates the group at `path` and all its ancestors, returning the leaf.
    ///
    /// Creating a group that exists returns it unchanged. The empty path, the
    /// default group name and paths starting with it address the default group.
    ///
    /// # Errors
    ///
    /// - `AlreadyParsed` once resolution has begun
    pub fn register_group(&self, path: &str) -> Result<Arc<Group>> {
        let phase = read(&self.phase);
        if !phase.allows_registration() {
            return Err(RegistryError::AlreadyParsed);
        }
        let settings = self.settings();
        let group = self.ensure_group(&settings, path);
        drop(phase);
        log_event!(settings.debug, group = group.full_path(), "Registered group");
        Ok(group)
    }

    /// Adds an option to the group at `group_path`, creating the group if needed.
    ///
    /// Options with `cli` set are exposed to command-line parsers.
    ///
    /// # Errors
    ///
    /// - `AlreadyParsed` once resolution has begun
    /// - `DuplicateOption` if the name or short alias is taken and re-registration
    ///   is not ignored
    pub fn register_option(&self, group_path: &str, option: OptionSpec, cli: bool) -> Result<()> {
        let phase = read(&self.phase);
        if !phase.allows_registration() {
            return Err(RegistryError::AlreadyParsed);
        }
        let settings = self.settings();
        let group = self.ensure_group(&settings, group_path);
        let name = option.name().to_string();
        let replaced = group.register_option(option, cli, settings.ignore_reregister)?;
        drop(phase);
        log_event!(
            settings.debug,
            group = group.full_path(),
            option = %name,
            cli,
            replaced,
            "Registered option"
        );
        Ok(())
    }

    /// Adds several options to the same group.
    pub fn register_options(
        &self,
        group_path: &str,
        options: impl IntoIterator<Item = OptionSpec>,
        cli: bool,
    ) -> Result<()> {
        for option in options {
            self.register_option(group_path, option, cli)?;
        }
        Ok(())
    }

    /// Registers the options described by `T` into `group`.
    ///
    /// Fields may override the group and the CLI exposure.
    pub fn register_struct<T: OptionStruct>(&self, group: &str, cli: bool) -> Result<()> {
        for field in T::fields()? {
            let path = field.group_or(group).to_string();
            self.register_option(&path, field.option, field.cli.unwrap_or(cli))?;
        }
        Ok(())
    }

    /// Registers the options described by `T` and queues its validation.
    ///
    /// After resolution, `T` is loaded from `group` and validated.
    pub fn register_validated_struct<T>(&self, group: &str, cli: bool) -> Result<()>
    where
        T: OptionStruct + Validate + 'static,
    {
        self.register_struct::<T>(group, cli)?;
        let path = group.to_string();
        self.add_validator(std::any::type_name::<T>(), move |registry: &Registry| {
            T::load(registry, &path)?.validate()
        })
    }

    /// Adds a validator run once after all sources have resolved.
    ///
    /// # Errors
    ///
    /// - `AlreadyParsed` once resolution has begun
    pub fn add_validator<F>(&self, name: impl Into<String>, validator: F) -> Result<()>
    where
        F: Fn(&Registry) -> Result<()> + Send + Sync + 'static,
    {
        let phase = read(&self.phase);
        if !phase.allows_registration() {
            return Err(RegistryError::AlreadyParsed);
        }
        lock(&self.validators).push((name.into(), Box::new(validator)));
        Ok(())
    }

    /// Builds `T` from the values resolved in `group`.
    pub fn load<T: OptionStruct>(&self, group: &str) -> Result<T> {
        T::load(self, group)
    }

    /// Adds source parsers, keeping all parsers ordered by ascending priority.
    ///
    /// Parsers of equal priority keep their insertion order.
    ///
    /// # Errors
    ///
    /// - `AlreadyParsed` once parsing has started
    pub fn add_source_parsers(&self, parsers: Vec<Box<dyn SourceParser>>) -> Result<()> {
        let phase = read(&self.phase);
        if *phase != Phase::Unparsed {
            return Err(RegistryError::AlreadyParsed);
        }
        let debug = read(&self.settings).debug;
        let mut registered = lock(&self.parsers);
        for parser in parsers {
            log_event!(
                debug,
                parser = parser.name(),
                priority = parser.priority(),
                "Added source parser"
            );
            registered.push(parser);
        }
        registered.sort_by_key(|parser| parser.priority());
        Ok(())
    }

    /// Adds a single source parser.
    pub fn add_source_parser(&self, parser: impl SourceParser + 'static) -> Result<()> {
        self.add_source_parsers(vec![Box::new(parser)])
    }

    /// Removes every parser with the given name, returning whether any was removed.
    ///
    /// # Errors
    ///
    /// - `AlreadyParsed` once parsing has started
    pub fn remove_parser(&self, name: &str) -> Result<bool> {
        let phase = read(&self.phase);
        if *phase != Phase::Unparsed {
            return Err(RegistryError::AlreadyParsed);
        }
        let mut parsers = lock(&self.parsers);
        let before = parsers.len();
        parsers.retain(|parser| parser.name() != name);
        Ok(parsers.len() != before)
    }

    /// Reports whether a parser with the given name is registered.
    ///
    /// Parsers being run by an ongoing parse are included.
    pub fn has_parser(&self, name: &str) -> bool {
        self.parser_names().iter().any(|parser| parser == name)
    }

    /// Returns the names of the registered parsers, in execution order.
    ///
    /// Parsers being run by an ongoing parse are included.
    pub fn parser_names(&self) -> Vec<String> {
        let running = read(&self.running);
        if !running.is_empty() {
            return running.clone();
        }
        drop(running);
        lock(&self.parsers)
            .iter()
            .map(|parser| parser.name().to_string())
            .collect()
    }

    /// Registers the change observer.
    ///
    /// The callback runs after every committed write, once the written group is
    /// unlocked.
    ///
    /// # Errors
    ///
    /// - `AlreadyParsed` once resolution has begun
    /// - `ObserverAlreadySet` if an observer is registered
    pub fn observe(&self, callback: ChangeCallback) -> Result<()> {
        let phase = read(&self.phase);
        if phase.is_parsed() {
            return Err(RegistryError::AlreadyParsed);
        }
        self.observer
            .set(callback)
            .map_err(|_| RegistryError::ObserverAlreadySet)
    }

    /// Runs the parse pipeline with the given raw command-line arguments.
    ///
    /// The arguments exclude the program name; they are available to parsers
    /// through [`Registry::cli_args`].
    ///
    /// # Errors
    ///
    /// - `AlreadyParsed` if parsing has already started
    /// - `ParserFailed` if a parser hook fails
    /// - `MissingRequiredOption` if a required option is left without a value
    /// - `ValidationFailed` if a validator fails
    pub fn parse<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut phase = write(&self.phase);
            if *phase != Phase::Unparsed {
                return Err(RegistryError::AlreadyParsed);
            }
            *phase = Phase::Preparing;
        }

        let settings = self.settings();
        self.ensure_group(&settings, "");
        *write(&self.cli_args) = args.into_iter().map(Into::into).collect::<Vec<String>>();

        let mut parsers = {
            let mut registered = lock(&self.parsers);
            *write(&self.running) = registered
                .iter()
                .map(|parser| parser.name().to_string())
                .collect();
            std::mem::take(&mut *registered)
        };
        log_event!(
            settings.debug,
            parsers = parsers.len(),
            "Preparing source parsers"
        );

        if let Err(e) = self.run_hooks(&mut parsers, Hook::Setup, settings.debug) {
            *lock(&self.parsers) = parsers;
            write(&self.running).clear();
            *write(&self.phase) = Phase::Unparsed;
            tracing::warn!(error = %e, "Parser setup failed; registry left unparsed");
            return Err(e);
        }

        *write(&self.phase) = Phase::Resolving;
        let result = self.resolve(&mut parsers, &settings);
        *lock(&self.parsers) = parsers;
        write(&self.running).clear();

        let mut phase = write(&self.phase);
        match &result {
            Ok(()) => {
                *phase = Phase::Parsed;
                log_event!(settings.debug, "Registry parsed");
            }
            Err(e) => {
                *phase = Phase::Failed;
                tracing::warn!(error = %e, "Registry parse failed");
            }
        }
        result
    }

    fn resolve(&self, parsers: &mut [Box<dyn SourceParser>], settings: &RegistrySettings) -> Result<()> {
        self.run_hooks(parsers, Hook::Resolve, settings.debug)?;

        *write(&self.phase) = Phase::Finalizing;
        self.run_hooks(parsers, Hook::Teardown, settings.debug)?;

        let groups = self.all_groups();
        if settings.zero {
            let filled: usize = groups
                .iter()
                .map(|group| group.fill_zero_values())
                .sum();
            log_event!(settings.debug, filled, "Applied zero values");
        }

        for group in &groups {
            group.check_required(settings.strict)?;
        }

        self.run_validators(settings.debug)
    }

    fn run_hooks(&self, parsers: &mut [Box<dyn SourceParser>], hook: Hook, debug: bool) -> Result<()> {
        for parser in parsers.iter_mut() {
            log_event!(
                debug,
                parser = parser.name(),
                priority = parser.priority(),
                stage = hook.name(),
                "Running parser hook"
            );
            hook.call(parser.as_mut(), self)
                .map_err(|e| RegistryError::ParserFailed {
                    parser: parser.name().to_string(),
                    stage: hook.name(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    fn run_validators(&self, debug: bool) -> Result<()> {
        let validators = std::mem::take(&mut *lock(&self.validators));
        let mut result = Ok(());
        for (name, validator) in &validators {
            log_event!(debug, validator = %name, "Running validator");
            if let Err(e) = validator(self) {
                result = Err(RegistryError::ValidationFailed {
                    validator: name.clone(),
                    source: Box::new(e),
                });
                break;
            }
        }
        *lock(&self.validators) = validators;
        result
    }

    /// Stores the positional arguments left over by a command-line parser.
    pub fn set_args(&self, args: Vec<String>) {
        *write(&self.args) = args;
    }

    /// Returns the positional arguments.
    ///
    /// # Errors
    ///
    /// - `NotParsed` before resolution has begun
    pub fn args(&self) -> Result<Vec<String>> {
        if !self.is_parsed() {
            return Err(RegistryError::NotParsed);
        }
        Ok(read(&self.args).clone())
    }

    /// Returns the raw arguments given to [`Registry::parse`].
    pub fn cli_args(&self) -> Vec<String> {
        read(&self.cli_args).clone()
    }

    /// Writes a value into an option, subject to the priority rule.
    ///
    /// See [`Group::set_option_value`].
    ///
    /// # Errors
    ///
    /// - `NegativePriority` if `priority` is negative
    /// - `GroupNotFound` if the group does not exist
    /// - `OptionNotFound` if the option does not exist
    /// - `InvalidValue` if the value does not fit the option's type
    pub fn set_option_value(
        &self,
        priority: i32,
        group_path: &str,
        option: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        if priority < 0 {
            return Err(RegistryError::NegativePriority { priority });
        }
        self.group(group_path)?
            .set_option_value(priority, option, value)
    }

    /// Returns the group at `path`.
    ///
    /// # Errors
    ///
    /// - `GroupNotFound` if no group has this path
    pub fn group(&self, path: &str) -> Result<Arc<Group>> {
        let canonical = read(&self.settings).canonical_path(path);
        read(&self.groups)
            .get(&canonical)
            .cloned()
            .ok_or(RegistryError::GroupNotFound { group: canonical })
    }

    /// Reports whether a group exists at `path`.
    pub fn has_group(&self, path: &str) -> bool {
        self.group(path).is_ok()
    }

    /// Returns the groups that own at least one option, ordered by path.
    pub fn groups(&self) -> Vec<Arc<Group>> {
        self.all_groups()
            .into_iter()
            .filter(|group| !group.is_empty())
            .collect()
    }

    /// Returns every group, ordered by path.
    pub fn all_groups(&self) -> Vec<Arc<Group>> {
        read(&self.groups).values().cloned().collect()
    }

    /// Returns every value or default, keyed by qualified option name.
    ///
    /// Options of the default group are keyed by their bare name.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        let settings = self.settings();
        self.all_groups()
            .iter()
            .flat_map(|group| {
                let path = group.full_path().to_string();
                let settings = &settings;
                group
                    .values()
                    .into_iter()
                    .map(move |(option, value)| (settings.qualified_name(&path, &option), value))
            })
            .collect()
    }

    /// Reads an option as `T`. The empty path addresses the default group.
    ///
    /// See [`Group::get`].
    pub fn get<T: FromValue>(&self, group_path: &str, option: &str) -> Result<T> {
        self.group(group_path)?.get(option)
    }

    /// Reads an option as `T`, returning `default` if it cannot be read.
    pub fn get_or<T: FromValue>(&self, group_path: &str, option: &str, default: T) -> T {
        self.get(group_path, option).unwrap_or(default)
    }

    /// Reads an option as `T`.
    ///
    /// # Panics
    ///
    /// Panics if [`Registry::get`] fails.
    pub fn must_get<T: FromValue>(&self, group_path: &str, option: &str) -> T {
        match self.get(group_path, option) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("phase", &self.phase())
            .field("settings", &self.settings())
            .field("groups", &read(&self.groups).keys().collect::<Vec<_>>())
            .field("parsers", &self.parser_names())
            .finish()
    }
}

/// Builder for constructing a [`Registry`].
///
/// This builder provides a fluent interface for choosing settings and source
/// parsers before the registry exists.
///
/// # Examples
///
/// ```rust
/// use optreg::service::RegistryBuilder;
///
/// # fn main() -> optreg::domain::Result<()> {
/// let registry = RegistryBuilder::new()
///     .group_separator("/")
///     .strict(true)
///     .build()?;
/// assert_eq!(registry.settings().group_separator, "/");
/// # Ok(())
/// # }
/// ```
pub struct RegistryBuilder {
    settings: RegistrySettings,
    parsers: Vec<Box<dyn SourceParser>>,
    version: Option<VersionInfo>,
}

impl RegistryBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            settings: RegistrySettings::default(),
            parsers: Vec::new(),
            version: None,
        }
    }

    /// Sets the name of the default group.
    pub fn default_group_name(mut self, name: impl Into<String>) -> Self {
        self.settings.default_group_name = name.into();
        self
    }

    /// Sets the separator between group path segments.
    pub fn group_separator(mut self, separator: impl Into<String>) -> Self {
        self.settings.group_separator = separator.into();
        self
    }

    /// Treats every option as required.
    pub fn strict(mut self, strict: bool) -> Self {
        self.settings.strict = strict;
        self
    }

    /// Gives optional options left empty their type's zero value.
    pub fn zero(mut self, zero: bool) -> Self {
        self.settings.zero = zero;
        self
    }

    /// Surfaces registration and pipeline events at `info` level.
    pub fn debug(mut self, debug: bool) -> Self {
        self.settings.debug = debug;
        self
    }

    /// Replaces re-registered options instead of failing.
    pub fn ignore_reregister(mut self, ignore: bool) -> Self {
        self.settings.ignore_reregister = ignore;
        self
    }

    /// Sets the version information exposed by command-line parsers.
    pub fn version(mut self, version: VersionInfo) -> Self {
        self.version = Some(version);
        self
    }

    /// Adds a source parser.
    pub fn with_parser(mut self, parser: Box<dyn SourceParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Adds environment variables with a prefix as a source.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use optreg::service::RegistryBuilder;
    ///
    /// # fn main() -> optreg::domain::Result<()> {
    /// let registry = RegistryBuilder::new()
    ///     .with_env_prefix("MYAPP_")
    ///     .build()?;
    /// assert!(registry.has_parser("env"));
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "env")]
    pub fn with_env_prefix(self, prefix: impl Into<String>) -> Self {
        use crate::adapters::EnvVarParser;
        self.with_parser(Box::new(EnvVarParser::with_prefix(prefix)))
    }

    /// Adds the command line as a source.
    #[cfg(feature = "cli")]
    pub fn with_cli(self) -> Self {
        use crate::adapters::CommandLineParser;
        self.with_parser(Box::new(CommandLineParser::new()))
    }

    /// Adds a YAML file as a source.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use optreg::service::RegistryBuilder;
    ///
    /// # fn main() -> optreg::domain::Result<()> {
    /// let registry = RegistryBuilder::new()
    ///     .with_yaml_file("/etc/myapp/config.yaml")?
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "yaml")]
    pub fn with_yaml_file(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        use crate::adapters::YamlFileParser;
        let parser = YamlFileParser::from_file(path)?;
        Ok(self.with_parser(Box::new(parser)))
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// - `InvalidSetting` if the separator or default group name is unusable
    pub fn build(self) -> Result<Registry> {
        self.settings.validate()?;
        let registry = Registry::with_settings(self.settings);
        if let Some(version) = self.version {
            registry.set_version(version)?;
        }
        registry.add_source_parsers(self.parsers)?;
        Ok(registry)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
