// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable source parser.
//!
//! This module provides a parser that reads option values from environment
//! variables named after the options they set.

use crate::domain::{RegistrySettings, Result, Value};
use crate::ports::SourceParser;
use crate::service::Registry;
use std::collections::HashMap;
use std::env;

/// Maximum length for environment variable keys (prevents DoS)
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values (prevents DoS)
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Source parser for environment variables.
///
/// The variable for an option is the prefix followed by the group path and the
/// option name, joined with underscores and upper-cased, with dashes turned into
/// underscores. With prefix `APP_`, option `port` of the default group reads
/// `APP_PORT` and option `max-conns` of group `db.pool` reads
/// `APP_DB_POOL_MAX_CONNS`.
///
/// # Priority
///
/// Environment variables have a priority of 50, which means they override
/// configuration files (10) but are overridden by command-line arguments (100).
///
/// # Examples
///
/// ```rust
/// use optreg::adapters::EnvVarParser;
/// use optreg::domain::OptionSpec;
/// use optreg::service::Registry;
/// use std::collections::HashMap;
///
/// let registry = Registry::new();
/// registry
///     .register_option("db", OptionSpec::of::<String>("host").build().unwrap(), false)
///     .unwrap();
///
/// let values = HashMap::from([("APP_DB_HOST".to_string(), "db.internal".to_string())]);
/// registry
///     .add_source_parser(EnvVarParser::with_values(values).prefix("APP_"))
///     .unwrap();
/// registry.parse(Vec::<String>::new()).unwrap();
///
/// assert_eq!(registry.get::<String>("db", "host").unwrap(), "db.internal");
/// ```
#[derive(Debug)]
pub struct EnvVarParser {
    /// Prepended to every variable name
    prefix: String,
    priority: i32,
    /// Values supplied up front instead of read from the process
    preloaded: Option<HashMap<String, String>>,
    /// Variables captured during setup
    vars: HashMap<String, String>,
}

impl EnvVarParser {
    /// Creates an environment variable parser without a prefix.
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            priority: 50,
            preloaded: None,
            vars: HashMap::new(),
        }
    }

    /// Creates an environment variable parser whose variables start with `prefix`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use optreg::adapters::EnvVarParser;
    ///
    /// let parser = EnvVarParser::with_prefix("MYAPP_");
    /// assert_eq!(parser.variable_name(&Default::default(), "db", "host"), "MYAPP_DB_HOST");
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::new().prefix(prefix)
    }

    /// Creates a parser that reads from `values` instead of the process
    /// environment.
    ///
    /// **Note**: This method is primarily intended for testing. Keys are full
    /// variable names, prefix included.
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self {
            preloaded: Some(values),
            ..Self::new()
        }
    }

    /// Sets the variable prefix.
    ///
    /// The prefix is normalized like the rest of the variable name, so
    /// `myapp-` and `MYAPP_` select the same variables.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().to_uppercase().replace('-', "_");
        self
    }

    /// Overrides the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the variable name read for `option` of the group at `group_path`.
    pub fn variable_name(&self, settings: &RegistrySettings, group_path: &str, option: &str) -> String {
        let mut name = self.prefix.clone();
        for segment in settings.segments(group_path) {
            name.push_str(segment);
            name.push('_');
        }
        name.push_str(option);
        name.to_uppercase().replace('-', "_")
    }

    /// Loads environment variables that start with the prefix.
    fn load(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();

        for (key, value) in env::vars() {
            // Validate input sizes to prevent DoS
            if key.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::debug!(
                    "Skipping oversized environment variable: key_len={}, value_len={} (max key={}, max value={})",
                    key.len(),
                    value.len(),
                    MAX_ENV_KEY_LEN,
                    MAX_ENV_VALUE_LEN
                );
                continue;
            }
            if key.starts_with(&self.prefix) {
                vars.insert(key, value);
            }
        }

        tracing::debug!(
            "Loaded {} environment variables (prefix={:?})",
            vars.len(),
            self.prefix
        );

        vars
    }
}

impl Default for EnvVarParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for EnvVarParser {
    fn name(&self) -> &str {
        "env"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn setup(&mut self, _registry: &Registry) -> Result<()> {
        self.vars = match &self.preloaded {
            Some(values) => values.clone(),
            None => self.load(),
        };
        Ok(())
    }

    fn resolve(&mut self, registry: &Registry) -> Result<()> {
        let settings = registry.settings();
        for group in registry.groups() {
            for spec in group.options() {
                let var = self.variable_name(&settings, group.full_path(), spec.name());
                if let Some(raw) = self.vars.get(&var) {
                    tracing::debug!(variable = %var, "Setting option from environment");
                    group.set_option_value(self.priority, spec.name(), Value::String(raw.clone()))?;
                }
            }
        }
        Ok(())
    }

    fn teardown(&mut self, _registry: &Registry) -> Result<()> {
        self.vars.clear();
        Ok(())
    }
}
