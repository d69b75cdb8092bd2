// SPDX-License-Identifier: MIT OR Apache-2.0

//! Option definitions.
//!
//! An [`OptionSpec`] is the immutable identity of an option: its name, optional
//! short alias, help text, declared type, default and required flag. Specs are
//! built with [`OptionBuilder`], which rejects malformed definitions up front so no
//! type problem with a default can surface later at read time.

use crate::domain::errors::{RegistryError, Result};
use crate::domain::value::{FromValue, Value};
use crate::domain::value_type::ValueType;

/// The definition of a typed, named option.
///
/// # Examples
///
/// ```
/// use optreg::domain::{OptionSpec, Value};
///
/// let port = OptionSpec::of::<i64>("port")
///     .short("p")
///     .default_value(8080)
///     .help("Listen port")
///     .build()
///     .unwrap();
///
/// assert_eq!(port.name(), "port");
/// assert_eq!(port.default(), Some(&Value::I64(8080)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct OptionSpec {
    name: String,
    short: Option<String>,
    help: String,
    value_type: ValueType,
    default: Option<Value>,
    required: bool,
}

impl OptionSpec {
    /// Starts building an option of the given type.
    pub fn builder(name: impl Into<String>, value_type: ValueType) -> OptionBuilder {
        OptionBuilder {
            name: name.into(),
            short: None,
            help: String::new(),
            value_type,
            default: None,
            required: false,
        }
    }

    /// Starts building an option whose type matches the Rust type `T`.
    pub fn of<T: FromValue>(name: impl Into<String>) -> OptionBuilder {
        Self::builder(name, T::VALUE_TYPE)
    }

    /// Returns the option name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the short alias, if any.
    pub fn short(&self) -> Option<&str> {
        self.short.as_deref()
    }

    /// Returns the help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Returns the declared value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns the default value, if any.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Reports whether resolution must leave this option with a value.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Converts raw text using this option's declared type.
    pub fn parse_text(&self, raw: &str) -> Result<Value> {
        self.value_type.parse_text(raw)
    }

    /// Coerces a written value to this option's declared type.
    pub fn coerce(&self, value: Value) -> Result<Value> {
        self.value_type.coerce(value)
    }
}

/// Builder for [`OptionSpec`].
#[derive(Clone, Debug)]
pub struct OptionBuilder {
    name: String,
    short: Option<String>,
    help: String,
    value_type: ValueType,
    default: Option<Value>,
    required: bool,
}

impl OptionBuilder {
    /// Sets the short alias.
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    /// Sets the help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Sets the default value.
    ///
    /// The value is coerced to the declared type by [`OptionBuilder::build`].
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the default value from raw text.
    pub fn default_text(self, raw: &str) -> Self {
        self.default_value(Value::String(raw.to_string()))
    }

    /// Marks the option as required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Validates the definition and builds the spec.
    ///
    /// Fails with `InvalidOption` if the name is empty or contains whitespace, if
    /// the short alias is empty or equal to the name, or if the default cannot be
    /// coerced to the declared type.
    pub fn build(self) -> Result<OptionSpec> {
        let invalid = |message: String| RegistryError::InvalidOption {
            option: self.name.clone(),
            message,
        };

        if self.name.is_empty() {
            return Err(invalid("the name must not be empty".to_string()));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(invalid("the name must not contain whitespace".to_string()));
        }
        if let Some(short) = &self.short {
            if short.is_empty() || short.chars().any(char::is_whitespace) {
                return Err(invalid(format!("invalid short name '{}'", short)));
            }
            if *short == self.name {
                return Err(invalid(
                    "the short name must differ from the name".to_string(),
                ));
            }
        }

        let default = match self.default.clone() {
            Some(value) => Some(
                self.value_type
                    .coerce(value)
                    .map_err(|e| invalid(format!("default value rejected: {}", e)))?,
            ),
            None => None,
        };

        Ok(OptionSpec {
            name: self.name,
            short: self.short,
            help: self.help,
            value_type: self.value_type,
            default,
            required: self.required,
        })
    }
}
