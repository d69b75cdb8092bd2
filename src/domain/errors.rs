// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the option registry.
//!
//! Every fallible operation in the crate reports a [`RegistryError`]. Misuse of the
//! registry (duplicate registration, structural changes after parsing, malformed
//! option definitions) is reported through dedicated variants rather than by
//! aborting, so embedding programs may treat it as recoverable.

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Boxed error type carried as the `source` of conversion and validation failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for registry operations.
///
/// # Examples
///
/// ```
/// use optreg::domain::errors::RegistryError;
///
/// fn lookup() -> Result<String, RegistryError> {
///     Err(RegistryError::GroupNotFound {
///         group: "database".to_string(),
///     })
/// }
///
/// assert_eq!(lookup().unwrap_err().to_string(), "no group 'database'");
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// A structural change was attempted after parsing began.
    #[error("the registry has already been parsed")]
    AlreadyParsed,

    /// A post-parse accessor was used before parsing.
    #[error("the registry has not been parsed")]
    NotParsed,

    /// A registry setting was given an unusable value.
    #[error("invalid setting '{setting}': {message}")]
    InvalidSetting {
        /// The setting being changed
        setting: String,
        /// Why the value was rejected
        message: String,
    },

    /// An option definition is malformed.
    #[error("invalid option '{option}': {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why the definition was rejected
        message: String,
    },

    /// A value type name is not one of the supported kinds.
    #[error("unsupported value type '{name}'")]
    UnsupportedType {
        /// The rejected type name
        name: String,
    },

    /// An option with the same name or short name already exists in the group.
    #[error("option '{option}' is already registered in group '{group}'")]
    DuplicateOption {
        /// The group path
        group: String,
        /// The conflicting name
        option: String,
    },

    /// The requested group does not exist.
    #[error("no group '{group}'")]
    GroupNotFound {
        /// The group path that was looked up
        group: String,
    },

    /// The requested option does not exist in the group.
    #[error("no option '{option}' in group '{group}'")]
    OptionNotFound {
        /// The group path
        group: String,
        /// The option name
        option: String,
    },

    /// The option exists but has neither a value nor a default.
    #[error("option '{option}' in group '{group}' has no value")]
    OptionUnset {
        /// The group path
        group: String,
        /// The option name
        option: String,
    },

    /// A write was tagged with a negative priority.
    #[error("the priority must not be negative, got {priority}")]
    NegativePriority {
        /// The rejected priority
        priority: i32,
    },

    /// A value has a shape that cannot be coerced to the expected type.
    #[error("expected a value of type {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type name
        expected: String,
        /// The actual type name
        actual: String,
    },

    /// Raw text or a numeric value could not be converted to the target type.
    #[error("failed to convert '{input}' to {target_type}: {source}")]
    TypeConversion {
        /// The input being converted
        input: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: BoxError,
    },

    /// A value written to or read from an option was rejected.
    #[error("invalid value for option '{option}' in group '{group}': {source}")]
    InvalidValue {
        /// The group path
        group: String,
        /// The option name
        option: String,
        /// The underlying type error
        #[source]
        source: Box<RegistryError>,
    },

    /// A change observer has already been registered.
    #[error("a change observer is already registered")]
    ObserverAlreadySet,

    /// A source parser hook failed.
    #[error("the '{parser}' parser failed during {stage}: {source}")]
    ParserFailed {
        /// The name of the failing parser
        parser: String,
        /// The hook that failed (`setup`, `resolve` or `teardown`)
        stage: &'static str,
        /// The error returned by the hook
        #[source]
        source: Box<RegistryError>,
    },

    /// A required option was left without a value after resolution.
    #[error("missing required option '{option}' in group '{group}'")]
    MissingRequiredOption {
        /// The group path
        group: String,
        /// The option name
        option: String,
    },

    /// A validator returned an error.
    #[error("validator '{validator}' failed: {source}")]
    ValidationFailed {
        /// The name of the failing validator
        validator: String,
        /// The error returned by the validator
        #[source]
        source: Box<RegistryError>,
    },

    /// A consistency check rejected the resolved values.
    #[error("{message}")]
    Validation {
        /// Human-readable description of the violation
        message: String,
    },

    /// An error occurred in a source parser's backing store.
    #[error("configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<BoxError>,
    },

    /// Failed to parse a configuration document.
    #[error("failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<BoxError>,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RegistryError {
    /// Creates a `Validation` error with the given message.
    ///
    /// Intended for use inside validators.
    pub fn validation(message: impl Into<String>) -> Self {
        RegistryError::Validation {
            message: message.into(),
        }
    }

    /// Creates a `TypeConversion` error from any error value.
    pub fn conversion(
        input: impl Into<String>,
        target_type: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        RegistryError::TypeConversion {
            input: input.into(),
            target_type: target_type.into(),
            source: source.into(),
        }
    }

    /// Creates a `TypeConversion` error from a `ParseIntError`.
    pub fn from_parse_int_error(input: &str, target_type: &str, err: ParseIntError) -> Self {
        Self::conversion(input, target_type, err)
    }

    /// Creates a `TypeConversion` error from a `ParseFloatError`.
    pub fn from_parse_float_error(input: &str, target_type: &str, err: ParseFloatError) -> Self {
        Self::conversion(input, target_type, err)
    }

    /// Wraps a type error with the group and option it concerns.
    pub(crate) fn for_option(self, group: &str, option: &str) -> Self {
        RegistryError::InvalidValue {
            group: group.to_string(),
            option: option.to_string(),
            source: Box::new(self),
        }
    }
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_not_found_error() {
        let error = RegistryError::GroupNotFound {
            group: "db".to_string(),
        };
        assert_eq!(error.to_string(), "no group 'db'");
    }

    #[test]
    fn test_type_conversion_error() {
        let source_error = "abc".parse::<i32>().unwrap_err();
        let error = RegistryError::from_parse_int_error("abc", "i32", source_error);
        assert!(matches!(error, RegistryError::TypeConversion { .. }));
        assert!(error.to_string().contains("'abc'"));
        assert!(error.to_string().contains("i32"));
    }

    #[test]
    fn test_from_parse_float_error() {
        let parse_err = "x".parse::<f64>().unwrap_err();
        let error = RegistryError::from_parse_float_error("x", "f64", parse_err);
        assert!(error.to_string().contains("f64"));
    }

    #[test]
    fn test_parser_failed_keeps_source() {
        use std::error::Error;

        let error = RegistryError::ParserFailed {
            parser: "env".to_string(),
            stage: "resolve",
            source: Box::new(RegistryError::NegativePriority { priority: -1 }),
        };
        assert_eq!(
            error.to_string(),
            "the 'env' parser failed during resolve: the priority must not be negative, got -1"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn test_missing_required_option() {
        let error = RegistryError::MissingRequiredOption {
            group: "DEFAULT".to_string(),
            option: "token".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "missing required option 'token' in group 'DEFAULT'"
        );
    }

    #[test]
    fn test_validation_helper() {
        let error = RegistryError::validation("port must be positive");
        assert_eq!(error.to_string(), "port must be positive");
    }

    #[test]
    fn test_for_option_wraps() {
        let error = RegistryError::TypeMismatch {
            expected: "i64".to_string(),
            actual: "bool".to_string(),
        }
        .for_option("db", "port");
        assert!(matches!(error, RegistryError::InvalidValue { .. }));
        assert!(error.to_string().contains("'port' in group 'db'"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = RegistryError::from(io_error);
        assert!(matches!(error, RegistryError::IoError(_)));
    }
}
