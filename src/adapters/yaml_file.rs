// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML file source parser.
//!
//! This module provides a parser that reads option values from YAML documents.

use crate::domain::errors::BoxError;
use crate::domain::{RegistryError, Result, Value};
use crate::ports::SourceParser;
use crate::service::Registry;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum allowed file size for YAML configuration files (10MB)
/// This prevents denial of service attacks via extremely large files
const MAX_YAML_FILE_SIZE: u64 = 10 * 1024 * 1024;

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
}

fn source_error(message: String, source: Option<std::io::Error>) -> RegistryError {
    RegistryError::SourceError {
        source_name: "yaml-file".to_string(),
        message,
        source: source.map(|e| Box::new(e) as BoxError),
    }
}

/// Source parser for YAML documents.
///
/// Nested mappings address groups: the key path `db.pool.size` sets option
/// `size` of group `db.pool`, whether it is written as nested mappings or as a
/// single key containing the registry's group separator. Top-level keys set
/// options of the default group. Sequences of scalars set sequence options.
/// Keys that do not name a registered option are ignored, and null values leave
/// the option untouched.
///
/// # Priority
///
/// YAML files have a priority of 10, which means they are overridden by both
/// environment variables (50) and command-line arguments (100).
///
/// # Examples
///
/// ```rust
/// use optreg::adapters::YamlFileParser;
/// use optreg::domain::OptionSpec;
/// use optreg::service::Registry;
///
/// let registry = Registry::new();
/// registry
///     .register_option("database", OptionSpec::of::<u16>("port").build().unwrap(), false)
///     .unwrap();
///
/// let parser = YamlFileParser::from_yaml("database:\n  port: 5432\n").unwrap();
/// registry.add_source_parser(parser).unwrap();
/// registry.parse(Vec::<String>::new()).unwrap();
///
/// assert_eq!(registry.get::<u16>("database", "port").unwrap(), 5432);
/// ```
#[derive(Debug, Clone)]
pub struct YamlFileParser {
    /// Path to the YAML file, if the document came from one
    file_path: Option<PathBuf>,
    /// Parsed document
    document: serde_yaml::Value,
    priority: i32,
}

impl YamlFileParser {
    /// Creates a parser from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the text is not valid YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let document: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| RegistryError::ParseError {
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            file_path: None,
            document,
            priority: 10,
        })
    }

    /// Creates a parser from a YAML file.
    ///
    /// The file is read and parsed immediately.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use optreg::adapters::YamlFileParser;
    ///
    /// let parser = YamlFileParser::from_file("/etc/myapp/config.yaml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();

        // Canonicalize path to prevent directory traversal attacks
        let canonical_path = file_path.canonicalize().map_err(|e| {
            source_error(
                format!("Invalid or inaccessible path: {}", file_name(&file_path)),
                Some(e),
            )
        })?;

        // Check file size before reading to prevent DoS via large files
        let metadata = fs::metadata(&canonical_path).map_err(|e| {
            source_error(
                format!("Failed to read file metadata: {}", file_name(&canonical_path)),
                Some(e),
            )
        })?;

        if metadata.len() > MAX_YAML_FILE_SIZE {
            return Err(source_error(
                format!(
                    "Configuration file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_YAML_FILE_SIZE
                ),
                None,
            ));
        }

        let content = fs::read_to_string(&canonical_path).map_err(|e| {
            source_error(
                format!(
                    "Failed to read configuration file: {}",
                    file_name(&canonical_path)
                ),
                Some(e),
            )
        })?;

        let mut parser = Self::from_yaml(&content)?;
        parser.file_path = Some(canonical_path);
        Ok(parser)
    }

    /// Creates a parser from `config.yaml` in the OS-appropriate configuration
    /// directory of the application.
    ///
    /// # Arguments
    ///
    /// * `app_name` - The application name (e.g., "myapp")
    /// * `qualifier` - The organization/qualifier (e.g., "com.example")
    pub fn from_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        Self::with_filename(app_name, qualifier, "config.yaml")
    }

    /// Creates a parser from a custom file name in the default location.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use optreg::adapters::YamlFileParser;
    ///
    /// let parser = YamlFileParser::with_filename("myapp", "com.example", "settings.yaml").unwrap();
    /// ```
    pub fn with_filename(app_name: &str, qualifier: &str, filename: &str) -> Result<Self> {
        let proj_dirs = ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| {
            source_error("Failed to determine project directories".to_string(), None)
        })?;

        Self::from_file(proj_dirs.config_dir().join(filename))
    }

    /// Overrides the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the path to the configuration file, if there is one.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Flattens the document into `(key path, value)` pairs, joining nested
    /// keys with `separator`.
    fn flatten(&self, separator: &str) -> Vec<(String, Value)> {
        let mut entries = Vec::new();
        flatten_yaml(&self.document, "", separator, &mut entries);
        entries
    }
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

fn flatten_yaml(
    value: &serde_yaml::Value,
    prefix: &str,
    separator: &str,
    entries: &mut Vec<(String, Value)>,
) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, val) in map {
                let Some(key) = scalar_text(key) else {
                    continue;
                };
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{}{}{}", prefix, separator, key)
                };
                flatten_yaml(val, &path, separator, entries);
            }
        }
        serde_yaml::Value::Sequence(seq) => {
            let items: Option<Vec<Value>> = seq
                .iter()
                .map(|item| scalar_text(item).map(Value::String))
                .collect();
            match items {
                Some(items) => entries.push((prefix.to_string(), Value::List(items))),
                None => tracing::debug!(key = %prefix, "Skipping YAML sequence of non-scalar values"),
            }
        }
        serde_yaml::Value::Null => {}
        serde_yaml::Value::Tagged(tagged) => flatten_yaml(&tagged.value, prefix, separator, entries),
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                entries.push((prefix.to_string(), Value::String(text)));
            }
        }
    }
}

impl SourceParser for YamlFileParser {
    fn name(&self) -> &str {
        "yaml-file"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn resolve(&mut self, registry: &Registry) -> Result<()> {
        let separator = registry.settings().group_separator;
        for (key, value) in self.flatten(&separator) {
            let (group_path, option) = key
                .rsplit_once(separator.as_str())
                .unwrap_or(("", key.as_str()));
            let Ok(group) = registry.group(group_path) else {
                tracing::debug!(key = %key, "Ignoring YAML key for unknown group");
                continue;
            };
            if !group.has_option(option) {
                tracing::debug!(key = %key, "Ignoring YAML key for unknown option");
                continue;
            }
            group.set_option_value(self.priority, option, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OptionSpec;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn keys(parser: &YamlFileParser, separator: &str) -> Vec<(String, Value)> {
        let mut entries = parser.flatten(separator);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    #[test]
    fn test_flatten_nested() {
        let parser = YamlFileParser::from_yaml(
            r#"
app:
  database:
    connection:
      host: localhost
      port: 5432
"#,
        )
        .unwrap();

        assert_eq!(
            keys(&parser, "."),
            vec![
                ("app.database.connection.host".to_string(), Value::from("localhost")),
                ("app.database.connection.port".to_string(), Value::from("5432")),
            ]
        );
        assert_eq!(keys(&parser, "/")[0].0, "app/database/connection/host");
    }

    #[test]
    fn test_flatten_sequences_and_nulls() {
        let parser = YamlFileParser::from_yaml(
            r#"
servers:
  - server1
  - 2
nested:
  - a: 1
null_value: null
bool_value: true
"#,
        )
        .unwrap();

        assert_eq!(
            keys(&parser, "."),
            vec![
                ("bool_value".to_string(), Value::from("true")),
                (
                    "servers".to_string(),
                    Value::List(vec![Value::from("server1"), Value::from("2")])
                ),
            ]
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let err = YamlFileParser::from_yaml("invalid: yaml: content:").unwrap_err();
        assert!(matches!(err, RegistryError::ParseError { .. }));
    }

    #[test]
    fn test_yaml_parser_from_file_sets_options() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            "verbose: true\ndatabase:\n  timeout: 1m\n  hosts: [a, b]\nunknown: 1\nmissing:\n  group: 2"
        )
        .unwrap();

        let parser = YamlFileParser::from_file(temp_file.path()).unwrap();
        assert_eq!(parser.name(), "yaml-file");
        assert_eq!(parser.priority(), 10);

        let registry = Registry::new();
        registry
            .register_option("", OptionSpec::of::<bool>("verbose").build().unwrap(), true)
            .unwrap();
        registry
            .register_options(
                "database",
                vec![
                    OptionSpec::of::<Duration>("timeout").build().unwrap(),
                    OptionSpec::of::<Vec<String>>("hosts").build().unwrap(),
                ],
                false,
            )
            .unwrap();
        registry.add_source_parser(parser).unwrap();
        registry.parse(Vec::<String>::new()).unwrap();

        assert!(registry.get::<bool>("", "verbose").unwrap());
        assert_eq!(
            registry.get::<Duration>("database", "timeout").unwrap(),
            Duration::from_secs(60)
        );
        assert_eq!(
            registry.get::<Vec<String>>("database", "hosts").unwrap(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_yaml_parser_dotted_keys() {
        let registry = Registry::new();
        registry
            .register_option("db", OptionSpec::of::<u32>("size").build().unwrap(), false)
            .unwrap();
        registry
            .add_source_parser(YamlFileParser::from_yaml("db.size: 4\n").unwrap())
            .unwrap();
        registry.parse(Vec::<String>::new()).unwrap();
        assert_eq!(registry.get::<u32>("db", "size").unwrap(), 4);
    }

    #[test]
    fn test_yaml_parser_bad_value_fails() {
        let registry = Registry::new();
        registry
            .register_option("", OptionSpec::of::<u32>("size").build().unwrap(), false)
            .unwrap();
        registry
            .add_source_parser(YamlFileParser::from_yaml("size: large\n").unwrap())
            .unwrap();
        assert!(registry.parse(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_yaml_parser_file_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "key: value").unwrap();

        let parser = YamlFileParser::from_file(temp_file.path()).unwrap();
        assert_eq!(
            parser.file_path(),
            Some(temp_file.path().canonicalize().unwrap().as_path())
        );
        assert_eq!(YamlFileParser::from_yaml("a: 1").unwrap().file_path(), None);
    }

    #[test]
    fn test_yaml_parser_nonexistent_file() {
        let err = YamlFileParser::from_file("/nonexistent/path/to/config.yaml").unwrap_err();
        assert!(err.to_string().contains("config.yaml"));
    }
}
