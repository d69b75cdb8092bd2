// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry-wide settings and group path handling.

use crate::domain::errors::{RegistryError, Result};

/// The name of the default group.
pub const DEFAULT_GROUP_NAME: &str = "DEFAULT";

/// The default separator between group path segments.
pub const DEFAULT_GROUP_SEPARATOR: &str = ".";

/// Global settings of a registry.
///
/// # Examples
///
/// ```
/// use optreg::domain::RegistrySettings;
///
/// let settings = RegistrySettings::default();
/// assert_eq!(settings.canonical_path(""), "DEFAULT");
/// assert_eq!(settings.canonical_path("DEFAULT.db"), "db");
/// assert_eq!(settings.canonical_path(".db..pool."), "db.pool");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Name of the group that owns options registered without a group path.
    pub default_group_name: String,
    /// Separator between group path segments.
    pub group_separator: String,
    /// Treat every option as required.
    pub strict: bool,
    /// Give options left without value or default the zero value of their type.
    pub zero: bool,
    /// Surface registration and pipeline events at `info` level.
    pub debug: bool,
    /// Replace an already registered option instead of failing.
    pub ignore_reregister: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            default_group_name: DEFAULT_GROUP_NAME.to_string(),
            group_separator: DEFAULT_GROUP_SEPARATOR.to_string(),
            strict: false,
            zero: false,
            debug: false,
            ignore_reregister: false,
        }
    }
}

impl RegistrySettings {
    /// Checks that the default group name and separator are usable.
    pub fn validate(&self) -> Result<()> {
        if self.group_separator.is_empty() {
            return Err(RegistryError::InvalidSetting {
                setting: "group_separator".to_string(),
                message: "the separator is empty".to_string(),
            });
        }
        if self.default_group_name.is_empty() {
            return Err(RegistryError::InvalidSetting {
                setting: "default_group_name".to_string(),
                message: "the default group name is empty".to_string(),
            });
        }
        if self.default_group_name.contains(&self.group_separator) {
            return Err(RegistryError::InvalidSetting {
                setting: "default_group_name".to_string(),
                message: format!(
                    "the default group name must not contain the separator '{}'",
                    self.group_separator
                ),
            });
        }
        Ok(())
    }

    /// Returns the path segments of `path`, with empty segments dropped and the
    /// default group name (or its prefix) stripped.
    ///
    /// An empty result designates the default group.
    pub fn segments<'a>(&self, path: &'a str) -> Vec<&'a str> {
        let mut segments: Vec<&str> = path
            .split(self.group_separator.as_str())
            .filter(|segment| !segment.is_empty())
            .collect();
        if segments.first() == Some(&self.default_group_name.as_str()) {
            segments.remove(0);
        }
        segments
    }

    /// Returns the canonical full path of the group designated by `path`.
    pub fn canonical_path(&self, path: &str) -> String {
        let segments = self.segments(path);
        if segments.is_empty() {
            self.default_group_name.clone()
        } else {
            segments.join(&self.group_separator)
        }
    }

    /// Reports whether `path` designates the default group.
    pub fn is_default_group(&self, path: &str) -> bool {
        self.segments(path).is_empty()
    }

    /// Joins a group path and an option name with the separator.
    ///
    /// Options of the default group are returned unqualified.
    pub fn qualified_name(&self, group: &str, option: &str) -> String {
        if self.is_default_group(group) {
            option.to_string()
        } else {
            format!(
                "{}{}{}",
                self.canonical_path(group),
                self.group_separator,
                option
            )
        }
    }
}

/// Version information exposed to command-line parsers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionInfo {
    /// The version string printed by the flag.
    pub version: String,
    /// The long flag name, `version` by default.
    pub flag: String,
    /// The help text of the flag.
    pub help: String,
}

impl VersionInfo {
    /// Creates version information with the default flag name and help.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            flag: "version".to_string(),
            help: "Print the version and exit.".to_string(),
        }
    }

    /// Sets the long flag name.
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = flag.into();
        self
    }

    /// Sets the help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RegistrySettings::default();
        assert_eq!(settings.default_group_name, "DEFAULT");
        assert_eq!(settings.group_separator, ".");
        assert!(!settings.strict);
        assert!(!settings.zero);
        assert!(!settings.ignore_reregister);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_separator() {
        let settings = RegistrySettings {
            group_separator: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(RegistryError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_separator_in_default_name() {
        let settings = RegistrySettings {
            default_group_name: "MAIN.GROUP".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_canonical_path() {
        let settings = RegistrySettings::default();
        assert_eq!(settings.canonical_path("a.b.c"), "a.b.c");
        assert_eq!(settings.canonical_path("DEFAULT"), "DEFAULT");
        assert_eq!(settings.canonical_path("..."), "DEFAULT");
        assert_eq!(settings.canonical_path("a.DEFAULT"), "a.DEFAULT");
    }

    #[test]
    fn test_custom_separator() {
        let settings = RegistrySettings {
            group_separator: "::".to_string(),
            default_group_name: "root".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.canonical_path("root::net::tcp"), "net::tcp");
        assert_eq!(settings.segments("net::tcp"), vec!["net", "tcp"]);
        assert_eq!(settings.qualified_name("net", "port"), "net::port");
        assert_eq!(settings.qualified_name("root", "port"), "port");
    }

    #[test]
    fn test_version_info() {
        let info = VersionInfo::new("1.2.3").flag("ver").help("Show version");
        assert_eq!(info.version, "1.2.3");
        assert_eq!(info.flag, "ver");
        assert_eq!(info.help, "Show version");
    }
}
