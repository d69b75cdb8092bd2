// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative registration of configuration structs.
//!
//! A struct describes its options by implementing [`OptionStruct`]: `fields`
//! lists one [`FieldSpec`] per field and `load` reads the resolved values back
//! into the struct. Structs that can check their own consistency also implement
//! [`Validate`], and are registered with
//! [`Registry::register_validated_struct`](crate::service::Registry::register_validated_struct).

use crate::domain::{OptionSpec, Result};
use crate::service::Registry;

/// The registration descriptor of one struct field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    /// The option backing the field
    pub option: OptionSpec,
    /// A group path that overrides the struct's group; `Some("")` is the default group
    pub group: Option<String>,
    /// Overrides whether the option is exposed to command-line parsers
    pub cli: Option<bool>,
}

impl FieldSpec {
    /// Creates a descriptor that inherits the struct's group and CLI setting.
    pub fn new(option: OptionSpec) -> Self {
        Self {
            option,
            group: None,
            cli: None,
        }
    }

    /// Registers the field in `group` instead of the struct's group.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Overrides the CLI exposure of the field.
    pub fn cli(mut self, cli: bool) -> Self {
        self.cli = Some(cli);
        self
    }

    /// Returns the group path the field registers into.
    pub fn group_or<'a>(&'a self, group: &'a str) -> &'a str {
        self.group.as_deref().unwrap_or(group)
    }
}

/// A struct whose fields are registry options.
///
/// # Examples
///
/// ```rust
/// use optreg::domain::{OptionSpec, Result};
/// use optreg::ports::{FieldSpec, OptionStruct};
/// use optreg::service::Registry;
///
/// struct Database {
///     host: String,
///     port: u16,
/// }
///
/// impl OptionStruct for Database {
///     fn fields() -> Result<Vec<FieldSpec>> {
///         Ok(vec![
///             FieldSpec::new(OptionSpec::of::<String>("host").default_value("localhost").build()?),
///             FieldSpec::new(OptionSpec::of::<u16>("port").default_value(5432u16).build()?),
///         ])
///     }
///
///     fn load(registry: &Registry, group: &str) -> Result<Self> {
///         Ok(Self {
///             host: registry.get(group, "host")?,
///             port: registry.get(group, "port")?,
///         })
///     }
/// }
///
/// # fn main() -> Result<()> {
/// let registry = Registry::new();
/// registry.register_struct::<Database>("db", false)?;
/// registry.parse(Vec::<String>::new())?;
///
/// let db: Database = registry.load("db")?;
/// assert_eq!(db.host, "localhost");
/// assert_eq!(db.port, 5432);
/// # Ok(())
/// # }
/// ```
pub trait OptionStruct: Sized {
    /// Describes the options backing the struct's fields.
    fn fields() -> Result<Vec<FieldSpec>>;

    /// Builds the struct from the values resolved in `group`.
    fn load(registry: &Registry, group: &str) -> Result<Self>;
}

/// A post-resolution consistency check.
pub trait Validate {
    /// Checks the resolved values, returning an error describing the first violation.
    fn validate(&self) -> Result<()>;
}
