// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source parser trait definition.
//!
//! This module defines the `SourceParser` trait, the port through which values
//! enter the registry. Any source (command line, environment variables, files,
//! remote services) plugs into the parse pipeline by implementing this trait.

use crate::domain::Result;
use crate::service::Registry;

/// A source of option values driven by the registry's parse pipeline.
///
/// The registry calls the three hooks of every parser in ascending priority
/// order: all `setup` hooks first, then all `resolve` hooks, then all `teardown`
/// hooks. A parser writes values during `resolve` through
/// [`Registry::set_option_value`], tagging each write with its own priority.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the registry holding them can be
/// shared across threads.
///
/// # Priority
///
/// The priority decides both when the hooks run (lower runs earlier) and whose
/// writes win (a write only replaces a value written with a lower or equal
/// priority). The bundled adapters use:
///
/// - **100**: Command-line arguments
/// - **50**: Environment variables
/// - **10**: Configuration files
///
/// Priority `0` is reserved for forced writes and should not be used by a parser.
///
/// # Examples
///
/// ```rust
/// use optreg::domain::{OptionSpec, Result};
/// use optreg::ports::SourceParser;
/// use optreg::service::Registry;
///
/// struct Fixed;
///
/// impl SourceParser for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn priority(&self) -> i32 {
///         5
///     }
///
///     fn resolve(&mut self, registry: &Registry) -> Result<()> {
///         registry.set_option_value(self.priority(), "", "port", 9090i64)
///     }
/// }
///
/// # fn main() -> Result<()> {
/// let registry = Registry::new();
/// registry.register_option("", OptionSpec::of::<i64>("port").build()?, false)?;
/// registry.add_source_parsers(vec![Box::new(Fixed)])?;
/// registry.parse(Vec::<String>::new())?;
/// assert_eq!(registry.get::<i64>("", "port")?, 9090);
/// # Ok(())
/// # }
/// ```
pub trait SourceParser: Send + Sync {
    /// Returns the name of this parser.
    ///
    /// The name identifies the parser in error messages and logs, and is the key
    /// used by [`Registry::remove_parser`] and [`Registry::has_parser`].
    fn name(&self) -> &str;

    /// Returns the priority of this parser.
    fn priority(&self) -> i32;

    /// Prepares the parser before any value is resolved.
    ///
    /// Options and groups may still be registered while setup hooks run. A
    /// failure leaves the registry unparsed, so `parse` may be retried.
    fn setup(&mut self, _registry: &Registry) -> Result<()> {
        Ok(())
    }

    /// Writes the values this source provides.
    fn resolve(&mut self, registry: &Registry) -> Result<()>;

    /// Releases whatever the parser acquired during setup.
    fn teardown(&mut self, _registry: &Registry) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OptionSpec;

    struct Named {
        name: &'static str,
        priority: i32,
        resolved: bool,
    }

    impl SourceParser for Named {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn resolve(&mut self, _registry: &Registry) -> Result<()> {
            self.resolved = true;
            Ok(())
        }
    }

    #[test]
    fn test_default_hooks_are_noops() {
        let registry = Registry::new();
        let mut parser = Named {
            name: "named",
            priority: 1,
            resolved: false,
        };
        assert!(parser.setup(&registry).is_ok());
        assert!(parser.teardown(&registry).is_ok());
        assert!(!parser.resolved);
        assert!(parser.resolve(&registry).is_ok());
        assert!(parser.resolved);
    }

    #[test]
    fn test_trait_object() {
        let registry = Registry::new();
        registry
            .register_option("", OptionSpec::of::<bool>("flag").build().unwrap(), false)
            .unwrap();
        let parser: Box<dyn SourceParser> = Box::new(Named {
            name: "boxed",
            priority: 7,
            resolved: false,
        });
        assert_eq!(parser.name(), "boxed");
        assert_eq!(parser.priority(), 7);
    }
}
