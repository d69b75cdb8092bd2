// SPDX-License-Identifier: MIT OR Apache-2.0

//! A typed option registry with grouped namespaces and priority-arbitrated
//! multi-source resolution.
//!
//! Applications register typed options into hierarchical groups, attach source
//! parsers (command line, environment, YAML files, or their own), and call
//! [`Registry::parse`](service::Registry::parse) once. Every parser writes the
//! values it finds with its priority; when two sources set the same option the
//! higher priority wins, whatever order they run in.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types (`Value`, `ValueType`, `OptionSpec`, settings, errors)
//! - **Ports**: Trait definitions at the seams (`SourceParser`, `OptionStruct`, change observers)
//! - **Adapters**: Source parsers for the command line, environment variables and YAML files
//! - **Service**: The `Registry` and its `Group`s, which run the parse pipeline
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML file support (default)
//! - `env`: Enable environment variable support (default)
//! - `cli`: Enable command-line argument support (default)
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use optreg::prelude::*;
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::builder()
//!     .with_parser(Box::new(EnvVarParser::with_values(HashMap::from([(
//!         "APP_SERVER_TIMEOUT".to_string(),
//!         "30s".to_string(),
//!     )]))
//!     .prefix("APP_")))
//!     .with_cli()
//!     .build()?;
//!
//! registry.register_option(
//!     "server",
//!     OptionSpec::of::<u16>("port").default_value(8080u16).help("Listen port").build()?,
//!     true,
//! )?;
//! registry.register_option("server", OptionSpec::of::<Duration>("timeout").build()?, true)?;
//!
//! registry.parse(["--server.port", "9000"])?;
//!
//! let server = registry.group("server")?;
//! assert_eq!(server.get_u16("port")?, 9000);
//! assert_eq!(server.get_duration("timeout")?, Duration::from_secs(30));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        FromValue, OptionSpec, RegistryError, RegistrySettings, Result, ScalarKind, Value,
        ValueType, VersionInfo,
    };
    pub use crate::ports::{ChangeCallback, FieldSpec, OptionStruct, SourceParser, Validate};
    pub use crate::service::{Group, Phase, Registry, RegistryBuilder};

    // Re-export adapters based on feature flags
    #[cfg(feature = "cli")]
    pub use crate::adapters::CommandLineParser;
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarParser;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::YamlFileParser;
}
