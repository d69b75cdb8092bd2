// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing source parser implementations.
//!
//! Each adapter implements the [`SourceParser`](crate::ports::SourceParser)
//! trait to write option values from one source into a registry during parsing.

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "env")]
pub mod env_var;
#[cfg(feature = "yaml")]
pub mod yaml_file;

// Re-export adapters based on feature flags
#[cfg(feature = "cli")]
pub use cli::CommandLineParser;
#[cfg(feature = "env")]
pub use env_var::EnvVarParser;
#[cfg(feature = "yaml")]
pub use yaml_file::YamlFileParser;
