// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing the core option types.
//!
//! This module defines what an option is (its [`OptionSpec`] and [`ValueType`]),
//! what it can hold ([`Value`]), how raw text becomes a value, and the errors and
//! settings shared by the rest of the crate. It has no knowledge of groups,
//! registries or sources.

pub mod convert;
pub mod errors;
pub mod option;
pub mod settings;
pub mod value;
pub mod value_type;

// Re-export commonly used types
pub use errors::{RegistryError, Result};
pub use option::{OptionBuilder, OptionSpec};
pub use settings::{RegistrySettings, VersionInfo};
pub use value::{FromValue, Value};
pub use value_type::{ScalarKind, ValueType};
