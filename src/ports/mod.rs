// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the interfaces the registry exchanges with the outside:
//! the source parsers that feed it values, the change observer it notifies, and
//! the descriptors configuration structs register through. Adapters in the
//! adapters layer implement these traits.

pub mod observer;
pub mod option_struct;
pub mod source;

// Re-export commonly used types
pub use observer::{ChangeCallback, ChangeEvent};
pub use option_struct::{FieldSpec, OptionStruct, Validate};
pub use source::SourceParser;
