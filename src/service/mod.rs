// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the registry.
//!
//! This module contains the [`Registry`] that orchestrates option registration
//! and the parse pipeline, the [`Group`]s it is made of, and the [`Phase`] it
//! moves through.

pub mod group;
pub mod phase;
pub mod registry;

// Re-export commonly used types
pub use group::Group;
pub use phase::Phase;
pub use registry::{Registry, RegistryBuilder};
