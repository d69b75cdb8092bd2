// SPDX-License-Identifier: MIT OR Apache-2.0

//! The registry's position in the parse pipeline.

use std::fmt;

/// The phase of a registry's parse pipeline.
///
/// A registry moves `Unparsed → Preparing → Resolving → Finalizing → Parsed`. A
/// failure during `Preparing` returns it to `Unparsed`; a failure in any later
/// phase leaves it `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Options, groups, parsers and settings may all change.
    Unparsed,
    /// Setup hooks are running; options and groups may still be registered.
    Preparing,
    /// Resolve hooks are running.
    Resolving,
    /// Teardown hooks, required checks and validators are running.
    Finalizing,
    /// Parsing succeeded.
    Parsed,
    /// Parsing failed after resolution began.
    Failed,
}

impl Phase {
    /// Reports whether resolution has begun.
    ///
    /// Once this is true it stays true for the life of the registry.
    pub fn is_parsed(self) -> bool {
        matches!(
            self,
            Phase::Resolving | Phase::Finalizing | Phase::Parsed | Phase::Failed
        )
    }

    /// Reports whether options and groups may be registered.
    pub fn allows_registration(self) -> bool {
        matches!(self, Phase::Unparsed | Phase::Preparing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Unparsed => "unparsed",
            Phase::Preparing => "preparing",
            Phase::Resolving => "resolving",
            Phase::Finalizing => "finalizing",
            Phase::Parsed => "parsed",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_phases() {
        assert!(!Phase::Unparsed.is_parsed());
        assert!(!Phase::Preparing.is_parsed());
        assert!(Phase::Resolving.is_parsed());
        assert!(Phase::Finalizing.is_parsed());
        assert!(Phase::Parsed.is_parsed());
        assert!(Phase::Failed.is_parsed());
    }

    #[test]
    fn test_registration_window() {
        assert!(Phase::Unparsed.allows_registration());
        assert!(Phase::Preparing.allows_registration());
        assert!(!Phase::Resolving.allows_registration());
        assert!(!Phase::Failed.allows_registration());
    }
}
