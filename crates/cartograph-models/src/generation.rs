//! Generation tokens for scan requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically increasing token distinguishing successive scan requests.
///
/// Output tagged with a generation that is no longer current is stale and
/// must be discarded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// The generation before any scan has started.
    pub const INITIAL: Generation = Generation(0);

    /// Creates a generation from a raw counter value.
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the generation that follows this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_ordering() {
        let first = Generation::INITIAL.next();
        let second = first.next();

        assert!(second > first);
        assert_eq!(second.get(), 2);
        assert_eq!(second.to_string(), "gen-2");
        assert_eq!(Generation::default(), Generation::INITIAL);
    }

    #[test]
    fn test_generation_serializes_as_counter() {
        let generation = Generation::from_raw(7);
        let json = serde_json::to_string(&generation).unwrap();
        assert_eq!(json, "7");

        let parsed: Generation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, generation);
    }
}
