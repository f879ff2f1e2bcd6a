//! Opaque identifiers shared across the whole resolved view.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-letter team identifier, e.g. `"ABC"`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tla(String);

impl Tla {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tla {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Tla {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Name of a match arena, e.g. `"A"`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArenaName(String);

impl ArenaName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArenaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArenaName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Monotonically increasing match number, unique across league, knockout
/// and tiebreaker matches.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchNumber(pub u32);

impl fmt::Display for MatchNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a single match within one arena.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchId {
    pub arena: ArenaName,
    pub num: MatchNumber,
}

impl MatchId {
    pub fn new(arena: ArenaName, num: MatchNumber) -> Self {
        Self { arena, num }
    }
}

/// Raw points scored in a single match by a single team, before league
/// or knockout normalisation.
pub type GamePoints = i64;
