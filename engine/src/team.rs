//! Team roster.

use crate::ids::{MatchNumber, Tla};
use serde::{Deserialize, Serialize};

/// A single competing team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub tla: Tla,
    pub name: String,
    #[serde(default)]
    pub rookie: bool,
    #[serde(default)]
    pub dropped_out_after: Option<MatchNumber>,
}

impl Team {
    pub fn new(tla: impl Into<Tla>, name: impl Into<String>) -> Self {
        Self {
            tla: tla.into(),
            name: name.into(),
            rookie: false,
            dropped_out_after: None,
        }
    }

    /// Whether the team is still competing at (and including) `num`.
    pub fn is_still_around(&self, num: MatchNumber) -> bool {
        match self.dropped_out_after {
            None => true,
            Some(dropped) => dropped >= num,
        }
    }
}
