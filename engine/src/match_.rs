//! Matches, match slots and match periods.

use crate::ids::{ArenaName, MatchNumber, Tla};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// What a match counts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    League,
    Knockout,
    Tiebreaker,
}

/// A scheduled match in a single arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub num: MatchNumber,
    pub display_name: String,
    pub arena: ArenaName,
    /// One slot per competing team; `None` where a team has dropped out or a
    /// bracket position is not yet known.
    pub teams: Vec<Option<Tla>>,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub kind: MatchType,
    /// Whether ties in this match should be broken using the league rank
    /// (see `knockout_score`). `false` for the final and for tiebreakers.
    pub use_resolved_ranking: bool,
}

impl Match {
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

/// All matches starting at the same instant, one per arena.
pub type MatchSlot = IndexMap<ArenaName, Match>;

/// A delay that takes effect at a fixed point in time and shifts everything
/// scheduled from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delay {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    #[serde(with = "duration_seconds")]
    pub delay: Duration,
}

mod duration_seconds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        value.whole_seconds().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        Ok(Duration::seconds(secs))
    }
}

/// A contiguous block of the day dedicated to one kind of match.
#[derive(Debug, Clone)]
pub struct MatchPeriod {
    pub description: String,
    pub start_time: OffsetDateTime,
    /// Last instant at which a new match may start, absent overrun.
    pub end_time: OffsetDateTime,
    /// Hard ceiling a delayed match may still start before.
    pub max_end_time: OffsetDateTime,
    pub kind: MatchType,
    pub matches: Vec<MatchSlot>,
}

impl MatchPeriod {
    pub fn new(
        description: impl Into<String>,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
        max_end_time: OffsetDateTime,
        kind: MatchType,
    ) -> Self {
        Self {
            description: description.into(),
            start_time,
            end_time,
            max_end_time,
            kind,
            matches: Vec::new(),
        }
    }
}
