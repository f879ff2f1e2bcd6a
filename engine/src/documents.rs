//! Shapes of the external, declarative documents the engine is built from.
//!
//! These are plain `serde` types; parsing a concrete file format (YAML, in
//! the reference host) is a thin wrapper kept behind the `yaml` feature.
//! The engine itself only ever consumes already-deserialized values.

use crate::errors::EngineError;
use crate::ids::{ArenaName, MatchNumber, Tla};
use crate::match_::Delay;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration as StdDuration;

/// `match_slot_lengths` from the schedule plan: how a single match slot's
/// duration is split between pre-match staging, the match itself, and
/// post-match handling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchSlotLengths {
    pub pre: u64,
    #[serde(rename = "match")]
    pub match_duration: u64,
    pub post: u64,
}

impl MatchSlotLengths {
    pub fn total(&self) -> u64 {
        self.pre + self.match_duration + self.post
    }

    pub fn total_duration(&self) -> StdDuration {
        StdDuration::from_secs(self.total())
    }
}

/// `staging` from the schedule plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingTimes {
    pub closes: u64,
    pub opens: u64,
    pub duration: u64,
    #[serde(default)]
    pub signal_shepherds: HashMap<String, u64>,
    #[serde(default)]
    pub signal_teams: u64,
}

/// One declared block of time dedicated to a stage of the competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPeriodPlan {
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: time::OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub max_end_time: Option<time::OffsetDateTime>,
    #[serde(default)]
    pub matches: Vec<MatchNumber>,
}

/// `league` block of the schedule plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaguePlan {
    #[serde(default)]
    pub extra_spacing: Vec<ExtraSpacingEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraSpacingEntry {
    pub matches: String,
    pub duration: u64,
}

/// The whole schedule plan document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub match_slot_lengths: MatchSlotLengths,
    pub staging: StagingTimes,
    #[serde(default)]
    pub delays: Vec<Delay>,
    pub match_periods: MatchPeriodsPlan,
    #[serde(default)]
    pub league: LeaguePlan,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchPeriodsPlan {
    #[serde(default)]
    pub league: Vec<MatchPeriodPlan>,
    #[serde(default)]
    pub knockout: Vec<MatchPeriodPlan>,
}

/// `teams.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsDocument {
    pub teams: HashMap<Tla, TeamEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEntry {
    pub name: String,
    #[serde(default)]
    pub rookie: bool,
    #[serde(default)]
    pub dropped_out_after: Option<MatchNumber>,
}

/// `league.yaml`: declares which teams play which arenas at which match
/// number, plus the points-per-position table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueDocument {
    pub matches: HashMap<MatchNumber, HashMap<ArenaName, Vec<Option<Tla>>>>,
    /// Falls back to [`crate::ranking::default_ranked_points_table`] when absent.
    #[serde(default)]
    pub ranked_points: Option<HashMap<usize, u32>>,
}

/// A single match's score file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreFile {
    pub arena_id: ArenaName,
    pub match_number: MatchNumber,
    pub teams: serde_json::Value,
    #[serde(default)]
    pub arena_zones: Option<serde_json::Value>,
}

/// `awards.yaml` overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwardsOverride {
    #[serde(flatten)]
    pub awards: HashMap<String, Vec<Tla>>,
}

/// `knockout.yaml`, automatic variant, as it appears on disk: durations in
/// raw seconds. [`crate::knockout::automatic::AutomaticKnockoutConfig`] is
/// the `time::Duration`-based shape the scheduler actually consumes; convert
/// with [`AutomaticKnockoutPlan::into_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomaticKnockoutPlan {
    #[serde(default)]
    pub round_spacing: u64,
    #[serde(default)]
    pub final_delay: u64,
    #[serde(default)]
    pub single_arena: Option<SingleArenaPlan>,
    #[serde(default)]
    pub arity: Option<usize>,
}

/// Restricts the last `rounds` rounds (the final counts as round 0) to
/// `arenas`, as it appears in `knockout.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleArenaPlan {
    pub rounds: u32,
    pub arenas: Vec<ArenaName>,
}

impl AutomaticKnockoutPlan {
    pub fn into_config(self) -> crate::knockout::automatic::AutomaticKnockoutConfig {
        crate::knockout::automatic::AutomaticKnockoutConfig {
            round_spacing: time::Duration::seconds(self.round_spacing as i64),
            final_delay: time::Duration::seconds(self.final_delay as i64),
            single_arena: self.single_arena.map(|plan| crate::knockout::automatic::SingleArenaConfig {
                rounds: plan.rounds,
                arenas: plan.arenas,
            }),
            arity: self.arity,
        }
    }
}

/// One team slot in a static bracket: either a concrete seed reference, a
/// reference to an earlier match's finishing position, or unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StaticTeamRef {
    Seed(String),
    MatchPosition(String),
    #[serde(with = "null_only")]
    Unknown,
}

mod null_only {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_none()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<(), D::Error> {
        struct NoneVisitor;
        impl<'de> serde::de::Visitor<'de> for NoneVisitor {
            type Value = ();
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("null")
            }
            fn visit_none<E>(self) -> Result<(), E> {
                Ok(())
            }
            fn visit_unit<E>(self) -> Result<(), E> {
                Ok(())
            }
        }
        deserializer.deserialize_option(NoneVisitor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticKnockoutRound {
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: time::OffsetDateTime,
    pub matches: Vec<StaticKnockoutMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticKnockoutMatch {
    pub arena: ArenaName,
    pub teams: Vec<StaticTeamRef>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticKnockoutConfig {
    pub rounds: Vec<StaticKnockoutRound>,
    pub teams_per_arena: usize,
}

/// `layout.yaml`: the regions teams are grouped into for shepherding and
/// venue-facing display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub teams: Vec<RegionEntry>,
}

/// One named region of the venue layout and the teams assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionEntry {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub teams: Vec<Tla>,
}

/// `shepherding.yaml`: which layout regions each shepherding area covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShepherdingDocument {
    pub shepherds: Vec<ShepherdEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShepherdEntry {
    pub name: String,
    #[serde(default)]
    pub colour: String,
    pub regions: Vec<String>,
}

/// `operations.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationsDocument {
    #[serde(default = "default_reset_duration")]
    pub reset_duration: u64,
    #[serde(default = "default_release_threshold")]
    pub release_threshold: u64,
    #[serde(default)]
    pub released_match: Option<ReleasedMatchEntry>,
}

fn default_reset_duration() -> u64 {
    180
}

fn default_release_threshold() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasedMatchEntry {
    pub number: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub time: time::OffsetDateTime,
}

/// Parses a match-number range expression like `"1-4,6,0"` into the set of
/// match numbers it names. Whitespace around commas and dashes is ignored.
/// Empty input, a dangling dash (`"1-"`, `"-4"`), a double dash (`"1--4"`),
/// or any non-digit token is an error.
pub fn parse_match_number_range(expr: &str) -> Result<HashSet<MatchNumber>, EngineError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(EngineError::RangeExpression(expr.to_string()));
    }
    let mut result = HashSet::new();
    for token in trimmed.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(EngineError::RangeExpression(expr.to_string()));
        }
        let parts: Vec<&str> = token.split('-').map(str::trim).collect();
        match parts.as_slice() {
            [single] => {
                let n = parse_u32(single, expr)?;
                result.insert(MatchNumber(n));
            }
            [start, end] => {
                let start = parse_u32(start, expr)?;
                let end = parse_u32(end, expr)?;
                if start > end {
                    return Err(EngineError::RangeExpression(expr.to_string()));
                }
                for n in start..=end {
                    result.insert(MatchNumber(n));
                }
            }
            _ => return Err(EngineError::RangeExpression(expr.to_string())),
        }
    }
    Ok(result)
}

fn parse_u32(token: &str, original: &str) -> Result<u32, EngineError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::RangeExpression(original.to_string()));
    }
    token
        .parse::<u32>()
        .map_err(|_| EngineError::RangeExpression(original.to_string()))
}

#[cfg(feature = "yaml")]
pub fn from_yaml_str<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, EngineError> {
    serde_yaml::from_str(text).map_err(|e| EngineError::PlanParse(e.to_string()))
}
