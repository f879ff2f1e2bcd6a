//! Error types shared across the engine.

use crate::ids::{MatchNumber, Tla};
use crate::validation::ValidationErrors;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Top-level error composing every failure domain of the engine.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// schedule plan could not be parsed
    #[error("schedule plan could not be parsed: {0}")]
    PlanParse(String),

    /// region validation error
    #[error("region validation error: {0}")]
    InvalidRegion(#[from] ValidationErrors),

    /// the layout's regions don't exactly partition the team roster
    #[error("layout/roster mismatch: missing {missing:?}, extra {extras:?}, duplicated {duplicates:?}")]
    LayoutTeams {
        missing: Vec<Tla>,
        extras: Vec<Tla>,
        duplicates: Vec<Tla>,
    },

    /// shepherding areas do not match the venue layout's regions
    #[error("shepherding/layout region mismatch: missing {missing:?}, extra {extras:?}")]
    ShepherdingAreas { missing: Vec<String>, extras: Vec<String> },

    /// match references an unresolvable team slot
    #[error("match {num} references an unresolvable team slot: {reference}")]
    InvalidReference { num: MatchNumber, reference: String },

    /// knockout seed is out of range for the number of entrants
    #[error("knockout seed {0} is out of range for the number of entrants")]
    InvalidSeed(usize),

    /// a match's team count doesn't match its arena's configured count
    #[error("match {num} in arena {arena} expects {expected} teams, got {actual}")]
    WrongNumberOfTeams {
        num: MatchNumber,
        arena: String,
        expected: usize,
        actual: usize,
    },

    /// reset_duration is shorter than release_threshold
    #[error("reset_duration ({reset_duration_secs}s) must be at least release_threshold ({release_threshold_secs}s)")]
    InvalidResetDuration {
        reset_duration_secs: i64,
        release_threshold_secs: i64,
    },

    /// released_match.number doesn't name a real match in this schedule
    #[error("released_match.number ({0}) is not a valid match number in this schedule")]
    InvalidReleasedMatchNumber(u32),

    /// the match period ran out of time before reaching the requested slot
    #[error("the match period ran out of time before reaching the requested slot")]
    OutOfTime,

    /// scorer rejected the score data for a match
    #[error("scorer rejected the score data for match {num}: {reason}")]
    ScorerValidation { num: MatchNumber, reason: String },

    /// failed to parse a match-number range expression
    #[error("failed to parse a match-number range expression: {0}")]
    RangeExpression(String),
}
