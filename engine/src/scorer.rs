//! The scorer plug-in interface: a resolved view is built with a
//! host-supplied [`ScorerFactory`], never a scorer cached across builds (see
//! the engine's concurrency notes — each score artefact gets a fresh
//! instance).

use crate::ids::{GamePoints, Tla};
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ScorerError {
    /// score data was rejected
    #[error("score data was rejected: {0}")]
    Invalid(String),
    /// scorer configuration was rejected
    #[error("scorer configuration was rejected: {0}")]
    InvalidConfig(String),
}

/// Computes game points for every team in a single match from opaque,
/// already-deserialized score data.
pub trait Scorer {
    fn calculate_scores(&self) -> Result<IndexMap<Tla, GamePoints>, ScorerError>;
}

/// A [`Scorer`] that can additionally cross-check its input against side
/// data about the arena or match (e.g. which zones were used). Scorers with
/// nothing to validate can rely on the default, which accepts anything.
pub trait ValidatingScorer: Scorer {
    fn validate(&self, arena_data: &Value) -> Result<(), ScorerError> {
        let _ = arena_data;
        Ok(())
    }
}

/// Builds a fresh [`ValidatingScorer`] for one match's worth of score data.
/// Every scorer is handed back through this trait, not just the ones with a
/// real `validate`, so a resolved-view build can always call it before
/// trusting `calculate_scores`.
pub trait ScorerFactory {
    fn create(&self, teams_data: &Value, arena_data: Option<&Value>) -> Box<dyn ValidatingScorer>;
}
