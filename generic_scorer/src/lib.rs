//! Example [`Scorer`] plug-in: sums per-zone point values from a
//! configuration, with a small per-team bonus for sharing a zone. Stands in
//! for the scoring logic a real competition's own crate would supply.

pub mod config;

pub use config::GenericScorerConfig;

use indexmap::IndexMap;
use serde_json::Value;
use srcomp_engine::ids::{GamePoints, Tla};
use srcomp_engine::scorer::{Scorer, ScorerError, ScorerFactory, ValidatingScorer};

/// Reads `teams_data` shaped as `{TLA: {"zones": [String, ...], ...}}` and
/// scores each team as the sum of its occupied zones' point values, plus
/// `bonus_per_team_in_zone` for every zone shared with at least one other
/// team.
pub struct GenericScorer {
    config: GenericScorerConfig,
    teams_data: Value,
}

impl GenericScorer {
    pub fn new(config: GenericScorerConfig, teams_data: Value) -> Self {
        Self { config, teams_data }
    }

    fn team_zones(&self) -> Result<IndexMap<Tla, Vec<String>>, ScorerError> {
        let map = self
            .teams_data
            .as_object()
            .ok_or_else(|| ScorerError::Invalid("teams data must be an object".into()))?;
        let mut result = IndexMap::new();
        for (tla, entry) in map {
            let zones = entry
                .get("zones")
                .and_then(|v| v.as_array())
                .map(|arr| arr.iter().filter_map(|z| z.as_str().map(str::to_string)).collect())
                .unwrap_or_default();
            result.insert(Tla::new(tla.clone()), zones);
        }
        Ok(result)
    }
}

impl Scorer for GenericScorer {
    fn calculate_scores(&self) -> Result<IndexMap<Tla, GamePoints>, ScorerError> {
        let team_zones = self.team_zones()?;

        let mut occupants: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
        for zones in team_zones.values() {
            for zone in zones {
                *occupants.entry(zone.as_str()).or_insert(0) += 1;
            }
        }

        let mut scores = IndexMap::new();
        for (tla, zones) in &team_zones {
            let mut total: GamePoints = 0;
            for zone in zones {
                total += self.config.zone_points.get(zone).copied().unwrap_or(0);
                if occupants.get(zone.as_str()).copied().unwrap_or(0) > 1 {
                    total += self.config.bonus_per_team_in_zone;
                }
            }
            scores.insert(tla.clone(), total);
        }
        Ok(scores)
    }
}

impl ValidatingScorer for GenericScorer {
    fn validate(&self, _arena_data: &Value) -> Result<(), ScorerError> {
        let team_zones = self.team_zones()?;
        let known_zones: std::collections::HashSet<&String> = self.config.zone_points.keys().collect();
        for (tla, zones) in &team_zones {
            for zone in zones {
                if !known_zones.contains(zone) {
                    return Err(ScorerError::Invalid(format!(
                        "team {tla} occupies unknown zone \"{zone}\""
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Builds a [`GenericScorer`] from a single, shared configuration. A real
/// host would likely parse this once per competition, not per match; the
/// factory only exists to hand the engine a fresh [`Scorer`] instance per
/// artefact, per its concurrency model.
pub struct GenericScorerFactory {
    config: GenericScorerConfig,
}

impl GenericScorerFactory {
    pub fn new(config: GenericScorerConfig) -> Self {
        Self { config }
    }
}

impl ScorerFactory for GenericScorerFactory {
    fn create(&self, teams_data: &Value, _arena_data: Option<&Value>) -> Box<dyn ValidatingScorer> {
        Box::new(GenericScorer::new(self.config.clone(), teams_data.clone()))
    }
}
