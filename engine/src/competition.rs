//! Wires the individual components into one resolved view: schedule built
//! from the plan, league table built by scoring every league artefact,
//! knockout bracket seeded from the league and scored the same way, a
//! tiebreaker injected if the final ties, and awards computed from all of
//! the above.

use crate::awards::{compute_awards, Award};
use crate::documents::ScoreFile;
use crate::errors::{EngineError, EngineResult};
use crate::ids::{MatchNumber, Tla};
use crate::knockout_score::{score_knockout_match, KnockoutMatchScore};
use crate::league_score::{LeagueMatchResult, LeagueScores};
use crate::match_::{Match, MatchPeriod};
use crate::scorer::ScorerFactory;
use crate::team::Team;
use crate::tiebreaker::inject_tiebreaker;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Reads the generic `disqualified`/`present` flags every score artefact
/// carries alongside its scorer-specific fields, independent of which
/// [`crate::scorer::Scorer`] produced the points.
fn extract_flags(teams_data: &serde_json::Value) -> (HashSet<Tla>, HashSet<Tla>) {
    let mut disqualified = HashSet::new();
    let mut absent = HashSet::new();
    if let Some(map) = teams_data.as_object() {
        for (tla, entry) in map {
            let tla = Tla::new(tla.clone());
            if entry.get("disqualified").and_then(|v| v.as_bool()).unwrap_or(false) {
                disqualified.insert(tla.clone());
            }
            if entry.get("present").and_then(|v| v.as_bool()) == Some(false) {
                absent.insert(tla);
            }
        }
    }
    (disqualified, absent)
}

fn score_one(
    factory: &dyn ScorerFactory,
    file: &ScoreFile,
) -> EngineResult<(IndexMap<Tla, crate::ids::GamePoints>, HashSet<Tla>, HashSet<Tla>)> {
    let scorer = factory.create(&file.teams, file.arena_zones.as_ref());
    if let Some(arena_zones) = &file.arena_zones {
        scorer.validate(arena_zones).map_err(|e| EngineError::ScorerValidation {
            num: file.match_number,
            reason: e.to_string(),
        })?;
    }
    let points = scorer.calculate_scores().map_err(|e| EngineError::ScorerValidation {
        num: file.match_number,
        reason: e.to_string(),
    })?;
    let (disqualified, absent) = extract_flags(&file.teams);
    Ok((points, disqualified, absent))
}

/// Builds the league table from every scored league artefact. A single
/// artefact failure (scorer error, or a team set that doesn't match the
/// match's planned roster) aborts the whole build — the engine never
/// publishes a partially valid league table.
pub fn build_league_scores(
    factory: &dyn ScorerFactory,
    roster: &[Tla],
    ranked_points_table: Option<&HashMap<usize, u32>>,
    score_files: &[ScoreFile],
) -> EngineResult<LeagueScores> {
    let mut results = Vec::with_capacity(score_files.len());
    for file in score_files {
        let (game_points, disqualified, absent) = score_one(factory, file)?;
        results.push(LeagueMatchResult {
            num: file.match_number,
            game_points,
            disqualified,
            absent,
        });
    }
    Ok(LeagueScores::build(roster, ranked_points_table, results))
}

/// Scores every knockout artefact against the league's positions, keyed by
/// match number.
pub fn build_knockout_scores(
    factory: &dyn ScorerFactory,
    score_files: &[ScoreFile],
    league_positions: &IndexMap<Tla, usize>,
    use_resolved_ranking: impl Fn(MatchNumber) -> bool,
) -> EngineResult<HashMap<MatchNumber, KnockoutMatchScore>> {
    let mut scores = HashMap::with_capacity(score_files.len());
    for file in score_files {
        let (game_points, disqualified, absent) = score_one(factory, file)?;
        let score = score_knockout_match(
            &game_points,
            &disqualified,
            &absent,
            league_positions,
            use_resolved_ranking(file.match_number),
        );
        scores.insert(file.match_number, score);
    }
    Ok(scores)
}

/// The top two finishers of a scored knockout match, in finishing order —
/// what the automatic scheduler needs to seed the next round.
pub fn winners_of(score: &KnockoutMatchScore) -> Option<[Tla; 2]> {
    let ranking = score.resolved_positions.as_ref().unwrap_or(&score.game_positions);
    let mut by_position: Vec<(&Tla, usize)> = ranking.iter().map(|(tla, &pos)| (tla, pos)).collect();
    by_position.sort_by_key(|(_, pos)| *pos);
    if by_position.len() < 2 {
        return None;
    }
    Some([by_position[0].0.clone(), by_position[1].0.clone()])
}

/// Everything derived once the knockout bracket (and any tiebreaker) has
/// been scored: the final standings used for awards.
pub struct FinalStandings {
    pub awards: IndexMap<Award, Vec<Tla>>,
    pub tiebreaker: Option<MatchPeriod>,
}

/// Resolves the final standings, injecting a tiebreaker period if the
/// final itself ties for first. `overrides` applies on top of the computed
/// awards, by award name.
#[allow(clippy::too_many_arguments)]
pub fn resolve_final_standings(
    final_match: &Match,
    final_score: &KnockoutMatchScore,
    tiebreaker_score: Option<&KnockoutMatchScore>,
    league: &LeagueScores,
    roster: &[Team],
    overrides: &HashMap<String, Vec<Tla>>,
    next_match_number: u32,
    start_time: time::OffsetDateTime,
    match_duration: time::Duration,
) -> FinalStandings {
    let tiebreaker = inject_tiebreaker(
        final_match,
        final_score,
        &league.positions,
        next_match_number,
        start_time,
        match_duration,
        final_match.arena.clone(),
    );

    let (deciding_score, is_tiebreaker, preceding) = match (&tiebreaker, tiebreaker_score) {
        (Some(_), Some(tb_score)) => (tb_score, true, Some(final_score)),
        _ => (final_score, false, None),
    };

    let awards = compute_awards(deciding_score, is_tiebreaker, preceding, roster, league, overrides);
    FinalStandings { awards, tiebreaker }
}
