//! Final standings: first/second/third/rookie, plus any manually awarded
//! extras from an override file.

use crate::ids::Tla;
use crate::knockout_score::KnockoutMatchScore;
use crate::league_score::LeagueScores;
use crate::team::Team;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Award {
    First,
    Second,
    Third,
    Rookie,
    Committee,
    Image,
    Web,
    Movement,
}

/// Computes the automated awards. `preceding_final_score` is the resolved
/// score of the match that became the final before a tiebreaker replaced
/// it, used only to recover third place when the tiebreaker itself had too
/// few teams to carry a third position.
pub fn compute_awards(
    final_score: &KnockoutMatchScore,
    is_tiebreaker: bool,
    preceding_final_score: Option<&KnockoutMatchScore>,
    roster: &[Team],
    league: &LeagueScores,
    overrides: &HashMap<String, Vec<Tla>>,
) -> IndexMap<Award, Vec<Tla>> {
    let ranking = final_score
        .resolved_positions
        .as_ref()
        .unwrap_or(&final_score.game_positions);

    let mut awards = IndexMap::new();
    awards.insert(Award::First, teams_at(ranking, 1));
    awards.insert(Award::Second, teams_at(ranking, 2));

    let third = if is_tiebreaker {
        preceding_final_score
            .map(|score| {
                let preceding_ranking = score.resolved_positions.as_ref().unwrap_or(&score.game_positions);
                teams_at(preceding_ranking, 3)
            })
            .unwrap_or_default()
    } else {
        teams_at(ranking, 3)
    };
    awards.insert(Award::Third, third);

    awards.insert(Award::Rookie, best_rookie(roster, league));

    for (key, replacement) in overrides {
        if let Some(award) = award_from_key(key) {
            awards.insert(award, replacement.clone());
        }
    }

    awards
}

fn teams_at(ranking: &IndexMap<Tla, usize>, position: usize) -> Vec<Tla> {
    ranking
        .iter()
        .filter(|(_, &pos)| pos == position)
        .map(|(tla, _)| tla.clone())
        .collect()
}

fn best_rookie(roster: &[Team], league: &LeagueScores) -> Vec<Tla> {
    let rookie_positions: Vec<(Tla, usize)> = roster
        .iter()
        .filter(|t| t.rookie)
        .filter_map(|t| league.positions.get(&t.tla).map(|&pos| (t.tla.clone(), pos)))
        .collect();
    let Some(&best) = rookie_positions.iter().map(|(_, pos)| pos).min() else {
        return Vec::new();
    };
    rookie_positions
        .into_iter()
        .filter(|(_, pos)| *pos == best)
        .map(|(tla, _)| tla)
        .collect()
}

fn award_from_key(key: &str) -> Option<Award> {
    match key {
        "first" => Some(Award::First),
        "second" => Some(Award::Second),
        "third" => Some(Award::Third),
        "rookie" => Some(Award::Rookie),
        "committee" => Some(Award::Committee),
        "image" => Some(Award::Image),
        "web" => Some(Award::Web),
        "movement" => Some(Award::Movement),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::TeamScore;
    use num_rational::Rational64;

    fn league_with_rookie() -> (Vec<Team>, LeagueScores) {
        let mut roster = vec![Team::new("AAA", "Alpha"), Team::new("BBB", "Bravo")];
        roster[1].rookie = true;
        let mut teams = IndexMap::new();
        let mut positions = IndexMap::new();
        teams.insert(Tla::new("AAA"), TeamScore::new(Rational64::from_integer(10), 0));
        teams.insert(Tla::new("BBB"), TeamScore::new(Rational64::from_integer(5), 0));
        positions.insert(Tla::new("AAA"), 1);
        positions.insert(Tla::new("BBB"), 2);
        (
            roster,
            LeagueScores {
                teams,
                positions,
                last_scored_match: None,
            },
        )
    }

    #[test]
    fn first_second_third_come_from_resolved_positions() {
        let (roster, league) = league_with_rookie();
        let score = KnockoutMatchScore {
            game_positions: IndexMap::new(),
            resolved_positions: Some(
                [
                    (Tla::new("AAA"), 1),
                    (Tla::new("BBB"), 2),
                    (Tla::new("CCC"), 3),
                    (Tla::new("DDD"), 4),
                ]
                .into_iter()
                .collect(),
            ),
        };
        let awards = compute_awards(&score, false, None, &roster, &league, &HashMap::new());
        assert_eq!(awards[&Award::First], vec![Tla::new("AAA")]);
        assert_eq!(awards[&Award::Third], vec![Tla::new("CCC")]);
    }

    #[test]
    fn rookie_award_picks_best_ranked_rookie_team() {
        let (roster, league) = league_with_rookie();
        let score = KnockoutMatchScore {
            game_positions: IndexMap::new(),
            resolved_positions: Some(IndexMap::new()),
        };
        let awards = compute_awards(&score, false, None, &roster, &league, &HashMap::new());
        assert_eq!(awards[&Award::Rookie], vec![Tla::new("BBB")]);
    }

    #[test]
    fn override_file_replaces_computed_award() {
        let (roster, league) = league_with_rookie();
        let score = KnockoutMatchScore {
            game_positions: IndexMap::new(),
            resolved_positions: Some([(Tla::new("AAA"), 1)].into_iter().collect()),
        };
        let mut overrides = HashMap::new();
        overrides.insert("committee".to_string(), vec![Tla::new("BBB")]);
        let awards = compute_awards(&score, false, None, &roster, &league, &overrides);
        assert_eq!(awards[&Award::Committee], vec![Tla::new("BBB")]);
    }

    #[test]
    fn tiebreaker_third_place_falls_back_to_preceding_final() {
        let (roster, league) = league_with_rookie();
        let tiebreaker_score = KnockoutMatchScore {
            game_positions: [(Tla::new("AAA"), 1), (Tla::new("BBB"), 2)].into_iter().collect(),
            resolved_positions: None,
        };
        let preceding = KnockoutMatchScore {
            game_positions: IndexMap::new(),
            resolved_positions: Some(
                [(Tla::new("CCC"), 3), (Tla::new("DDD"), 4)].into_iter().collect(),
            ),
        };
        let awards = compute_awards(
            &tiebreaker_score,
            true,
            Some(&preceding),
            &roster,
            &league,
            &HashMap::new(),
        );
        assert_eq!(awards[&Award::Third], vec![Tla::new("CCC")]);
    }
}
