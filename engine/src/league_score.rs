//! Aggregates per-match game points into league standings.

use crate::ids::{GamePoints, MatchNumber, Tla};
use crate::ranking::{default_ranked_points_table, rank_game_points, ranked_points};
use crate::score::TeamScore;
use indexmap::IndexMap;
use num_rational::Rational64;
use std::collections::{HashMap, HashSet};

/// One scored league match, already reduced to game points by a [`Scorer`](crate::scorer::Scorer).
pub struct LeagueMatchResult {
    pub num: MatchNumber,
    pub game_points: IndexMap<Tla, GamePoints>,
    pub disqualified: HashSet<Tla>,
    pub absent: HashSet<Tla>,
}

/// The resolved league table.
#[derive(Debug, Clone)]
pub struct LeagueScores {
    pub teams: IndexMap<Tla, TeamScore>,
    /// Stable insertion order by descending score; consumed as-is by
    /// knockout seeding.
    pub positions: IndexMap<Tla, usize>,
    pub last_scored_match: Option<MatchNumber>,
}

impl LeagueScores {
    /// `results` need not be pre-sorted; they are processed in ascending
    /// match-number order so `last_scored_match` is well defined.
    /// `ranked_points_table` of `None` falls back to
    /// [`default_ranked_points_table`], sized to each match's own entrant
    /// count.
    pub fn build(
        roster: &[Tla],
        ranked_points_table: Option<&HashMap<usize, u32>>,
        mut results: Vec<LeagueMatchResult>,
    ) -> Self {
        results.sort_by_key(|r| r.num);

        let mut league_points: HashMap<Tla, Rational64> =
            roster.iter().map(|t| (t.clone(), Rational64::from_integer(0))).collect();
        let mut game_points: HashMap<Tla, GamePoints> =
            roster.iter().map(|t| (t.clone(), 0)).collect();
        let mut last_scored_match = None;

        for result in &results {
            let positions = rank_game_points(&result.game_points, &result.disqualified, &result.absent);
            let default_table;
            let table = match ranked_points_table {
                Some(table) => table,
                None => {
                    default_table = default_ranked_points_table(positions.len());
                    &default_table
                }
            };
            let points = ranked_points(&positions, table, &result.disqualified, &result.absent);
            for (tla, raw) in &result.game_points {
                *game_points.entry(tla.clone()).or_insert(0) += raw;
            }
            for (tla, league_pts) in &points {
                *league_points.entry(tla.clone()).or_insert(Rational64::from_integer(0)) += league_pts;
            }
            last_scored_match = Some(result.num);
        }

        let mut teams: IndexMap<Tla, TeamScore> = roster
            .iter()
            .map(|tla| {
                let score = TeamScore::new(
                    league_points.get(tla).copied().unwrap_or(Rational64::from_integer(0)),
                    game_points.get(tla).copied().unwrap_or(0),
                );
                (tla.clone(), score)
            })
            .collect();

        // stable order by descending score; ties keep roster order.
        let mut ordered: Vec<Tla> = teams.keys().cloned().collect();
        ordered.sort_by(|a, b| teams[b].cmp(&teams[a]));
        teams = ordered.iter().map(|tla| (tla.clone(), teams[tla])).collect();

        let mut positions = IndexMap::new();
        let mut rank = 1usize;
        let mut i = 0;
        while i < ordered.len() {
            let mut j = i + 1;
            while j < ordered.len() && teams[&ordered[j]] == teams[&ordered[i]] {
                j += 1;
            }
            for tla in &ordered[i..j] {
                positions.insert(tla.clone(), rank);
            }
            rank += j - i;
            i = j;
        }

        Self {
            teams,
            positions,
            last_scored_match,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gp(pairs: &[(&str, i64)]) -> IndexMap<Tla, GamePoints> {
        pairs.iter().map(|(t, p)| (Tla::new(*t), *p)).collect()
    }

    #[test]
    fn aggregates_across_two_matches() {
        let roster = vec![Tla::new("AAA"), Tla::new("BBB"), Tla::new("CCC"), Tla::new("DDD")];
        let table: HashMap<usize, u32> = [(1, 8), (2, 6), (3, 4), (4, 2)].into_iter().collect();
        let results = vec![
            LeagueMatchResult {
                num: MatchNumber(0),
                game_points: gp(&[("AAA", 10), ("BBB", 8), ("CCC", 5), ("DDD", 1)]),
                disqualified: HashSet::new(),
                absent: HashSet::new(),
            },
            LeagueMatchResult {
                num: MatchNumber(1),
                game_points: gp(&[("AAA", 2), ("BBB", 9), ("CCC", 9), ("DDD", 0)]),
                disqualified: HashSet::new(),
                absent: HashSet::new(),
            },
        ];
        let scores = LeagueScores::build(&roster, Some(&table), results);
        // AAA: match0 pos1(8) + match1 pos3(4) = 12 league pts, 12 game pts
        assert_eq!(scores.teams[&Tla::new("AAA")].league_points, Rational64::new(12, 1));
        assert_eq!(scores.last_scored_match, Some(MatchNumber(1)));
        assert_eq!(scores.positions[&Tla::new("BBB")], scores.positions[&Tla::new("CCC")]);
    }

    #[test]
    fn league_positions_ordered_stably() {
        let roster = vec![Tla::new("AAA"), Tla::new("BBB")];
        let table: HashMap<usize, u32> = [(1, 8), (2, 4)].into_iter().collect();
        let scores = LeagueScores::build(&roster, Some(&table), vec![]);
        // no matches scored: both teams tied at 0, roster order kept.
        assert_eq!(scores.positions[&Tla::new("AAA")], 1);
        assert_eq!(scores.positions[&Tla::new("BBB")], 1);
    }

    #[test]
    fn missing_table_falls_back_to_default_per_match_size() {
        let roster = vec![Tla::new("AAA"), Tla::new("BBB"), Tla::new("CCC")];
        let results = vec![LeagueMatchResult {
            num: MatchNumber(0),
            game_points: gp(&[("AAA", 10), ("BBB", 5), ("CCC", 1)]),
            disqualified: HashSet::new(),
            absent: HashSet::new(),
        }];
        let scores = LeagueScores::build(&roster, None, results);
        // default table for 3 teams: {1: 3, 2: 2, 3: 1}.
        assert_eq!(scores.teams[&Tla::new("AAA")].league_points, Rational64::from_integer(3));
        assert_eq!(scores.teams[&Tla::new("BBB")].league_points, Rational64::from_integer(2));
        assert_eq!(scores.teams[&Tla::new("CCC")].league_points, Rational64::from_integer(1));
    }
}
