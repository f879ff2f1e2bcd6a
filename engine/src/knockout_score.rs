//! Per-knockout-match ranking: game points broken by league rank.

use crate::ids::{GamePoints, Tla};
use crate::ranking::rank_game_points;
use indexmap::IndexMap;
use std::collections::HashSet;

/// The outcome of scoring a single knockout match.
#[derive(Debug, Clone)]
pub struct KnockoutMatchScore {
    /// Positions from game points alone; ties share a position.
    pub game_positions: IndexMap<Tla, usize>,
    /// Strict positions once ties are broken by league rank. `None` when
    /// the match's `use_resolved_ranking` is `false` (the final, and any
    /// tiebreaker).
    pub resolved_positions: Option<IndexMap<Tla, usize>>,
}

/// `league_positions` must contain every team named in `game_points`.
pub fn score_knockout_match(
    game_points: &IndexMap<Tla, GamePoints>,
    disqualified: &HashSet<Tla>,
    absent: &HashSet<Tla>,
    league_positions: &IndexMap<Tla, usize>,
    use_resolved_ranking: bool,
) -> KnockoutMatchScore {
    let game_positions = rank_game_points(game_points, disqualified, absent);

    let resolved_positions = if use_resolved_ranking {
        Some(resolve_ties(&game_positions, league_positions))
    } else {
        None
    };

    KnockoutMatchScore {
        game_positions,
        resolved_positions,
    }
}

fn resolve_ties(
    game_positions: &IndexMap<Tla, usize>,
    league_positions: &IndexMap<Tla, usize>,
) -> IndexMap<Tla, usize> {
    let unknowable = league_positions.len() + 1;
    let mut teams: Vec<Tla> = game_positions.keys().cloned().collect();
    teams.sort_by(|a, b| {
        let gp_a = game_positions[a];
        let gp_b = game_positions[b];
        gp_a.cmp(&gp_b).then_with(|| {
            let lp_a = league_positions.get(a).copied().unwrap_or(unknowable);
            let lp_b = league_positions.get(b).copied().unwrap_or(unknowable);
            lp_a.cmp(&lp_b)
        })
    });
    teams
        .into_iter()
        .enumerate()
        .map(|(i, tla)| (tla, i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gp(pairs: &[(&str, i64)]) -> IndexMap<Tla, GamePoints> {
        pairs.iter().map(|(t, p)| (Tla::new(*t), *p)).collect()
    }

    #[test]
    fn ties_broken_by_better_league_rank() {
        let points = gp(&[("AAA", 10), ("BBB", 10), ("CCC", 5), ("DDD", 0)]);
        let league_positions: IndexMap<Tla, usize> = [
            (Tla::new("AAA"), 3),
            (Tla::new("BBB"), 1),
            (Tla::new("CCC"), 2),
            (Tla::new("DDD"), 4),
        ]
        .into_iter()
        .collect();
        let result = score_knockout_match(&points, &HashSet::new(), &HashSet::new(), &league_positions, true);
        let resolved = result.resolved_positions.unwrap();
        // AAA/BBB tied on game points; BBB has the better league rank.
        assert_eq!(resolved[&Tla::new("BBB")], 1);
        assert_eq!(resolved[&Tla::new("AAA")], 2);
        assert_eq!(resolved[&Tla::new("CCC")], 3);
        assert_eq!(resolved[&Tla::new("DDD")], 4);
    }

    #[test]
    fn final_match_skips_resolution() {
        let points = gp(&[("AAA", 10), ("BBB", 10)]);
        let league_positions: IndexMap<Tla, usize> =
            [(Tla::new("AAA"), 1), (Tla::new("BBB"), 2)].into_iter().collect();
        let result = score_knockout_match(&points, &HashSet::new(), &HashSet::new(), &league_positions, false);
        assert!(result.resolved_positions.is_none());
        assert_eq!(result.game_positions[&Tla::new("AAA")], 1);
        assert_eq!(result.game_positions[&Tla::new("BBB")], 1);
    }
}
