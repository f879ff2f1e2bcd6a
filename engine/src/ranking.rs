//! Turns raw game points into ranked positions and, from those, league
//! points — the shared machinery behind both league scoring and per-match
//! knockout scoring.

use crate::ids::{GamePoints, Tla};
use indexmap::IndexMap;
use num_rational::Rational64;
use std::collections::{HashMap, HashSet};

/// Groups teams by descending game points, with disqualified or absent
/// teams always placed last (tied with each other, regardless of their
/// nominal game points) and scored zero.
///
/// Returns the resulting `Tla -> position` map, 1-based, with ties sharing
/// a position and the next distinct position skipping ahead by the tied
/// group's size (`1, 1, 3, ...`).
pub fn rank_game_points(
    scores: &IndexMap<Tla, GamePoints>,
    disqualified: &HashSet<Tla>,
    absent: &HashSet<Tla>,
) -> IndexMap<Tla, usize> {
    let num_teams = scores.len();
    let mut ranked: Vec<(Tla, GamePoints)> = scores
        .iter()
        .filter(|(tla, _)| !disqualified.contains(*tla) && !absent.contains(*tla))
        .map(|(tla, points)| (tla.clone(), *points))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut positions = IndexMap::new();
    let mut rank = 1usize;
    let mut i = 0;
    while i < ranked.len() {
        let mut j = i + 1;
        while j < ranked.len() && ranked[j].1 == ranked[i].1 {
            j += 1;
        }
        for (tla, _) in &ranked[i..j] {
            positions.insert(tla.clone(), rank);
        }
        rank += j - i;
        i = j;
    }

    for tla in scores.keys() {
        if disqualified.contains(tla) || absent.contains(tla) {
            positions.insert(tla.clone(), num_teams);
        }
    }
    positions
}

/// The default `position -> points` table used when none is configured:
/// `num_teams_per_arena - position + 1` for every position in the arena,
/// e.g. a 4-team arena awards `{1: 4, 2: 3, 3: 2, 4: 1}`.
pub fn default_ranked_points_table(num_teams_per_arena: usize) -> HashMap<usize, u32> {
    (1..=num_teams_per_arena)
        .map(|position| (position, (num_teams_per_arena - position + 1) as u32))
        .collect()
}

/// Converts positions into league points using a `position -> points`
/// table, splitting the points of a tied-position block evenly across its
/// occupants. Disqualified/absent teams (identified as sharing the very
/// last position) always score zero, independent of the table.
pub fn ranked_points(
    positions: &IndexMap<Tla, usize>,
    table: &HashMap<usize, u32>,
    disqualified: &HashSet<Tla>,
    absent: &HashSet<Tla>,
) -> IndexMap<Tla, Rational64> {
    let mut group_sizes: HashMap<usize, usize> = HashMap::new();
    for &pos in positions.values() {
        *group_sizes.entry(pos).or_insert(0) += 1;
    }

    let mut result = IndexMap::new();
    for (tla, &pos) in positions.iter() {
        if disqualified.contains(tla) || absent.contains(tla) {
            result.insert(tla.clone(), Rational64::from_integer(0));
            continue;
        }
        let size = group_sizes[&pos];
        let sum: u32 = (pos..pos + size).map(|r| table.get(&r).copied().unwrap_or(0)).sum();
        result.insert(tla.clone(), Rational64::new(sum as i64, size as i64));
    }
    result
}
