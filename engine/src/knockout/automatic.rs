//! The automatic, seeded single-elimination knockout scheduler.
//!
//! Only arenas hosting exactly four teams per match are supported — the
//! bracket math (seeding, pairing, winner propagation) all assumes arity is
//! a power of two multiplied by four.

use super::seeding::first_round_seeding;
use super::{knockout_display_name, unknowable_tla};
use crate::clock::{MatchPeriodClock, PeriodBounds};
use crate::errors::{EngineError, EngineResult};
use crate::ids::{ArenaName, MatchNumber, Tla};
use crate::league_score::LeagueScores;
use crate::match_::{Match, MatchPeriod, MatchSlot, MatchType};
use crate::prng::StableRandom;
use crate::team::Team;
use indexmap::IndexMap;
use std::collections::HashMap;
use time::Duration;

pub const NUM_TEAMS_PER_ARENA: usize = 4;

/// Restricts the last `rounds` rounds before (and including) the final to
/// `arenas`, freeing the rest of the venue once the field has narrowed.
#[derive(Debug, Clone)]
pub struct SingleArenaConfig {
    pub rounds: u32,
    pub arenas: Vec<ArenaName>,
}

#[derive(Debug, Clone)]
pub struct AutomaticKnockoutConfig {
    pub round_spacing: Duration,
    pub final_delay: Duration,
    pub single_arena: Option<SingleArenaConfig>,
    /// Number of teams feeding the bracket; must be a positive multiple of
    /// four. Defaults to the largest such number not exceeding the league
    /// size.
    pub arity: Option<usize>,
}

impl Default for AutomaticKnockoutConfig {
    fn default() -> Self {
        Self {
            round_spacing: Duration::ZERO,
            final_delay: Duration::ZERO,
            single_arena: None,
            arity: None,
        }
    }
}

/// Derives the ordered seed list feeding the bracket. When the league has
/// not finished, nothing is knowable yet and every seed is `UNKNOWABLE_TEAM`
/// — the bracket still gets laid out so match numbers and timings are
/// stable, but every team slot stays blank until later. Otherwise, teams no
/// longer `is_still_around` the first knockout match are dropped before
/// seeding.
pub fn get_seeds(
    league: &LeagueScores,
    played_all_league_matches: bool,
    roster: &HashMap<Tla, Team>,
    first_knockout_match_num: MatchNumber,
) -> Vec<Tla> {
    if !played_all_league_matches {
        return vec![unknowable_tla(); league.positions.len()];
    }
    league
        .positions
        .keys()
        .filter(|tla| {
            roster
                .get(*tla)
                .map(|team| team.is_still_around(first_knockout_match_num))
                .unwrap_or(true)
        })
        .cloned()
        .collect()
}

fn resolve_arity(seed_count: usize, configured: Option<usize>) -> EngineResult<usize> {
    let arity = configured.unwrap_or_else(|| seed_count - seed_count % NUM_TEAMS_PER_ARENA);
    if arity == 0 || arity % NUM_TEAMS_PER_ARENA != 0 || arity > seed_count {
        return Err(EngineError::InvalidSeed(arity));
    }
    Ok(arity)
}

fn rounds_remaining(round_match_count: usize) -> u32 {
    (round_match_count as f64).log2().floor() as u32
}

/// Picks which arenas host the round with `rounds_left` rounds remaining:
/// the configured `single_arena` set once the field has narrowed to within
/// its `rounds`, otherwise every arena.
fn arenas_for_round<'a>(rounds_left: u32, all_arenas: &'a [ArenaName], config: &'a AutomaticKnockoutConfig) -> &'a [ArenaName] {
    match &config.single_arena {
        Some(single) if rounds_left <= single.rounds => &single.arenas,
        _ => all_arenas,
    }
}

/// Schedules every knockout round derivable right now: rounds whose
/// entrants are all known get real team slots, later rounds get blank
/// (`None`) slots that a subsequent rebuild fills in once earlier matches
/// are scored.
///
/// `winners_by_match` carries the top two finishers (in order) of any
/// knockout match already scored, keyed by its assigned [`MatchNumber`].
/// Empty on a first build, when no knockout match has been played yet.
#[allow(clippy::too_many_arguments)]
pub fn schedule_automatic_knockout(
    league: &LeagueScores,
    played_all_league_matches: bool,
    roster: &HashMap<Tla, Team>,
    arenas: &[ArenaName],
    match_duration: Duration,
    start_match_number: u32,
    period: &mut MatchPeriod,
    config: &AutomaticKnockoutConfig,
    winners_by_match: &HashMap<MatchNumber, [Tla; 2]>,
) -> EngineResult<()> {
    let seeds = get_seeds(league, played_all_league_matches, roster, MatchNumber(start_match_number));
    let arity = resolve_arity(seeds.len(), config.arity)?;
    let chosen_seeds = &seeds[..arity];

    let seed_key: Vec<u8> = chosen_seeds.iter().flat_map(|t| t.as_str().bytes()).collect();
    let mut rng = StableRandom::from_seed(&seed_key);

    let bounds = PeriodBounds::from(&*period);
    let mut clock = MatchPeriodClock::new(bounds, &[]);
    let mut next_number = start_match_number;

    // first round team lists, by seed index.
    let mut round_teams: Vec<Vec<Option<Tla>>> = first_round_seeding(arity)
        .into_iter()
        .map(|group| group.iter().map(|&idx| Some(chosen_seeds[idx].clone())).collect())
        .collect();

    let mut first_round = true;

    loop {
        let round_len = round_teams.len();
        let rounds_left = rounds_remaining(round_len);
        let is_final_round = round_len == 1;
        let round_arenas = arenas_for_round(rounds_left, arenas, config);
        let num_arenas = round_arenas.len().max(1);

        if !first_round {
            clock.advance(config.round_spacing);
            if is_final_round {
                clock.advance(config.final_delay);
            }
        }
        first_round = false;

        for team_list in round_teams.iter_mut() {
            rng.shuffle(team_list);
        }

        let mut round_match_numbers = Vec::with_capacity(round_len);
        let mut emitted = 0usize;
        while emitted < round_len {
            let time = clock.current_time().map_err(|e| {
                log::warn!(
                    "knockout period ran out of time scheduling round of {} matches ({} already emitted)",
                    round_len,
                    emitted
                );
                e
            })?;
            let batch_end = (emitted + num_arenas).min(round_len);
            let mut slot: MatchSlot = IndexMap::new();
            for (arena, team_list) in round_arenas.iter().zip(round_teams[emitted..batch_end].iter()) {
                let num = MatchNumber(next_number);
                next_number += 1;
                let display_name = knockout_display_name(rounds_left, round_match_numbers.len(), num);
                round_match_numbers.push(num);
                let m = Match {
                    num,
                    display_name,
                    arena: arena.clone(),
                    teams: team_list.clone(),
                    start_time: time,
                    end_time: time + match_duration,
                    kind: MatchType::Knockout,
                    use_resolved_ranking: !is_final_round,
                };
                slot.insert(arena.clone(), m);
            }
            period.matches.push(slot);
            emitted = batch_end;
            clock.advance(match_duration);
        }

        if is_final_round {
            break;
        }

        // build next round's team lists by pairing consecutive matches.
        let mut next_round = Vec::with_capacity(round_len / 2);
        for pair in round_match_numbers.chunks(2) {
            let (a, b) = (pair[0], pair[1]);
            let teams = match (winners_by_match.get(&a), winners_by_match.get(&b)) {
                (Some(wa), Some(wb)) => vec![
                    Some(wa[0].clone()),
                    Some(wa[1].clone()),
                    Some(wb[0].clone()),
                    Some(wb[1].clone()),
                ],
                _ => vec![None, None, None, None],
            };
            next_round.push(teams);
        }
        round_teams = next_round;
    }

    Ok(())
}
