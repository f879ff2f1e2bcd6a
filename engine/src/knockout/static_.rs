//! The static, declaratively-described knockout bracket: every round, match
//! and team slot is named up front in a document rather than computed from
//! seeding, making it suitable for non-power-of-two or irregular brackets.

use super::knockout_display_name;
use crate::documents::{StaticKnockoutConfig, StaticTeamRef};
use crate::errors::{EngineError, EngineResult};
use crate::ids::{ArenaName, MatchNumber, Tla};
use crate::match_::{Match, MatchPeriod, MatchSlot, MatchType};
use indexmap::IndexMap;
use std::collections::HashMap;
use time::Duration;

/// A team reference resolved to a concrete slot value at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolvedRef {
    Seed(usize),
    EarlierMatch {
        round_index: usize,
        match_in_round: usize,
        position: usize,
    },
    Unknown,
}

fn parse_team_ref(raw: &StaticTeamRef, num_seeds: usize, rounds_so_far: usize) -> EngineResult<ResolvedRef> {
    match raw {
        StaticTeamRef::Unknown => Ok(ResolvedRef::Unknown),
        StaticTeamRef::Seed(s) => {
            let digits = s.strip_prefix('S').ok_or_else(|| invalid(s))?;
            let n: usize = digits.parse().map_err(|_| invalid(s))?;
            if n == 0 || n > num_seeds {
                return Err(EngineError::InvalidSeed(n));
            }
            Ok(ResolvedRef::Seed(n - 1))
        }
        StaticTeamRef::MatchPosition(s) => parse_match_position_ref(s, rounds_so_far),
    }
}

fn invalid(s: &str) -> EngineError {
    EngineError::InvalidReference {
        num: MatchNumber(0),
        reference: s.to_string(),
    }
}

/// Accepts both the modern `"R{round}M{match}P{position}"` syntax and the
/// legacy shorthand `"{round}{match}{position}"` (three bare digits).
fn parse_match_position_ref(raw: &str, rounds_so_far: usize) -> EngineResult<ResolvedRef> {
    let (round, rest) = if let Some(rest) = raw.strip_prefix('R') {
        let end = rest.find('M').ok_or_else(|| invalid(raw))?;
        let round: usize = rest[..end].parse().map_err(|_| invalid(raw))?;
        (round, &rest[end..])
    } else if raw.len() == 3 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let round: usize = raw[0..1].parse().map_err(|_| invalid(raw))?;
        return finish_legacy(round, &raw[1..2], &raw[2..3], raw, rounds_so_far);
    } else {
        return Err(invalid(raw));
    };
    let rest = rest.strip_prefix('M').ok_or_else(|| invalid(raw))?;
    let p_idx = rest.find('P').ok_or_else(|| invalid(raw))?;
    let m: usize = rest[..p_idx].parse().map_err(|_| invalid(raw))?;
    let p: usize = rest[p_idx + 1..].parse().map_err(|_| invalid(raw))?;
    finish(round, m, p, raw, rounds_so_far)
}

fn finish_legacy(
    round: usize,
    m: &str,
    p: &str,
    raw: &str,
    rounds_so_far: usize,
) -> EngineResult<ResolvedRef> {
    let m: usize = m.parse().map_err(|_| invalid(raw))?;
    let p: usize = p.parse().map_err(|_| invalid(raw))?;
    finish(round, m, p, raw, rounds_so_far)
}

fn finish(round: usize, m: usize, p: usize, raw: &str, rounds_so_far: usize) -> EngineResult<ResolvedRef> {
    if round == 0 || round > rounds_so_far || m == 0 || p == 0 {
        return Err(invalid(raw));
    }
    Ok(ResolvedRef::EarlierMatch {
        round_index: round - 1,
        match_in_round: m - 1,
        position: p - 1,
    })
}

/// Validates and resolves a static bracket against `num_seeds` available
/// seeds, returning the round-by-round resolved team references. All
/// validation is fatal and happens here, at construction, never at query
/// time.
fn resolve_bracket(
    config: &StaticKnockoutConfig,
    num_seeds: usize,
) -> EngineResult<Vec<Vec<(ArenaName, Vec<ResolvedRef>, Option<String>)>>> {
    let mut rounds = Vec::with_capacity(config.rounds.len());
    let mut match_number = 0u32;
    for (round_idx, round) in config.rounds.iter().enumerate() {
        let mut resolved_round = Vec::with_capacity(round.matches.len());
        for m in &round.matches {
            if m.teams.len() != config.teams_per_arena {
                return Err(EngineError::WrongNumberOfTeams {
                    num: MatchNumber(match_number),
                    arena: m.arena.to_string(),
                    expected: config.teams_per_arena,
                    actual: m.teams.len(),
                });
            }
            let mut refs = Vec::with_capacity(m.teams.len());
            for team_ref in &m.teams {
                refs.push(parse_team_ref(team_ref, num_seeds, round_idx)?);
            }
            resolved_round.push((m.arena.clone(), refs, m.display_name.clone()));
            match_number += 1;
        }
        rounds.push(resolved_round);
    }
    Ok(rounds)
}

/// Builds every round of a static knockout bracket. `seeds` is the ordered
/// league seed list (best first); `earlier_results` gives, for each
/// already-scheduled match (indexed by its position within its round,
/// 0-based, in declaration order), the finishing order of its teams once
/// scored — `None` if not yet played.
pub fn schedule_static_knockout(
    config: &StaticKnockoutConfig,
    seeds: &[Tla],
    match_duration: Duration,
    start_match_number: u32,
    earlier_results: &HashMap<(usize, usize), Vec<Tla>>,
) -> EngineResult<MatchPeriod> {
    let rounds = resolve_bracket(config, seeds.len())?;
    let total_rounds = rounds.len();
    let last_round_end = config.rounds[total_rounds - 1].start_time + match_duration;
    let mut period = MatchPeriod::new(
        "knockout",
        config.rounds[0].start_time,
        last_round_end,
        last_round_end,
        MatchType::Knockout,
    );

    let mut next_number = start_match_number;
    // finishing order of each already-emitted match, by (round_idx, match_idx).
    let mut results: HashMap<(usize, usize), Vec<Tla>> = earlier_results.clone();

    for (round_idx, round_matches) in rounds.iter().enumerate() {
        let rounds_left = (total_rounds - 1 - round_idx) as u32;
        let is_last_round = round_idx + 1 == total_rounds;
        let start_time = config.rounds[round_idx].start_time;
        let mut slot: MatchSlot = IndexMap::new();

        for (match_idx, (arena, refs, display_override)) in round_matches.iter().enumerate() {
            let teams: Vec<Option<Tla>> = refs
                .iter()
                .map(|r| resolve_team(r, seeds, &results))
                .collect::<EngineResult<Vec<_>>>()?;

            let num = MatchNumber(next_number);
            next_number += 1;
            let display_name = display_override
                .clone()
                .unwrap_or_else(|| knockout_display_name(rounds_left, match_idx, num));

            let m = Match {
                num,
                display_name,
                arena: arena.clone(),
                teams,
                start_time,
                end_time: start_time + match_duration,
                kind: MatchType::Knockout,
                use_resolved_ranking: !is_last_round,
            };
            slot.insert(arena.clone(), m);

            if let Some(finishers) = earlier_results.get(&(round_idx, match_idx)) {
                results.insert((round_idx, match_idx), finishers.clone());
            }
        }
        period.matches.push(slot);
    }

    Ok(period)
}

fn resolve_team(
    r: &ResolvedRef,
    seeds: &[Tla],
    results: &HashMap<(usize, usize), Vec<Tla>>,
) -> EngineResult<Option<Tla>> {
    match r {
        ResolvedRef::Unknown => Ok(None),
        ResolvedRef::Seed(idx) => Ok(seeds.get(*idx).cloned()),
        ResolvedRef::EarlierMatch {
            round_index,
            match_in_round,
            position,
        } => Ok(results
            .get(&(*round_index, *match_in_round))
            .and_then(|finishers| finishers.get(*position).cloned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{StaticKnockoutMatch, StaticKnockoutRound};
    use time::macros::datetime;

    fn two_round_bracket() -> StaticKnockoutConfig {
        StaticKnockoutConfig {
            teams_per_arena: 2,
            rounds: vec![
                StaticKnockoutRound {
                    start_time: datetime!(2024-01-01 09:00:00 UTC),
                    matches: vec![
                        StaticKnockoutMatch {
                            arena: ArenaName::new("A"),
                            teams: vec![
                                StaticTeamRef::Seed("S1".into()),
                                StaticTeamRef::Seed("S4".into()),
                            ],
                            display_name: None,
                        },
                        StaticKnockoutMatch {
                            arena: ArenaName::new("B"),
                            teams: vec![
                                StaticTeamRef::Seed("S2".into()),
                                StaticTeamRef::Seed("S3".into()),
                            ],
                            display_name: None,
                        },
                    ],
                },
                StaticKnockoutRound {
                    start_time: datetime!(2024-01-01 10:00:00 UTC),
                    matches: vec![StaticKnockoutMatch {
                        arena: ArenaName::new("A"),
                        teams: vec![
                            StaticTeamRef::MatchPosition("R1M1P1".into()),
                            StaticTeamRef::MatchPosition("R1M2P1".into()),
                        ],
                        display_name: None,
                    }],
                },
            ],
        }
    }

    #[test]
    fn first_round_resolves_seeds_directly() {
        let config = two_round_bracket();
        let seeds: Vec<Tla> = ["AAA", "BBB", "CCC", "DDD"].into_iter().map(Tla::new).collect();
        let period = schedule_static_knockout(&config, &seeds, Duration::minutes(5), 10, &HashMap::new()).unwrap();
        let first = &period.matches[0][&ArenaName::new("A")];
        assert_eq!(first.teams, vec![Some(Tla::new("AAA")), Some(Tla::new("DDD"))]);
        assert!(first.use_resolved_ranking);
    }

    #[test]
    fn final_references_earlier_match_winners_once_known() {
        let config = two_round_bracket();
        let seeds: Vec<Tla> = ["AAA", "BBB", "CCC", "DDD"].into_iter().map(Tla::new).collect();
        let mut earlier = HashMap::new();
        earlier.insert((0usize, 0usize), vec![Tla::new("AAA"), Tla::new("DDD")]);
        earlier.insert((0usize, 1usize), vec![Tla::new("BBB"), Tla::new("CCC")]);
        let period = schedule_static_knockout(&config, &seeds, Duration::minutes(5), 10, &earlier).unwrap();
        let final_match = &period.matches[1][&ArenaName::new("A")];
        assert_eq!(final_match.teams, vec![Some(Tla::new("AAA")), Some(Tla::new("BBB"))]);
        assert!(!final_match.use_resolved_ranking);
    }

    #[test]
    fn unplayed_earlier_match_leaves_final_slots_blank() {
        let config = two_round_bracket();
        let seeds: Vec<Tla> = ["AAA", "BBB", "CCC", "DDD"].into_iter().map(Tla::new).collect();
        let period = schedule_static_knockout(&config, &seeds, Duration::minutes(5), 10, &HashMap::new()).unwrap();
        let final_match = &period.matches[1][&ArenaName::new("A")];
        assert_eq!(final_match.teams, vec![None, None]);
    }

    #[test]
    fn out_of_range_seed_reference_is_rejected() {
        let mut config = two_round_bracket();
        config.rounds[0].matches[0].teams[0] = StaticTeamRef::Seed("S9".into());
        let seeds: Vec<Tla> = ["AAA", "BBB", "CCC", "DDD"].into_iter().map(Tla::new).collect();
        assert!(schedule_static_knockout(&config, &seeds, Duration::minutes(5), 10, &HashMap::new()).is_err());
    }

    #[test]
    fn match_with_wrong_team_count_is_rejected() {
        let mut config = two_round_bracket();
        config.rounds[0].matches[0].teams.push(StaticTeamRef::Seed("S1".into()));
        let seeds: Vec<Tla> = ["AAA", "BBB", "CCC", "DDD"].into_iter().map(Tla::new).collect();
        let err = schedule_static_knockout(&config, &seeds, Duration::minutes(5), 10, &HashMap::new()).unwrap_err();
        assert!(matches!(err, EngineError::WrongNumberOfTeams { expected: 2, actual: 3, .. }));
    }
}
