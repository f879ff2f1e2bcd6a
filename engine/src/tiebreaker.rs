//! Detects a tied final and injects a tiebreaker match after it.

use crate::ids::{ArenaName, MatchNumber, Tla};
use crate::knockout_score::KnockoutMatchScore;
use crate::match_::{Match, MatchPeriod, MatchSlot, MatchType};
use indexmap::IndexMap;
use time::Duration;

/// If the final's resolved positions tie more than one team for first
/// place, builds the single-match period that breaks it. Returns `None`
/// when there is no tie (the common case).
pub fn inject_tiebreaker(
    final_match: &Match,
    final_score: &KnockoutMatchScore,
    league_positions: &IndexMap<Tla, usize>,
    next_match_number: u32,
    start_time: time::OffsetDateTime,
    match_duration: Duration,
    arena: ArenaName,
) -> Option<MatchPeriod> {
    let resolved = final_score.resolved_positions.as_ref().unwrap_or(&final_score.game_positions);
    let mut tied_for_first: Vec<&Tla> = resolved
        .iter()
        .filter(|(_, &pos)| pos == 1)
        .map(|(tla, _)| tla)
        .collect();
    if tied_for_first.len() < 2 {
        return None;
    }
    log::info!(
        "final match #{} tied {} ways for first place, injecting tiebreaker #{}",
        final_match.num,
        tied_for_first.len(),
        next_match_number
    );
    tied_for_first.sort_by_key(|tla| league_positions.get(*tla).copied().unwrap_or(usize::MAX));

    let mut teams: Vec<Option<Tla>> = tied_for_first.into_iter().cloned().map(Some).collect();
    teams.resize(final_match.teams.len().max(teams.len()), None);

    let num = MatchNumber(next_match_number);
    let m = Match {
        num,
        display_name: format!("Tiebreaker (#{})", num),
        arena,
        teams,
        start_time,
        end_time: start_time + match_duration,
        kind: MatchType::Tiebreaker,
        use_resolved_ranking: false,
    };
    let mut slot: MatchSlot = IndexMap::new();
    slot.insert(m.arena.clone(), m);

    let mut period = MatchPeriod::new(
        "Tiebreaker",
        start_time,
        start_time + match_duration,
        start_time + match_duration,
        MatchType::Tiebreaker,
    );
    period.matches.push(slot);
    Some(period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn match_with_teams(num: u32, teams: &[&str]) -> Match {
        Match {
            num: MatchNumber(num),
            display_name: "Final".into(),
            arena: ArenaName::new("A"),
            teams: teams.iter().map(|t| Some(Tla::new(*t))).collect(),
            start_time: datetime!(2024-01-01 12:00:00 UTC),
            end_time: datetime!(2024-01-01 12:05:00 UTC),
            kind: MatchType::Knockout,
            use_resolved_ranking: false,
        }
    }

    #[test]
    fn tied_first_place_triggers_a_tiebreaker() {
        let final_match = match_with_teams(40, &["AAA", "BBB", "CCC", "DDD"]);
        let score = KnockoutMatchScore {
            game_positions: [
                (Tla::new("AAA"), 1),
                (Tla::new("BBB"), 1),
                (Tla::new("CCC"), 3),
                (Tla::new("DDD"), 4),
            ]
            .into_iter()
            .collect(),
            resolved_positions: None,
        };
        let league_positions: IndexMap<Tla, usize> =
            [(Tla::new("AAA"), 2), (Tla::new("BBB"), 1)].into_iter().collect();
        let period = inject_tiebreaker(
            &final_match,
            &score,
            &league_positions,
            41,
            datetime!(2024-01-01 13:00:00 UTC),
            Duration::minutes(5),
            ArenaName::new("A"),
        )
        .unwrap();
        let tb = period.matches[0].values().next().unwrap();
        assert_eq!(tb.kind, MatchType::Tiebreaker);
        // BBB has the better league rank, so leads the tiebreaker team list.
        assert_eq!(tb.teams[0], Some(Tla::new("BBB")));
        assert_eq!(tb.teams[1], Some(Tla::new("AAA")));
    }

    #[test]
    fn clear_winner_needs_no_tiebreaker() {
        let final_match = match_with_teams(40, &["AAA", "BBB", "CCC", "DDD"]);
        let score = KnockoutMatchScore {
            game_positions: [
                (Tla::new("AAA"), 1),
                (Tla::new("BBB"), 2),
                (Tla::new("CCC"), 3),
                (Tla::new("DDD"), 4),
            ]
            .into_iter()
            .collect(),
            resolved_positions: None,
        };
        let result = inject_tiebreaker(
            &final_match,
            &score,
            &IndexMap::new(),
            41,
            datetime!(2024-01-01 13:00:00 UTC),
            Duration::minutes(5),
            ArenaName::new("A"),
        );
        assert!(result.is_none());
    }
}
