//! Builds the wall-clock league match schedule from the declarative plan,
//! and answers the temporal queries the rest of the engine needs.

use crate::clock::{MatchPeriodClock, PeriodBounds};
use crate::documents::{parse_match_number_range, ExtraSpacingEntry, LeagueDocument, MatchPeriodPlan, MatchSlotLengths, SchedulePlan};
use crate::errors::EngineResult;
use crate::ids::{ArenaName, MatchNumber, Tla};
use crate::match_::{Delay, Match, MatchPeriod, MatchSlot, MatchType};
use crate::team::Team;
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};

/// One (match number, arena -> teams) row from `league.yaml`, in emission
/// order.
struct PlannedMatch {
    num: MatchNumber,
    slots: Vec<(ArenaName, Vec<Option<Tla>>)>,
}

fn flatten_league_table(league: &LeagueDocument, roster: &HashMap<Tla, Team>) -> Vec<PlannedMatch> {
    let mut nums: Vec<MatchNumber> = league.matches.keys().copied().collect();
    nums.sort();
    nums.into_iter()
        .map(|num| {
            let arenas = &league.matches[&num];
            let mut arena_names: Vec<ArenaName> = arenas.keys().cloned().collect();
            arena_names.sort();
            let slots = arena_names
                .into_iter()
                .map(|arena| {
                    let teams = arenas[&arena]
                        .iter()
                        .map(|maybe_tla| {
                            maybe_tla.clone().filter(|tla| {
                                roster.get(tla).map(|team| team.is_still_around(num)).unwrap_or(true)
                            })
                        })
                        .collect();
                    (arena, teams)
                })
                .collect();
            PlannedMatch { num, slots }
        })
        .collect()
}

/// Sums the extra spacing to apply immediately after emitting the last
/// match number in each entry's range, keyed by that terminal match number
/// — entries whose ranges share the same last match accumulate additively.
fn extra_spacing_after(entries: &[ExtraSpacingEntry]) -> EngineResult<HashMap<MatchNumber, Duration>> {
    let mut after = HashMap::new();
    for entry in entries {
        let matches = parse_match_number_range(&entry.matches)?;
        if let Some(&last) = matches.iter().max() {
            *after.entry(last).or_insert(Duration::ZERO) += Duration::seconds(entry.duration as i64);
        }
    }
    Ok(after)
}

/// The resolved pre-match staging window for one match.
pub struct StagingWindow {
    pub opens: OffsetDateTime,
    pub closes: OffsetDateTime,
    pub signal_teams: OffsetDateTime,
    pub signal_shepherds: HashMap<String, OffsetDateTime>,
}

/// The built league match schedule.
pub struct MatchSchedule {
    pub periods: Vec<MatchPeriod>,
    pub slot_lengths: MatchSlotLengths,
    pub delays: Vec<Delay>,
    pub n_planned_league_matches: usize,
    pub n_league_matches: usize,
}

impl MatchSchedule {
    pub fn build(plan: &SchedulePlan, league_doc: &LeagueDocument, roster: &HashMap<Tla, Team>) -> EngineResult<Self> {
        let planned = flatten_league_table(league_doc, roster);
        let extra_after = extra_spacing_after(&plan.league.extra_spacing)?;
        let slot_length = Duration::seconds(plan.match_slot_lengths.total() as i64);

        let mut periods = Vec::with_capacity(plan.match_periods.league.len());
        let mut cursor = 0usize;
        let n_planned_league_matches = planned.len();

        for period_plan in &plan.match_periods.league {
            let mut period = period_from_plan(period_plan, MatchType::League);
            let bounds = PeriodBounds::from(&period);
            let delays_in_period: Vec<Delay> = plan
                .delays
                .iter()
                .filter(|d| d.time >= bounds.start_time && d.time <= bounds.end_time)
                .copied()
                .collect();
            let mut clock = MatchPeriodClock::new(bounds, &delays_in_period);

            while cursor < planned.len() {
                let time = match clock.current_time() {
                    Ok(t) => t,
                    Err(_) => {
                        log::warn!(
                            "league period \"{}\" ran out of time with {} of {} planned matches still unscheduled",
                            period.description,
                            planned.len() - cursor,
                            planned.len()
                        );
                        break;
                    }
                };
                let entry = &planned[cursor];
                let mut slot: MatchSlot = MatchSlot::new();
                for (arena, teams) in &entry.slots {
                    let m = Match {
                        num: entry.num,
                        display_name: format!("Match {}", entry.num),
                        arena: arena.clone(),
                        teams: teams.clone(),
                        start_time: time,
                        end_time: time + Duration::seconds(plan.match_slot_lengths.match_duration as i64),
                        kind: MatchType::League,
                        use_resolved_ranking: false,
                    };
                    slot.insert(arena.clone(), m);
                }
                period.matches.push(slot);
                cursor += 1;

                clock.advance(slot_length);
                if let Some(&extra) = extra_after.get(&entry.num) {
                    clock.advance(extra);
                }
            }

            periods.push(period);
        }

        Ok(Self {
            periods,
            slot_lengths: plan.match_slot_lengths,
            delays: plan.delays.clone(),
            n_planned_league_matches,
            n_league_matches: cursor,
        })
    }

    pub fn period_at(&self, t: OffsetDateTime) -> Option<&MatchPeriod> {
        self.periods
            .iter()
            .find(|p| t >= p.start_time && t < p.max_end_time)
    }

    pub fn delay_at(&self, t: OffsetDateTime) -> Duration {
        self.delays
            .iter()
            .filter(|d| d.time <= t)
            .fold(Duration::ZERO, |acc, d| acc + d.delay)
    }

    /// Every match, across every period, whose `[start_time, end_time)`
    /// contains `t`.
    pub fn matches_at(&self, t: OffsetDateTime) -> Vec<&Match> {
        self.periods
            .iter()
            .flat_map(|p| p.matches.iter())
            .flat_map(|slot| slot.values())
            .filter(|m| m.start_time <= t && t < m.end_time)
            .collect()
    }

    /// Pre-match staging windows for `m`, derived from the period's
    /// staging offsets: `opens`/`closes` bracket when teams and shepherds
    /// must be in place, `signal_*` are individual heads-up times.
    pub fn get_staging_times(&self, m: &Match, pre: Duration, staging: &crate::documents::StagingTimes) -> StagingWindow {
        let base = m.start_time + pre;
        StagingWindow {
            opens: base - Duration::seconds(staging.opens as i64),
            closes: base - Duration::seconds(staging.closes as i64),
            signal_teams: base - Duration::seconds(staging.signal_teams as i64),
            signal_shepherds: staging
                .signal_shepherds
                .iter()
                .map(|(area, offset)| (area.clone(), base - Duration::seconds(*offset as i64)))
                .collect(),
        }
    }

    pub fn final_match(&self) -> Option<&Match> {
        self.all_matches().into_iter().max_by_key(|m| m.num)
    }

    /// Every scheduled match, in no particular order.
    pub fn all_matches(&self) -> Vec<&Match> {
        self.periods
            .iter()
            .flat_map(|p| p.matches.iter())
            .flat_map(|slot| slot.values())
            .collect()
    }
}

fn period_from_plan(plan: &MatchPeriodPlan, kind: MatchType) -> MatchPeriod {
    MatchPeriod::new(
        plan.description.clone(),
        plan.start_time,
        plan.end_time,
        plan.max_end_time.unwrap_or(plan.end_time),
        kind,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{LeaguePlan, MatchPeriodsPlan, StagingTimes};
    use time::macros::datetime;

    fn roster() -> HashMap<Tla, Team> {
        [Team::new("AAA", "Alpha"), Team::new("BBB", "Bravo")]
            .into_iter()
            .map(|t| (t.tla.clone(), t))
            .collect()
    }

    fn plan() -> SchedulePlan {
        let mut matches = HashMap::new();
        let mut arenas = HashMap::new();
        arenas.insert(ArenaName::new("A"), vec![Some(Tla::new("AAA")), Some(Tla::new("BBB"))]);
        matches.insert(MatchNumber(1), arenas.clone());
        matches.insert(MatchNumber(2), arenas);

        SchedulePlan {
            match_slot_lengths: MatchSlotLengths { pre: 30, match_duration: 150, post: 30 },
            staging: StagingTimes { closes: 30, opens: 300, duration: 270, signal_shepherds: HashMap::new(), signal_teams: 60 },
            delays: Vec::new(),
            match_periods: MatchPeriodsPlan {
                league: vec![MatchPeriodPlan {
                    description: "league".into(),
                    start_time: datetime!(2024-01-01 09:00:00 UTC),
                    end_time: datetime!(2024-01-01 10:00:00 UTC),
                    max_end_time: None,
                    matches: vec![MatchNumber(1), MatchNumber(2)],
                }],
                knockout: Vec::new(),
            },
            league: LeaguePlan::default(),
        }
    }

    fn league_doc() -> LeagueDocument {
        let mut matches = HashMap::new();
        let mut arenas = HashMap::new();
        arenas.insert(ArenaName::new("A"), vec![Some(Tla::new("AAA")), Some(Tla::new("BBB"))]);
        matches.insert(MatchNumber(1), arenas.clone());
        matches.insert(MatchNumber(2), arenas);
        LeagueDocument { matches, ranked_points: None }
    }

    #[test]
    fn emits_one_slot_per_planned_match() {
        let schedule = MatchSchedule::build(&plan(), &league_doc(), &roster()).unwrap();
        assert_eq!(schedule.n_planned_league_matches, 2);
        assert_eq!(schedule.n_league_matches, 2);
        assert_eq!(schedule.periods[0].matches.len(), 2);
    }

    #[test]
    fn extra_spacing_pushes_later_matches_back() {
        let mut p = plan();
        p.league.extra_spacing.push(ExtraSpacingEntry { matches: "1".into(), duration: 600 });
        let schedule = MatchSchedule::build(&p, &league_doc(), &roster()).unwrap();
        let first_start = schedule.periods[0].matches[0][&ArenaName::new("A")].start_time;
        let second_start = schedule.periods[0].matches[1][&ArenaName::new("A")].start_time;
        assert_eq!(second_start - first_start, Duration::seconds(210 + 600));
    }

    #[test]
    fn truncates_when_the_period_runs_out_of_time() {
        let mut p = plan();
        p.match_periods.league[0].end_time = datetime!(2024-01-01 09:02:00 UTC);
        p.match_periods.league[0].max_end_time = Some(datetime!(2024-01-01 09:02:00 UTC));
        let schedule = MatchSchedule::build(&p, &league_doc(), &roster()).unwrap();
        assert!(schedule.n_league_matches < schedule.n_planned_league_matches);
    }
}
