//! Day-of-event match control: whether a match is still waiting to be
//! played, held open at the staging area past its release threshold, or
//! released to start.

use crate::errors::{EngineError, EngineResult};
use crate::ids::MatchNumber;
use crate::match_::Match;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Its release threshold has not yet arrived.
    Future,
    /// Past its release threshold but not explicitly released.
    Held,
    /// Explicitly released (or a later match already has been).
    Released,
}

/// The derived arena-facing timestamps for one match.
#[derive(Debug, Clone, Copy)]
pub struct ArenaTimes {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub release_threshold_time: OffsetDateTime,
}

pub fn get_arena_times(
    match_slot_start: OffsetDateTime,
    pre: Duration,
    match_duration: Duration,
    release_threshold: Duration,
) -> ArenaTimes {
    let start = match_slot_start + pre;
    ArenaTimes {
        start,
        end: start + match_duration,
        release_threshold_time: start - release_threshold,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReleasedMatch {
    pub number: MatchNumber,
    pub time: OffsetDateTime,
}

impl From<&crate::documents::ReleasedMatchEntry> for ReleasedMatch {
    fn from(entry: &crate::documents::ReleasedMatchEntry) -> Self {
        Self {
            number: MatchNumber(entry.number),
            time: entry.time,
        }
    }
}

/// Tracks the operations-record state needed for match control:
/// `reset_duration` (arena turnaround time) must be at least
/// `release_threshold` (how long before its slot a match may be held), and
/// at most one match may have been manually released ahead of schedule.
#[derive(Debug, Clone)]
pub struct OperationsMatches {
    pub release_threshold: Duration,
    pub reset_duration: Duration,
    pub released_match: Option<ReleasedMatch>,
}

impl OperationsMatches {
    pub fn new(
        release_threshold: Duration,
        reset_duration: Duration,
        released_match: Option<ReleasedMatch>,
    ) -> EngineResult<Self> {
        if reset_duration < release_threshold {
            return Err(EngineError::InvalidResetDuration {
                reset_duration_secs: reset_duration.whole_seconds(),
                release_threshold_secs: release_threshold.whole_seconds(),
            });
        }
        Ok(Self {
            release_threshold,
            reset_duration,
            released_match,
        })
    }

    /// `released_match.number` must name a match that actually exists in
    /// the schedule; `last_match_number` is the highest scheduled number.
    pub fn validate_released_match(&self, last_match_number: MatchNumber) -> EngineResult<()> {
        if let Some(released) = self.released_match {
            if released.number > last_match_number {
                return Err(EngineError::InvalidReleasedMatchNumber(released.number.0));
            }
        }
        Ok(())
    }

    pub fn get_match_state(&self, m: &Match, pre: Duration, now: OffsetDateTime) -> MatchState {
        if let Some(released) = self.released_match {
            if m.num <= released.number {
                return MatchState::Released;
            }
        }
        let release_threshold_time = (m.start_time + pre) - self.release_threshold;
        if release_threshold_time <= now {
            MatchState::Held
        } else {
            MatchState::Future
        }
    }

    /// The "effective now" used by [`crate::schedule::MatchSchedule`]
    /// queries: identical to `now`, unless the next unreleased match's
    /// release threshold has already passed, in which case it is clamped
    /// to that threshold so a held match pauses downstream queries.
    pub fn effective_now(&self, now: OffsetDateTime, next_unreleased_release_threshold_time: Option<OffsetDateTime>) -> OffsetDateTime {
        match next_unreleased_release_threshold_time {
            Some(threshold) if threshold <= now => threshold,
            _ => now,
        }
    }

    /// The first match, by number, that hasn't been released yet.
    fn next_unreleased_match<'a>(&self, schedule: &'a crate::schedule::MatchSchedule) -> Option<&'a Match> {
        let next_num = self.released_match.map(|r| r.number.0 + 1).unwrap_or(0);
        schedule
            .all_matches()
            .into_iter()
            .filter(|m| m.num.0 >= next_num)
            .min_by_key(|m| m.num)
    }

    /// Every match with a useful relation to `now`: currently playing,
    /// staging, or being called forward by shepherds. Accounts for both
    /// committed delays (baked into the schedule already) and operational
    /// holds (an unreleased match past its release threshold pauses the
    /// effective time used for staging/shepherding lookups, though `time`
    /// on the result always reports the real `now`).
    pub fn get_matches_at<'a>(
        &self,
        schedule: &'a crate::schedule::MatchSchedule,
        pre: Duration,
        staging: &crate::documents::StagingTimes,
        now: OffsetDateTime,
    ) -> MatchesAt<'a> {
        let next_threshold = self
            .next_unreleased_match(schedule)
            .map(|m| (m.start_time + pre) - self.release_threshold);
        let effective = self.effective_now(now, next_threshold);

        let mut matches = Vec::new();
        let mut staging_matches = Vec::new();
        let mut shepherding_matches = Vec::new();

        for m in schedule.all_matches() {
            if m.start_time <= effective && effective < m.end_time {
                matches.push(m);
            }

            let staging_times = schedule.get_staging_times(m, pre, staging);
            if effective > staging_times.closes {
                continue;
            }
            if staging_times.opens <= effective {
                staging_matches.push(m);
            }
            if let Some(first_signal) = staging_times.signal_shepherds.values().min() {
                if *first_signal <= effective {
                    shepherding_matches.push(m);
                }
            }
        }

        MatchesAt {
            time: now,
            matches,
            staging_matches,
            shepherding_matches,
        }
    }
}

/// The resolved result of [`OperationsMatches::get_matches_at`].
#[derive(Debug, Clone)]
pub struct MatchesAt<'a> {
    pub time: OffsetDateTime,
    pub matches: Vec<&'a Match>,
    pub staging_matches: Vec<&'a Match>,
    pub shepherding_matches: Vec<&'a Match>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ArenaName;
    use crate::match_::MatchType;
    use time::macros::datetime;

    fn sample_match(num: u32, start_time: OffsetDateTime) -> Match {
        Match {
            num: MatchNumber(num),
            display_name: "Match".into(),
            arena: ArenaName::new("A"),
            teams: Vec::new(),
            start_time,
            end_time: start_time + Duration::minutes(5),
            kind: MatchType::League,
            use_resolved_ranking: false,
        }
    }

    #[test]
    fn rejects_reset_duration_shorter_than_release_threshold() {
        let result = OperationsMatches::new(Duration::seconds(180), Duration::seconds(120), None);
        assert!(result.is_err());
    }

    #[test]
    fn match_before_release_threshold_is_future() {
        let ops = OperationsMatches::new(Duration::seconds(60), Duration::seconds(120), None).unwrap();
        let m = sample_match(1, datetime!(2024-01-01 10:00:00 UTC));
        let state = ops.get_match_state(&m, Duration::ZERO, datetime!(2024-01-01 09:58:00 UTC));
        assert_eq!(state, MatchState::Future);
    }

    #[test]
    fn match_past_release_threshold_is_held() {
        let ops = OperationsMatches::new(Duration::seconds(60), Duration::seconds(120), None).unwrap();
        let m = sample_match(1, datetime!(2024-01-01 10:00:00 UTC));
        let state = ops.get_match_state(&m, Duration::ZERO, datetime!(2024-01-01 09:59:30 UTC));
        assert_eq!(state, MatchState::Held);
    }

    #[test]
    fn explicit_release_covers_earlier_numbered_matches_too() {
        let ops = OperationsMatches::new(
            Duration::seconds(60),
            Duration::seconds(120),
            Some(ReleasedMatch { number: MatchNumber(5), time: datetime!(2024-01-01 09:00:00 UTC) }),
        )
        .unwrap();
        let m = sample_match(3, datetime!(2024-01-01 12:00:00 UTC));
        let state = ops.get_match_state(&m, Duration::ZERO, datetime!(2024-01-01 09:00:01 UTC));
        assert_eq!(state, MatchState::Released);
    }

    fn one_match_schedule(start_time: OffsetDateTime) -> crate::schedule::MatchSchedule {
        use crate::match_::{MatchPeriod, MatchType as MT};
        use crate::documents::MatchSlotLengths;
        use indexmap::IndexMap;

        let mut slot = IndexMap::new();
        slot.insert(ArenaName::new("A"), sample_match(1, start_time));
        let mut period = MatchPeriod::new(
            "league",
            start_time - Duration::minutes(5),
            start_time + Duration::minutes(30),
            start_time + Duration::minutes(40),
            MT::League,
        );
        period.matches.push(slot);

        crate::schedule::MatchSchedule {
            periods: vec![period],
            slot_lengths: MatchSlotLengths { pre: 0, match_duration: 300, post: 0 },
            delays: Vec::new(),
            n_planned_league_matches: 1,
            n_league_matches: 1,
        }
    }

    fn staging() -> crate::documents::StagingTimes {
        crate::documents::StagingTimes {
            closes: 30,
            opens: 300,
            duration: 270,
            signal_shepherds: [("A".to_string(), 180)].into_iter().collect(),
            signal_teams: 60,
        }
    }

    #[test]
    fn get_matches_at_finds_playing_and_staging_matches() {
        let start = datetime!(2024-01-01 10:00:00 UTC);
        let schedule = one_match_schedule(start);
        let ops = OperationsMatches::new(Duration::seconds(60), Duration::seconds(120), None).unwrap();

        // one minute before the match starts: still future, but well inside
        // the staging and shepherding windows.
        let result = ops.get_matches_at(&schedule, Duration::ZERO, &staging(), start - Duration::minutes(1));
        assert!(result.matches.is_empty());
        assert_eq!(result.staging_matches.len(), 1);
        assert_eq!(result.shepherding_matches.len(), 1);

        // mid-match, with the match already released so the effective time
        // isn't clamped to its own release threshold: playing, no longer
        // staging.
        let released = OperationsMatches::new(
            Duration::seconds(60),
            Duration::seconds(120),
            Some(ReleasedMatch { number: MatchNumber(1), time: start }),
        )
        .unwrap();
        let result = released.get_matches_at(&schedule, Duration::ZERO, &staging(), start + Duration::minutes(1));
        assert_eq!(result.matches.len(), 1);
        assert!(result.staging_matches.is_empty());
    }

    #[test]
    fn get_matches_at_pauses_effective_time_while_held() {
        let start = datetime!(2024-01-01 10:00:00 UTC);
        let schedule = one_match_schedule(start);
        let ops = OperationsMatches::new(Duration::seconds(60), Duration::seconds(120), None).unwrap();

        // real time is well past the match's release threshold, but the
        // match hasn't been released: effective time clamps to the
        // threshold, so the match never appears as "playing".
        let result = ops.get_matches_at(&schedule, Duration::ZERO, &staging(), start + Duration::hours(1));
        assert_eq!(result.time, start + Duration::hours(1));
        assert!(result.matches.is_empty());
    }

    #[test]
    fn released_match_number_beyond_schedule_is_rejected() {
        let ops = OperationsMatches::new(
            Duration::seconds(60),
            Duration::seconds(120),
            Some(ReleasedMatch { number: MatchNumber(99), time: datetime!(2024-01-01 09:00:00 UTC) }),
        )
        .unwrap();
        assert!(ops.validate_released_match(MatchNumber(10)).is_err());
    }
}
