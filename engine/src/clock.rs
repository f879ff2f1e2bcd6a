//! Advances a cursor through a match period, absorbing delays as they are
//! crossed.

use crate::errors::EngineError;
use crate::match_::{Delay, MatchPeriod};
use time::{Duration, OffsetDateTime};

/// The three timestamps a clock needs out of a [`MatchPeriod`], copied out
/// so a clock can be built and advanced while the period's `matches` vector
/// is mutated concurrently by the caller.
#[derive(Debug, Clone, Copy)]
pub struct PeriodBounds {
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub max_end_time: OffsetDateTime,
}

impl From<&MatchPeriod> for PeriodBounds {
    fn from(period: &MatchPeriod) -> Self {
        Self {
            start_time: period.start_time,
            end_time: period.end_time,
            max_end_time: period.max_end_time,
        }
    }
}

/// Walks forward through a match period, folding in any [`Delay`] whose
/// effective time the cursor reaches.
///
/// The cursor always represents the next slot start time, already inclusive
/// of every delay whose `time` is at or before it — delays are absorbed
/// eagerly in [`Self::advance`], never deferred to the next read.
pub struct MatchPeriodClock {
    cursor: OffsetDateTime,
    /// Cursor position had no delay ever been applied; used only to decide
    /// whether an overrun past `end_time` is still permitted.
    undelayed_cursor: OffsetDateTime,
    bounds: PeriodBounds,
    pending: Vec<Delay>,
}

impl MatchPeriodClock {
    /// Delays must be pre-filtered to this period's span by the caller, and
    /// need not be sorted.
    pub fn new(bounds: impl Into<PeriodBounds>, delays: &[Delay]) -> Self {
        let bounds = bounds.into();
        let mut pending = delays.to_vec();
        pending.sort_by_key(|d| d.time);
        let mut clock = Self {
            cursor: bounds.start_time,
            undelayed_cursor: bounds.start_time,
            bounds,
            pending,
        };
        clock.absorb();
        clock
    }

    fn absorb(&mut self) {
        while let Some(next) = self.pending.first() {
            if next.time > self.cursor {
                break;
            }
            self.cursor += next.delay;
            self.pending.remove(0);
        }
    }

    /// The current slot start time, or [`EngineError::OutOfTime`] if the
    /// period has been exhausted.
    pub fn current_time(&self) -> Result<OffsetDateTime, EngineError> {
        let within_period = self.cursor <= self.bounds.end_time;
        let would_have_started_in_time = self.undelayed_cursor <= self.bounds.end_time;
        let overrun_allowed = would_have_started_in_time && self.cursor <= self.bounds.max_end_time;
        if within_period || overrun_allowed {
            Ok(self.cursor)
        } else {
            Err(EngineError::OutOfTime)
        }
    }

    /// Moves the cursor forward by `step`, absorbing any delay crossed.
    pub fn advance(&mut self, step: Duration) {
        self.cursor += step;
        self.undelayed_cursor += step;
        self.absorb();
    }

    /// Returns an iterator yielding successive slot start times, each
    /// followed internally by `advance(slot_length)`. The iterator yields
    /// one final `Err(OutOfTime)` and then stops.
    pub fn iterslots(self, slot_length: Duration) -> MatchPeriodSlots {
        MatchPeriodSlots {
            clock: self,
            slot_length,
            exhausted: false,
        }
    }
}

pub struct MatchPeriodSlots {
    clock: MatchPeriodClock,
    slot_length: Duration,
    exhausted: bool,
}

impl MatchPeriodSlots {
    pub fn clock_mut(&mut self) -> &mut MatchPeriodClock {
        &mut self.clock
    }
}

impl Iterator for MatchPeriodSlots {
    type Item = Result<OffsetDateTime, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.clock.current_time() {
            Ok(time) => {
                self.clock.advance(self.slot_length);
                Some(Ok(time))
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}
