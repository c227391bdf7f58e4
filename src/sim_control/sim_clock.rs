use crate::util::{delta_secs, round_to};
use chrono::{DateTime, TimeDelta, Utc};

/// Elapsed simulation time for one observed sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedState {
    elapsed: TimeDelta,
    /// The observed instant lay before an earlier one and `elapsed` was clamped.
    clamped: bool,
}

impl ElapsedState {
    #[cfg(test)]
    pub fn elapsed(&self) -> TimeDelta { self.elapsed }
    pub fn elapsed_secs(&self) -> f64 { delta_secs(self.elapsed) }
    pub fn is_clamped(&self) -> bool { self.clamped }
}

/// Simulation time base, latched to the timestamp of the first valid sample.
///
/// Elapsed time is derived from sample timestamps only, never from iteration counts, and
/// never decreases: an instant before the start or before a previous observation is
/// clamped and flagged.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    t_local_start: f64,
    start: Option<DateTime<Utc>>,
    max_elapsed: TimeDelta,
}

impl SimulationClock {
    const SOLAR_TIME_DECIMALS: i32 = 2;
    const SECS_PER_HOUR: f64 = 3600.0;

    pub fn new(t_local_start: f64) -> Self {
        Self { t_local_start, start: None, max_elapsed: TimeDelta::zero() }
    }

    #[cfg(test)]
    pub fn start(&self) -> Option<DateTime<Utc>> { self.start }
    #[cfg(test)]
    pub fn is_started(&self) -> bool { self.start.is_some() }

    /// Derives the elapsed time at `now`, latching `now` as the start on the first call.
    pub fn observe(&mut self, now: DateTime<Utc>) -> ElapsedState {
        let Some(start) = self.start else {
            self.start = Some(now);
            return ElapsedState { elapsed: TimeDelta::zero(), clamped: false };
        };
        let raw = now - start;
        if raw < self.max_elapsed {
            return ElapsedState { elapsed: self.max_elapsed, clamped: true };
        }
        self.max_elapsed = raw;
        ElapsedState { elapsed: raw, clamped: false }
    }

    /// Local solar time in hours after `elapsed`, rounded to two decimals.
    pub fn local_solar_time(&self, elapsed: &ElapsedState) -> f64 {
        round_to(
            self.t_local_start + elapsed.elapsed_secs() / Self::SECS_PER_HOUR,
            Self::SOLAR_TIME_DECIMALS,
        )
    }
}
