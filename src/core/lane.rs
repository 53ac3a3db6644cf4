//! # Lane model: one approach to the intersection.
//!
//! A [`Lane`] tracks its waiting queue, the vehicles it has served so far, its
//! per-phase durations and the phase it currently shows.
//!
//! ## Rules
//! - While a lane is not green, `green` always equals the policy applied to its queue:
//!   it is recomputed on every arrival and on every switch to yellow or red.
//! - An active service window never changes mid-service.
//! - `yellow` and `red` are fixed at construction.
//! - Entering [`Phase::Green`] drains the whole queue into `processed_total`.
//! - The lane does not validate transitions; legality belongs to the controller.

use std::fmt;

use super::{GreenPolicy, LaneId, Time};

/// Signal phase shown by a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Stop; the lane waits for its red timer and the all-red gate.
    Red,
    /// Clearing interval between green and red.
    Yellow,
    /// The lane is being served.
    Green,
}

impl Phase {
    /// Returns the upper-case name used in reports (`"RED"`, `"YELLOW"`, `"GREEN"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Red => "RED",
            Phase::Yellow => "YELLOW",
            Phase::Green => "GREEN",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` keeps width/alignment flags working for table output.
        f.pad(self.as_str())
    }
}

/// Initial description of a lane handed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneSpec {
    /// Stable lane id, unique within a controller.
    pub id: LaneId,
    /// Vehicles already waiting when the controller starts.
    pub initial_queue: u64,
}

impl LaneSpec {
    /// Creates a lane spec.
    #[inline]
    pub fn new(id: LaneId, initial_queue: u64) -> Self {
        Self { id, initial_queue }
    }
}

impl From<(LaneId, u64)> for LaneSpec {
    fn from((id, initial_queue): (LaneId, u64)) -> Self {
        Self::new(id, initial_queue)
    }
}

/// One approach to the intersection.
///
/// Lanes are created and mutated only by [`SignalController`](crate::SignalController);
/// callers observe them through getters or a [`Snapshot`](crate::Snapshot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    id: LaneId,
    queue_len: u64,
    processed_total: u64,
    green: Time,
    yellow: Time,
    red: Time,
    phase: Phase,
    phase_started_at: Time,
    policy: GreenPolicy,
}

impl Lane {
    /// Creates a red lane whose phase started at `now`.
    pub(crate) fn new(
        spec: LaneSpec,
        policy: GreenPolicy,
        yellow: Time,
        red: Time,
        now: Time,
    ) -> Self {
        Self {
            id: spec.id,
            queue_len: spec.initial_queue,
            processed_total: 0,
            green: policy.duration(spec.initial_queue),
            yellow,
            red,
            phase: Phase::Red,
            phase_started_at: now,
            policy,
        }
    }

    /// Adds `n` waiting vehicles.
    ///
    /// Resizes the green window unless the lane is currently green.
    pub(crate) fn record_arrivals(&mut self, n: u64) {
        self.queue_len = self.queue_len.saturating_add(n);
        if self.phase != Phase::Green {
            self.green = self.policy.duration(self.queue_len);
        }
    }

    /// Switches to `phase` at `now`; returns how many vehicles were drained.
    ///
    /// Entering green moves the whole queue into `processed_total`. Leaving it
    /// resizes the next window from what is still waiting.
    pub(crate) fn enter_phase(&mut self, phase: Phase, now: Time) -> u64 {
        self.phase = phase;
        self.phase_started_at = now;

        if phase != Phase::Green {
            self.green = self.policy.duration(self.queue_len);
            return 0;
        }
        let drained = self.queue_len;
        self.processed_total = self.processed_total.saturating_add(drained);
        self.queue_len = 0;
        drained
    }

    /// Time units spent in the current phase (0 if `now` precedes the phase start).
    #[inline]
    pub fn elapsed(&self, now: Time) -> Time {
        now.saturating_sub(self.phase_started_at)
    }

    /// Duration the current phase must last before it may change.
    #[inline]
    pub fn threshold(&self) -> Time {
        match self.phase {
            Phase::Green => self.green,
            Phase::Yellow => self.yellow,
            Phase::Red => self.red,
        }
    }

    #[inline]
    pub fn id(&self) -> LaneId {
        self.id
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn queue_len(&self) -> u64 {
        self.queue_len
    }

    #[inline]
    pub fn processed_total(&self) -> u64 {
        self.processed_total
    }

    #[inline]
    pub fn green(&self) -> Time {
        self.green
    }

    #[inline]
    pub fn yellow(&self) -> Time {
        self.yellow
    }

    #[inline]
    pub fn red(&self) -> Time {
        self.red
    }

    #[inline]
    pub fn phase_started_at(&self) -> Time {
        self.phase_started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(queue: u64) -> Lane {
        Lane::new(LaneSpec::new(0, queue), GreenPolicy::default(), 2, 2, 0)
    }

    #[test]
    fn test_new_lane_is_red_with_clamped_green() {
        let l = lane(2);
        assert_eq!(l.phase(), Phase::Red);
        assert_eq!(l.green(), 4);
        assert_eq!(l.yellow(), 2);
        assert_eq!(l.red(), 2);
        assert_eq!(l.processed_total(), 0);
        assert_eq!(l.phase_started_at(), 0);
    }

    #[test]
    fn test_arrivals_resize_green_while_not_green() {
        let mut l = lane(0);
        assert_eq!(l.green(), 2);

        l.record_arrivals(1);
        assert_eq!((l.queue_len(), l.green()), (1, 3));

        l.record_arrivals(10);
        assert_eq!((l.queue_len(), l.green()), (11, 5));
        assert_eq!(l.phase(), Phase::Red);

        l.enter_phase(Phase::Yellow, 3);
        l.record_arrivals(0);
        assert_eq!(l.green(), 5);
    }

    #[test]
    fn test_arrivals_do_not_resize_active_green() {
        let mut l = lane(0);
        l.enter_phase(Phase::Green, 4);
        assert_eq!(l.green(), 2);

        l.record_arrivals(3);
        assert_eq!(l.queue_len(), 3);
        assert_eq!(l.green(), 2);
    }

    #[test]
    fn test_enter_green_drains_queue() {
        let mut l = lane(3);
        let drained = l.enter_phase(Phase::Green, 5);
        assert_eq!(drained, 3);
        assert_eq!(l.queue_len(), 0);
        assert_eq!(l.processed_total(), 3);
        assert_eq!(l.phase_started_at(), 5);

        l.record_arrivals(2);
        l.enter_phase(Phase::Yellow, 7);
        assert_eq!(l.enter_phase(Phase::Red, 9), 0);
        assert_eq!(l.queue_len(), 2);
        assert_eq!(l.processed_total(), 3);
    }

    #[test]
    fn test_leaving_green_resizes_window_from_remaining_queue() {
        let mut l = lane(2);
        assert_eq!(l.green(), 4);

        l.enter_phase(Phase::Green, 2);
        assert_eq!(l.green(), 4);

        l.enter_phase(Phase::Yellow, 6);
        assert_eq!((l.queue_len(), l.green()), (0, 2));

        l.record_arrivals(1);
        l.enter_phase(Phase::Red, 8);
        assert_eq!((l.queue_len(), l.green()), (1, 3));
    }

    #[test]
    fn test_elapsed_is_pure_and_saturating() {
        let mut l = lane(0);
        l.enter_phase(Phase::Yellow, 10);
        assert_eq!(l.elapsed(13), 3);
        assert_eq!(l.elapsed(13), 3);
        assert_eq!(l.elapsed(4), 0);
        assert_eq!(l.phase_started_at(), 10);
    }

    #[test]
    fn test_threshold_follows_phase() {
        let mut l = lane(1);
        assert_eq!(l.threshold(), 2);
        l.enter_phase(Phase::Green, 0);
        assert_eq!(l.threshold(), 3);
    }

    #[test]
    fn test_phase_display_pads() {
        assert_eq!(format!("{:<6}|", Phase::Red), "RED   |");
        assert_eq!(Phase::Yellow.to_string(), "YELLOW");
    }
}
