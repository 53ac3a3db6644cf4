//! # Arrival sources for the simulation driver.
//!
//! - [`RandomArrivals`] draws `0..=max_per_tick` vehicles per lane per cycle
//! - [`FixedArrivals`] replays a scripted sequence, one entry per cycle

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::{Arrivals, LaneId};

/// Produces the vehicles that join each lane before a tick.
pub trait ArrivalSource: Send + 'static {
    /// Arrivals for `cycle`, over the lanes of the controller (in arbitration order).
    fn arrivals(&mut self, cycle: u64, lanes: &[LaneId]) -> Arrivals;
}

/// Independent uniform arrivals per lane.
pub struct RandomArrivals {
    max_per_tick: u64,
    rng: StdRng,
}

impl RandomArrivals {
    /// Seeds from the OS; each lane receives `0..=max_per_tick` vehicles per cycle.
    pub fn new(max_per_tick: u64) -> Self {
        Self {
            max_per_tick,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic variant for reproducible runs.
    pub fn seeded(max_per_tick: u64, seed: u64) -> Self {
        Self {
            max_per_tick,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn max_per_tick(&self) -> u64 {
        self.max_per_tick
    }
}

impl Default for RandomArrivals {
    /// At most one vehicle per lane per cycle.
    fn default() -> Self {
        Self::new(1)
    }
}

impl ArrivalSource for RandomArrivals {
    fn arrivals(&mut self, _cycle: u64, lanes: &[LaneId]) -> Arrivals {
        lanes
            .iter()
            .map(|&lane| (lane, self.rng.random_range(0..=self.max_per_tick)))
            .filter(|&(_, n)| n > 0)
            .collect()
    }
}

/// Scripted arrivals; once the script runs out every cycle is empty.
#[derive(Default)]
pub struct FixedArrivals {
    script: VecDeque<Arrivals>,
}

impl FixedArrivals {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Arrivals>,
    {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Cycles left in the script.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ArrivalSource for FixedArrivals {
    fn arrivals(&mut self, _cycle: u64, _lanes: &[LaneId]) -> Arrivals {
        self.script.pop_front().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_arrivals_stay_in_range() {
        let mut src = RandomArrivals::seeded(3, 7);
        let lanes = [0, 1, 2];
        for cycle in 0..200 {
            let a = src.arrivals(cycle, &lanes);
            for (lane, n) in a.iter() {
                assert!(lanes.contains(&lane));
                assert!((1..=3).contains(&n));
            }
        }
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let lanes = [4, 5];
        let mut a = RandomArrivals::seeded(1, 42);
        let mut b = RandomArrivals::seeded(1, 42);
        for cycle in 0..50 {
            assert_eq!(a.arrivals(cycle, &lanes), b.arrivals(cycle, &lanes));
        }
    }

    #[test]
    fn test_zero_max_never_arrives() {
        let mut src = RandomArrivals::seeded(0, 1);
        assert!(src.arrivals(0, &[0, 1]).is_empty());
    }

    #[test]
    fn test_fixed_arrivals_replay_then_empty() {
        let mut src = FixedArrivals::new([Arrivals::new().with(0, 2), Arrivals::new().with(1, 1)]);
        assert_eq!(src.remaining(), 2);
        assert_eq!(src.arrivals(0, &[0, 1]).get(0), 2);
        assert_eq!(src.arrivals(1, &[0, 1]).get(1), 1);
        assert!(src.arrivals(2, &[0, 1]).is_empty());
    }
}
