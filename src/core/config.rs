//! # Global controller configuration.
//!
//! Provides [`Config`] centralized settings for the arbitration core and the
//! async service wrapping it.
//!
//! Config is used in two ways:
//! 1. **Controller creation**: `SignalController::new(&config, lanes)`
//! 2. **Service creation**: `SignalService::builder(config)`
//!
//! ## Clamping
//! - `yellow`/`red` durations are clamped to at least 1 time unit
//! - `bus_capacity`/`command_capacity` are clamped to at least 1

use super::Time;

/// Green-time sizing rule: `clamp(base + queue_len, min, max)`.
///
/// The duration grows with the waiting queue so a busy lane gets a longer
/// service window, but never beyond `max` so other approaches are not starved.
///
/// ## Example
/// ```rust
/// use signalvisor::GreenPolicy;
///
/// let policy = GreenPolicy::default();
/// assert_eq!(policy.duration(0), 2);
/// assert_eq!(policy.duration(2), 4);
/// assert_eq!(policy.duration(40), 5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GreenPolicy {
    /// Time units granted on top of the queue length.
    pub base: Time,
    /// Lower bound of the green window.
    pub min: Time,
    /// Upper bound of the green window.
    pub max: Time,
}

impl Default for GreenPolicy {
    /// `base = 2`, `min = 2`, `max = 5`.
    fn default() -> Self {
        Self {
            base: 2,
            min: 2,
            max: 5,
        }
    }
}

impl GreenPolicy {
    /// Computes the green duration for a lane with `queue_len` waiting vehicles.
    ///
    /// Evaluated as `max(min, min(max, base + queue_len))`, never below 1.
    #[inline]
    pub fn duration(&self, queue_len: u64) -> Time {
        self.base
            .saturating_add(queue_len)
            .min(self.max)
            .max(self.min)
            .max(1)
    }
}

/// Which phases of *other* lanes keep a red lane from going green.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GatePolicy {
    /// Only a green lane holds the gate; the next lane may start while another clears on yellow.
    #[default]
    Green,

    /// Green and yellow lanes hold the gate; the next lane starts only once all others are red.
    GreenOrYellow,
}

/// Global configuration for the controller and service.
///
/// ## Field semantics
/// - `green`: dynamic green-time rule (see [`GreenPolicy`])
/// - `yellow`: fixed yellow duration for every lane
/// - `red`: minimum red duration before a lane may be considered for green
/// - `gate`: which phases of other lanes block a red lane from going green
/// - `bus_capacity`: event bus ring buffer size
/// - `command_capacity`: service command queue size
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling clamping checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Green-time sizing rule applied whenever a non-green lane's queue changes.
    pub green: GreenPolicy,

    /// Yellow duration in time units (not affected by traffic).
    pub yellow: Time,

    /// Red duration in time units (not affected by traffic).
    pub red: Time,

    /// All-red gate rule used during arbitration.
    pub gate: GatePolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Capacity of the service command queue.
    ///
    /// When full, async handle calls wait and `try_*` calls return `ServiceError::Full`.
    pub command_capacity: usize,
}

impl Config {
    /// Returns the yellow duration clamped to a minimum of 1.
    #[inline]
    pub fn yellow_clamped(&self) -> Time {
        self.yellow.max(1)
    }

    /// Returns the red duration clamped to a minimum of 1.
    #[inline]
    pub fn red_clamped(&self) -> Time {
        self.red.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a command queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn command_capacity_clamped(&self) -> usize {
        self.command_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `green = GreenPolicy::default()` (`clamp(2 + queue, 2, 5)`)
    /// - `yellow = 2`
    /// - `red = 2`
    /// - `gate = GatePolicy::Green`
    /// - `bus_capacity = 1024`
    /// - `command_capacity = 64`
    fn default() -> Self {
        Self {
            green: GreenPolicy::default(),
            yellow: 2,
            red: 2,
            gate: GatePolicy::default(),
            bus_capacity: 1024,
            command_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_green_duration_clamps_both_ends() {
        let policy = GreenPolicy::default();
        for queue in 0..20u64 {
            let expected = (2 + queue).clamp(2, 5);
            assert_eq!(policy.duration(queue), expected, "queue={queue}");
        }
    }

    #[test]
    fn test_green_duration_saturates() {
        let policy = GreenPolicy {
            base: Time::MAX,
            min: 1,
            max: Time::MAX,
        };
        assert_eq!(policy.duration(u64::MAX), Time::MAX);
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        let policy = GreenPolicy {
            base: 0,
            min: 6,
            max: 3,
        };
        assert_eq!(policy.duration(1), 6);
    }

    #[test]
    fn test_zero_durations_clamped() {
        let cfg = Config {
            yellow: 0,
            red: 0,
            bus_capacity: 0,
            command_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.yellow_clamped(), 1);
        assert_eq!(cfg.red_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.command_capacity_clamped(), 1);
    }
}
