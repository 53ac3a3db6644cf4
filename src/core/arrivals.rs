use std::collections::BTreeMap;

use super::LaneId;

/// Vehicles arriving per lane before a tick.
///
/// Lanes without an entry receive no arrivals. Repeated entries for the same
/// lane accumulate.
///
/// ## Example
/// ```rust
/// use signalvisor::Arrivals;
///
/// let arrivals = Arrivals::new().with(0, 1).with(1, 2).with(0, 1);
/// assert_eq!(arrivals.get(0), 2);
/// assert_eq!(arrivals.get(7), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arrivals {
    counts: BTreeMap<LaneId, u64>,
}

impl Arrivals {
    /// No arrivals on any lane.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` vehicles for `lane` (builder style).
    #[must_use]
    pub fn with(mut self, lane: LaneId, n: u64) -> Self {
        self.add(lane, n);
        self
    }

    /// Adds `n` vehicles for `lane`.
    pub fn add(&mut self, lane: LaneId, n: u64) {
        let slot = self.counts.entry(lane).or_insert(0);
        *slot = slot.saturating_add(n);
    }

    /// Vehicles recorded for `lane` (0 if none).
    pub fn get(&self, lane: LaneId) -> u64 {
        self.counts.get(&lane).copied().unwrap_or(0)
    }

    /// `(lane, count)` pairs in ascending lane order.
    pub fn iter(&self) -> impl Iterator<Item = (LaneId, u64)> + '_ {
        self.counts.iter().map(|(lane, n)| (*lane, *n))
    }

    /// Total vehicles across all lanes.
    pub fn total(&self) -> u64 {
        self.counts.values().fold(0u64, |acc, n| acc.saturating_add(*n))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(LaneId, u64)> for Arrivals {
    fn from_iter<I: IntoIterator<Item = (LaneId, u64)>>(iter: I) -> Self {
        let mut arrivals = Arrivals::new();
        for (lane, n) in iter {
            arrivals.add(lane, n);
        }
        arrivals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_accumulates_duplicates() {
        let arrivals: Arrivals = [(1, 2), (0, 1), (1, 3)].into_iter().collect();
        assert_eq!(arrivals.iter().collect::<Vec<_>>(), vec![(0, 1), (1, 5)]);
        assert_eq!(arrivals.total(), 6);
    }

    #[test]
    fn test_add_saturates() {
        let mut arrivals = Arrivals::new().with(0, u64::MAX);
        arrivals.add(0, 5);
        assert_eq!(arrivals.get(0), u64::MAX);
    }
}
