//! # Read-only views of the lane table.
//!
//! [`Snapshot`] is what renderers and loggers consume: a copy of every lane's
//! observable state in arbitration order. It never aliases controller storage.

use super::{Lane, LaneId, Phase, Time};

/// Observable state of one lane at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneSnapshot {
    pub id: LaneId,
    pub phase: Phase,
    pub queue_len: u64,
    pub processed_total: u64,
    pub green: Time,
    pub yellow: Time,
    pub red: Time,
    pub phase_started_at: Time,
}

impl From<&Lane> for LaneSnapshot {
    fn from(lane: &Lane) -> Self {
        Self {
            id: lane.id(),
            phase: lane.phase(),
            queue_len: lane.queue_len(),
            processed_total: lane.processed_total(),
            green: lane.green(),
            yellow: lane.yellow(),
            red: lane.red(),
            phase_started_at: lane.phase_started_at(),
        }
    }
}

/// Ordered copy of the lane table (index order = arbitration order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    lanes: Vec<LaneSnapshot>,
}

impl Snapshot {
    pub(crate) fn capture(lanes: &[Lane]) -> Self {
        Self {
            lanes: lanes.iter().map(LaneSnapshot::from).collect(),
        }
    }

    /// All lanes, in arbitration order.
    #[inline]
    pub fn lanes(&self) -> &[LaneSnapshot] {
        &self.lanes
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, LaneSnapshot> {
        self.lanes.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Looks a lane up by id.
    pub fn get(&self, id: LaneId) -> Option<&LaneSnapshot> {
        self.lanes.iter().find(|l| l.id == id)
    }

    /// Id of the lane currently showing green, if any.
    pub fn green_lane(&self) -> Option<LaneId> {
        self.lanes
            .iter()
            .find(|l| l.phase == Phase::Green)
            .map(|l| l.id)
    }

    /// Number of lanes showing green (0 or 1 for any controller-produced snapshot).
    pub fn green_count(&self) -> usize {
        self.lanes.iter().filter(|l| l.phase == Phase::Green).count()
    }

    /// Vehicles waiting across all lanes.
    pub fn total_waiting(&self) -> u64 {
        self.lanes.iter().map(|l| l.queue_len).sum()
    }

    /// Vehicles served across all lanes.
    pub fn total_processed(&self) -> u64 {
        self.lanes.iter().map(|l| l.processed_total).sum()
    }

    /// Lane ids in arbitration order.
    pub fn lane_ids(&self) -> Vec<LaneId> {
        self.lanes.iter().map(|l| l.id).collect()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a LaneSnapshot;
    type IntoIter = std::slice::Iter<'a, LaneSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.lanes.iter()
    }
}
