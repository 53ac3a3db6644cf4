//! # Outcomes of controller operations.
//!
//! Every mutating call on [`SignalController`](crate::SignalController) returns a
//! report describing exactly what changed, in the order it happened. The service
//! turns these into [`Event`](crate::Event)s; direct callers can inspect them.

use super::{LaneId, Phase, Snapshot, Time};

/// One phase change of one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub lane: LaneId,
    pub from: Phase,
    pub to: Phase,
    /// Vehicles drained by this transition (non-zero only when entering green).
    pub drained: u64,
}

/// Result of [`SignalController::tick`](crate::SignalController::tick).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Logical time the tick was evaluated at.
    pub now: Time,
    /// Arrivals applied to known lanes, in lane order.
    pub arrivals: Vec<(LaneId, u64)>,
    /// Arrival entries naming lanes this controller does not own.
    pub ignored: Vec<LaneId>,
    /// Phase changes, in evaluation (lane-index) order.
    pub transitions: Vec<Transition>,
    /// Red lanes whose timer expired but were held by the all-red gate.
    pub gated: Vec<LaneId>,
    /// Lane table after the tick.
    pub snapshot: Snapshot,
}

impl TickReport {
    /// True if no lane changed phase.
    #[inline]
    pub fn is_quiet(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Vehicles drained during this tick.
    pub fn drained(&self) -> u64 {
        self.transitions.iter().map(|t| t.drained).sum()
    }
}

/// Result of a successful [`SignalController::force_green`](crate::SignalController::force_green).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    /// Lane forced to green.
    pub lane: LaneId,
    /// Logical time every lane was stamped with.
    pub now: Time,
    /// Phase the target lane was in before the override.
    pub from: Phase,
    /// Vehicles drained from the target lane.
    pub drained: u64,
    /// Other lanes that were green or yellow and got cut to red.
    pub preempted: Vec<Transition>,
    /// Lane table after the override.
    pub snapshot: Snapshot,
}
