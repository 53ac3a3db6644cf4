//! # Signal controller: lane arbitration state machine.
//!
//! [`SignalController`] owns the lane table and is the only thing that changes
//! a lane's phase or counters.
//!
//! ## Transition table (evaluated once per lane per tick, in index order)
//! ```text
//! GREEN  ── elapsed ≥ green  ──────────────────► YELLOW
//! YELLOW ── elapsed ≥ yellow ──────────────────► RED
//! RED    ── elapsed ≥ red ∧ no other lane GREEN ► GREEN   (drains queue)
//! RED    ── elapsed ≥ red ∧ another lane GREEN ─► RED     (timer kept, retried next tick)
//! ```
//!
//! With [`GatePolicy::GreenOrYellow`] a yellow lane also holds the gate, so the next
//! lane only gets green once every other lane is red.
//!
//! ## Invariants
//! - At most one lane is GREEN after every `tick` and every `force_green`.
//! - The all-red gate is checked **live**: a lane evaluated later in the same tick
//!   sees transitions made by lanes before it, so index order is a soft priority.
//! - A gated red lane keeps its `phase_started_at`; its elapsed time keeps growing
//!   until it is served.
//! - `force_green` bypasses timers: target GREEN, every other lane RED, all stamped `now`.
//!
//! ## Example
//! ```rust
//! use signalvisor::{Arrivals, Config, LaneSpec, Phase, SignalController};
//!
//! let mut ctl = SignalController::new(
//!     &Config::default(),
//!     [LaneSpec::new(0, 2), LaneSpec::new(1, 1)],
//! )?;
//!
//! let report = ctl.tick(2, &Arrivals::new());
//! assert_eq!(report.snapshot.green_lane(), Some(0));
//! assert_eq!(report.gated, vec![1]);
//!
//! ctl.force_green(1, 3)?;
//! assert_eq!(ctl.snapshot().green_lane(), Some(1));
//! assert_eq!(ctl.lane(0).map(|l| l.phase()), Some(Phase::Red));
//! # Ok::<(), signalvisor::ControllerError>(())
//! ```

use std::collections::HashMap;

use crate::error::ControllerError;

use super::{
    Arrivals, Config, GatePolicy, Lane, LaneId, LaneSpec, Override, Phase, Snapshot, TickReport,
    Time, Transition,
};

/// Arbitrates which lane may show green.
///
/// The controller is a deterministic function of its state and inputs: `now` is
/// always supplied by the caller and nothing blocks. Share it between tasks only
/// through a single critical section (see [`SignalService`](crate::SignalService)).
#[derive(Debug, Clone)]
pub struct SignalController {
    lanes: Vec<Lane>,
    index: HashMap<LaneId, usize>,
    gate: GatePolicy,

    // Index of the green lane; stands in for rescanning the table on every gate check.
    current_green: Option<usize>,
}

impl SignalController {
    /// Builds a controller with every lane RED since time 0.
    pub fn new<I>(config: &Config, lanes: I) -> Result<Self, ControllerError>
    where
        I: IntoIterator,
        I::Item: Into<LaneSpec>,
    {
        Self::starting_at(config, lanes, 0)
    }

    /// Builds a controller with every lane RED since `start`.
    pub fn starting_at<I>(config: &Config, lanes: I, start: Time) -> Result<Self, ControllerError>
    where
        I: IntoIterator,
        I::Item: Into<LaneSpec>,
    {
        let mut table = Vec::new();
        let mut index = HashMap::new();

        for spec in lanes {
            let spec: LaneSpec = spec.into();
            if index.insert(spec.id, table.len()).is_some() {
                return Err(ControllerError::DuplicateLane { lane: spec.id });
            }
            table.push(Lane::new(
                spec,
                config.green,
                config.yellow_clamped(),
                config.red_clamped(),
                start,
            ));
        }

        if table.is_empty() {
            return Err(ControllerError::NoLanes);
        }

        Ok(Self {
            lanes: table,
            index,
            gate: config.gate,
            current_green: None,
        })
    }

    /// Applies `arrivals`, then evaluates every lane against the transition table at `now`.
    ///
    /// Never fails: unmet conditions are simply no-ops, and arrivals for unknown
    /// lanes are listed in [`TickReport::ignored`].
    pub fn tick(&mut self, now: Time, arrivals: &Arrivals) -> TickReport {
        let mut applied = Vec::new();
        let mut ignored = Vec::new();

        for (id, n) in arrivals.iter() {
            match self.index.get(&id) {
                Some(&idx) => {
                    self.lanes[idx].record_arrivals(n);
                    applied.push((id, n));
                }
                None => ignored.push(id),
            }
        }

        let mut transitions = Vec::new();
        let mut gated = Vec::new();

        for idx in 0..self.lanes.len() {
            let lane = &self.lanes[idx];
            if lane.elapsed(now) < lane.threshold() {
                continue;
            }

            let next = match lane.phase() {
                Phase::Green => Phase::Yellow,
                Phase::Yellow => Phase::Red,
                Phase::Red if self.gate_open(idx) => Phase::Green,
                Phase::Red => {
                    gated.push(lane.id());
                    continue;
                }
            };
            transitions.push(self.switch(idx, next, now));
        }

        debug_assert!(self.green_count() <= 1, "mutual exclusion violated");

        TickReport {
            now,
            arrivals: applied,
            ignored,
            transitions,
            gated,
            snapshot: self.snapshot(),
        }
    }

    /// Emergency override: `lane` goes GREEN (draining its queue), every other lane RED.
    ///
    /// All lanes are stamped with `now`. On an unknown lane nothing is mutated.
    pub fn force_green(&mut self, lane: LaneId, now: Time) -> Result<Override, ControllerError> {
        let Some(&target) = self.index.get(&lane) else {
            return Err(ControllerError::InvalidLane {
                lane,
                lanes: self.lanes.len(),
            });
        };

        let mut preempted = Vec::new();
        for (idx, other) in self.lanes.iter_mut().enumerate() {
            if idx == target {
                continue;
            }
            let from = other.phase();
            other.enter_phase(Phase::Red, now);
            if from != Phase::Red {
                preempted.push(Transition {
                    lane: other.id(),
                    from,
                    to: Phase::Red,
                    drained: 0,
                });
            }
        }

        let from = self.lanes[target].phase();
        let drained = self.lanes[target].enter_phase(Phase::Green, now);
        self.current_green = Some(target);

        Ok(Override {
            lane,
            now,
            from,
            drained,
            preempted,
            snapshot: self.snapshot(),
        })
    }

    /// Read-only copy of the lane table.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.lanes)
    }

    /// Looks a lane up by id.
    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.index.get(&id).map(|&idx| &self.lanes[idx])
    }

    /// Lanes in arbitration order.
    #[inline]
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Lane ids in arbitration order.
    pub fn lane_ids(&self) -> Vec<LaneId> {
        self.lanes.iter().map(Lane::id).collect()
    }

    /// Id of the green lane, if any.
    pub fn green_lane(&self) -> Option<LaneId> {
        self.current_green.map(|idx| self.lanes[idx].id())
    }

    /// True when no lane other than `idx` holds the all-red gate.
    fn gate_open(&self, idx: usize) -> bool {
        if !self.current_green.is_none_or(|g| g == idx) {
            return false;
        }
        match self.gate {
            GatePolicy::Green => true,
            GatePolicy::GreenOrYellow => !self
                .lanes
                .iter()
                .enumerate()
                .any(|(i, l)| i != idx && l.phase() == Phase::Yellow),
        }
    }

    fn switch(&mut self, idx: usize, to: Phase, now: Time) -> Transition {
        let lane = &mut self.lanes[idx];
        let from = lane.phase();
        let drained = lane.enter_phase(to, now);

        if to == Phase::Green {
            self.current_green = Some(idx);
        } else if from == Phase::Green {
            self.current_green = None;
        }

        Transition {
            lane: lane.id(),
            from,
            to,
            drained,
        }
    }

    fn green_count(&self) -> usize {
        self.lanes
            .iter()
            .filter(|l| l.phase() == Phase::Green)
            .count()
    }
}
