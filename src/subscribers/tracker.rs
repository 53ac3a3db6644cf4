//! # Lane state tracker with sequence-based ordering.
//!
//! Maintains the last known phase of every lane and the latest cycle snapshot,
//! using event sequence numbers to reject out-of-order delivery.
//!
//! ## Architecture
//! ```text
//! service loop ──► Bus ──► SubscriberSet ──► LaneTracker::update()
//!                                                   │
//!                                                   ▼
//!                                     HashMap<LaneId, LaneState>
//!                                      (lane → {seq, phase, served})
//! ```
//!
//! ## Rules
//! - `PhaseChanged` / `OverrideApplied` change a lane's phase
//! - `LaneDrained` adds to a lane's served count
//! - `TickCompleted` replaces the latest snapshot
//! - Events with `seq <= last_seq` for the same lane are **rejected** (stale)
//! - Unsequenced events (`seq == 0`, never published) are applied as they come

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::{LaneId, Phase, Snapshot};
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Per-lane state for ordering validation.
#[derive(Debug, Clone, Copy)]
struct LaneState {
    last_seq: u64,
    phase: Phase,
    served: u64,
}

#[derive(Default)]
struct TrackerState {
    lanes: HashMap<LaneId, LaneState>,
    latest: Option<(u64, Arc<Snapshot>)>,
}

/// Thread-safe tracker of lane phases for renderers.
///
/// Reads are **eventually consistent** with the controller: they reflect every
/// event the tracker's worker has processed so far.
#[derive(Default)]
pub struct LaneTracker {
    state: RwLock<TrackerState>,
}

impl LaneTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an event if it is newer than the last one seen for its lane.
    ///
    /// Returns `true` if tracked state changed.
    pub async fn update(&self, ev: &Event) -> bool {
        let mut state = self.state.write().await;

        if ev.kind == EventKind::TickCompleted {
            let Some(snapshot) = ev.snapshot.as_ref() else {
                return false;
            };
            if state
                .latest
                .as_ref()
                .is_some_and(|(seq, _)| *seq != 0 && ev.seq <= *seq)
            {
                return false;
            }
            state.latest = Some((ev.seq, Arc::clone(snapshot)));
            return true;
        }

        let Some(lane) = ev.lane else { return false };
        let entry = state.lanes.entry(lane).or_insert(LaneState {
            last_seq: 0,
            phase: Phase::Red,
            served: 0,
        });

        if entry.last_seq != 0 && ev.seq <= entry.last_seq {
            return false;
        }

        match (ev.kind, ev.to) {
            (EventKind::PhaseChanged | EventKind::OverrideApplied, Some(to)) => {
                entry.last_seq = ev.seq;
                entry.phase = to;
                true
            }
            (EventKind::LaneDrained, _) => {
                entry.last_seq = ev.seq;
                entry.served = entry.served.saturating_add(ev.count.unwrap_or(0));
                true
            }
            _ => {
                entry.last_seq = ev.seq;
                false
            }
        }
    }

    /// Last known phase of `lane` (`None` if no event mentioned it yet).
    pub async fn phase(&self, lane: LaneId) -> Option<Phase> {
        self.state.read().await.lanes.get(&lane).map(|s| s.phase)
    }

    /// Vehicles drained on `lane` according to observed events.
    pub async fn served(&self, lane: LaneId) -> u64 {
        self.state
            .read()
            .await
            .lanes
            .get(&lane)
            .map(|s| s.served)
            .unwrap_or(0)
    }

    /// Lanes currently believed green, sorted.
    pub async fn green_lanes(&self) -> Vec<LaneId> {
        let state = self.state.read().await;
        let mut green: Vec<LaneId> = state
            .lanes
            .iter()
            .filter(|(_, s)| s.phase == Phase::Green)
            .map(|(id, _)| *id)
            .collect();
        green.sort_unstable();
        green
    }

    /// Snapshot carried by the most recent `TickCompleted`.
    pub async fn latest(&self) -> Option<Arc<Snapshot>> {
        self.state
            .read()
            .await
            .latest
            .as_ref()
            .map(|(_, s)| Arc::clone(s))
    }
}

#[async_trait]
impl Subscribe for LaneTracker {
    async fn on_event(&self, ev: &Event) {
        self.update(ev).await;
    }

    fn name(&self) -> &'static str {
        "lane_tracker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Bus;

    #[tokio::test]
    async fn test_stale_events_are_rejected() {
        let bus = Bus::new(4);
        let batch = bus.publish_batch(vec![
            Event::new(EventKind::PhaseChanged)
                .with_lane(0)
                .with_phases(Phase::Red, Phase::Green),
            Event::new(EventKind::PhaseChanged)
                .with_lane(0)
                .with_phases(Phase::Green, Phase::Yellow),
        ]);
        let tracker = LaneTracker::new();

        assert!(tracker.update(&batch[1]).await);
        assert!(!tracker.update(&batch[0]).await);
        assert_eq!(tracker.phase(0).await, Some(Phase::Yellow));
        assert!(tracker.green_lanes().await.is_empty());
    }

    #[tokio::test]
    async fn test_drains_accumulate() {
        let tracker = LaneTracker::new();
        tracker
            .update(&Event::new(EventKind::LaneDrained).with_lane(2).with_count(3))
            .await;
        tracker
            .update(&Event::new(EventKind::LaneDrained).with_lane(2).with_count(4))
            .await;
        assert_eq!(tracker.served(2).await, 7);
        assert_eq!(tracker.served(9).await, 0);
    }

    #[tokio::test]
    async fn test_latest_snapshot_only_moves_forward() {
        let bus = Bus::new(4);
        let tick = || Event::new(EventKind::TickCompleted).with_snapshot(Snapshot::default());
        let first = bus.publish(tick());
        let second = bus.publish(tick());
        let tracker = LaneTracker::new();

        assert!(tracker.update(&second[0]).await);
        assert!(!tracker.update(&first[0]).await);
        let latest_seq = tracker.state.read().await.latest.as_ref().map(|(seq, _)| *seq);
        assert_eq!(latest_seq, Some(2));
    }
}
