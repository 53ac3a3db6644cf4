//! # Events emitted by the signal service.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Signal events**: arrivals, phase changes, drains, gating, overrides, tick completion
//! - **Subscriber events**: overflow and panic isolation reports
//! - **Service events**: loop termination
//!
//! The [`Event`] struct carries additional metadata such as the logical time,
//! lane id, phases, vehicle counts and, for [`EventKind::TickCompleted`], the
//! post-tick [`Snapshot`].
//!
//! ## Ordering guarantees
//! Events are built unsequenced (`seq == 0`); the [`Bus`](crate::Bus) stamps them
//! with gap-free, increasing sequence numbers when they are published.
//! Events belonging to one tick are published in evaluation order:
//! arrivals → transitions (lane-index order) → gated lanes → `TickCompleted`.
//!
//! ## Example
//! ```rust
//! use signalvisor::{Event, EventKind, Phase};
//!
//! let ev = Event::new(EventKind::PhaseChanged)
//!     .with_lane(1)
//!     .with_now(6)
//!     .with_phases(Phase::Green, Phase::Yellow);
//!
//! assert_eq!(ev.kind, EventKind::PhaseChanged);
//! assert_eq!(ev.lane, Some(1));
//! assert_eq!(ev.to, Some(Phase::Yellow));
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use crate::core::{LaneId, Override, Phase, Snapshot, TickReport, Time};
use crate::error::ControllerError;

/// Classification of service events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Signal events ===
    /// Vehicles were added to a lane's queue before evaluation.
    ///
    /// Sets:
    /// - `lane`: lane id
    /// - `count`: vehicles added
    /// - `now`, `cycle`
    ArrivalsRecorded,

    /// A lane changed phase during a tick or an override.
    ///
    /// Sets:
    /// - `lane`: lane id
    /// - `from`/`to`: phases
    /// - `now`, `cycle` (cycle only for ticks)
    PhaseChanged,

    /// A lane entered green and its queue was served.
    ///
    /// Sets:
    /// - `lane`: lane id
    /// - `count`: vehicles drained
    /// - `now`
    LaneDrained,

    /// A red lane's timer expired but another lane held the all-red gate.
    ///
    /// Sets:
    /// - `lane`: lane id
    /// - `now`, `cycle`
    GreenGated,

    /// Emergency override accepted.
    ///
    /// Sets:
    /// - `lane`: forced lane
    /// - `from`/`to`: previous phase of the forced lane, `Green`
    /// - `count`: vehicles drained
    /// - `now`
    OverrideApplied,

    /// Emergency override refused (unknown lane); nothing changed.
    ///
    /// Sets:
    /// - `lane`: requested lane
    /// - `reason`: error message
    /// - `now`
    OverrideRejected,

    /// A tick finished; carries the post-tick lane table.
    ///
    /// Sets:
    /// - `now`, `cycle`
    /// - `count`: vehicles drained during the tick
    /// - `snapshot`
    TickCompleted,

    // === Subscriber events ===
    /// Subscriber dropped a batch (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `count`: events in the dropped batch
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    // === Service events ===
    /// The service loop has exited.
    ///
    /// Sets:
    /// - `cycle`: number of ticks processed
    ServiceStopped,
}

/// Service event with optional metadata.
///
/// - `seq`: position in the service run (0 until published)
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Sequence number assigned by the bus; 0 for an unpublished event.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Logical controller time the event refers to.
    pub now: Option<Time>,
    /// Tick number (0-based) within the service run.
    pub cycle: Option<u64>,
    /// Lane the event is about.
    pub lane: Option<LaneId>,
    /// Previous phase.
    pub from: Option<Phase>,
    /// New phase.
    pub to: Option<Phase>,
    /// Vehicle count (arrived or drained, depending on the kind).
    pub count: Option<u64>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Emitting component, for subscriber events.
    pub source: Option<Arc<str>>,
    /// Post-tick lane table (only for `TickCompleted`).
    pub snapshot: Option<Arc<Snapshot>>,
}

impl Event {
    /// Creates an unpublished event of the given kind stamped with the current wall-clock time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            kind,
            now: None,
            cycle: None,
            lane: None,
            from: None,
            to: None,
            count: None,
            reason: None,
            source: None,
            snapshot: None,
        }
    }

    #[inline]
    pub fn with_now(mut self, now: Time) -> Self {
        self.now = Some(now);
        self
    }

    #[inline]
    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }

    #[inline]
    pub fn with_lane(mut self, lane: LaneId) -> Self {
        self.lane = Some(lane);
        self
    }

    /// Attaches a `from → to` phase pair.
    #[inline]
    pub fn with_phases(mut self, from: Phase, to: Phase) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    #[inline]
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[inline]
    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(Arc::new(snapshot));
        self
    }

    /// Translates a tick report into events, in publication order.
    pub fn from_tick(cycle: u64, report: &TickReport) -> Vec<Event> {
        let now = report.now;
        let mut out = Vec::with_capacity(
            report.arrivals.len() + report.transitions.len() * 2 + report.gated.len() + 1,
        );

        for &(lane, n) in report.arrivals.iter().filter(|(_, n)| *n > 0) {
            out.push(
                Event::new(EventKind::ArrivalsRecorded)
                    .with_now(now)
                    .with_cycle(cycle)
                    .with_lane(lane)
                    .with_count(n),
            );
        }

        for t in &report.transitions {
            out.push(
                Event::new(EventKind::PhaseChanged)
                    .with_now(now)
                    .with_cycle(cycle)
                    .with_lane(t.lane)
                    .with_phases(t.from, t.to),
            );
            if t.to == Phase::Green {
                out.push(
                    Event::new(EventKind::LaneDrained)
                        .with_now(now)
                        .with_cycle(cycle)
                        .with_lane(t.lane)
                        .with_count(t.drained),
                );
            }
        }

        for &lane in &report.gated {
            out.push(
                Event::new(EventKind::GreenGated)
                    .with_now(now)
                    .with_cycle(cycle)
                    .with_lane(lane),
            );
        }

        out.push(
            Event::new(EventKind::TickCompleted)
                .with_now(now)
                .with_cycle(cycle)
                .with_count(report.drained())
                .with_snapshot(report.snapshot.clone()),
        );
        out
    }

    /// Translates an accepted override into events, in publication order.
    pub fn from_override(ov: &Override) -> Vec<Event> {
        let mut out = Vec::with_capacity(ov.preempted.len() + 3);

        for t in &ov.preempted {
            out.push(
                Event::new(EventKind::PhaseChanged)
                    .with_now(ov.now)
                    .with_lane(t.lane)
                    .with_phases(t.from, t.to),
            );
        }
        out.push(
            Event::new(EventKind::OverrideApplied)
                .with_now(ov.now)
                .with_lane(ov.lane)
                .with_phases(ov.from, Phase::Green)
                .with_count(ov.drained),
        );
        out.push(
            Event::new(EventKind::LaneDrained)
                .with_now(ov.now)
                .with_lane(ov.lane)
                .with_count(ov.drained),
        );
        out
    }

    /// Creates an override rejection event.
    pub fn override_rejected(lane: LaneId, now: Time, err: &ControllerError) -> Self {
        Event::new(EventKind::OverrideRejected)
            .with_now(now)
            .with_lane(lane)
            .with_reason(err.as_message())
    }

    /// Creates a subscriber overflow event for a dropped batch of `dropped` events.
    #[inline]
    pub fn subscriber_overflow(
        subscriber: &'static str,
        dropped: usize,
        reason: &'static str,
    ) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_count(dropped as u64)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
