//! # signalvisor
//!
//! **Signalvisor** is a small traffic-signal control core for Rust.
//!
//! It arbitrates which of several lanes at an intersection may show GREEN,
//! advances every lane through `RED → GREEN → YELLOW → RED` on a logical clock,
//! sizes each green phase from the lane's queue, and supports an emergency
//! override that forces one lane green. At most one lane is ever green.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ServiceHandle│   │ ServiceHandle│   │  Simulation  │
//!     │  (caller #1) │   │  (caller #2) │   │ (arrivals +  │
//!     │              │   │              │   │  cadence)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SignalService (single task, bounded command queue)               │
//! │  - SignalController (lane table, all-red gate, override)          │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   │ one batch per command:
//!                                   │ - ArrivalsRecorded / PhaseChanged
//!                                   │ - LaneDrained / GreenGated
//!                                   │ - OverrideApplied / TickCompleted
//!                     ┌─────────────┴───────────────┐
//!                     ▼                             ▼
//!        Bus (stamps seq, broadcast)         SubscriberSet
//!     (capacity: Config::bus_capacity)      (per-sub batch queues)
//!                     │                  ┌──────────┼──────────┐
//!                     ▼                  ▼          ▼          ▼
//!        ServiceHandle::subscribe()  LogWriter  LaneTracker  Custom
//!                                        │
//!                      panics / overflow └──► back to the service loop
//! ```
//!
//! ### Tick
//! ```text
//! tick(now, arrivals)
//!   ├─► record arrivals (queue += n, green = clamp(base + queue, min, max))
//!   └─► for each lane in arbitration order:
//!         elapsed = now - phase_started_at
//!         elapsed < threshold(phase) ─► stay
//!         GREEN  ─► YELLOW
//!         YELLOW ─► RED
//!         RED    ─► gate open?  ─► GREEN (queue drained into processed)
//!                   gate closed ─► GreenGated (timer keeps running)
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                         |
//! |-------------------|-------------------------------------------------------------|--------------------------------------------|
//! | **Core**          | Synchronous lane table, tick, override, snapshots.          | [`SignalController`], [`Lane`], [`Phase`]  |
//! | **Service**       | Serialized async access from many tasks.                    | [`SignalService`], [`ServiceHandle`]       |
//! | **Subscriber API**| Hook into phase changes and cycle reports.                  | [`Subscribe`], [`LaneTracker`]             |
//! | **Simulation**    | Random or scripted arrivals on a fixed cadence.             | [`Simulation`], [`ArrivalSource`]          |
//! | **Errors**        | Typed errors for lane tables and the service queue.         | [`ControllerError`], [`ServiceError`]      |
//! | **Configuration** | Phase durations, gate policy and queue capacities.          | [`Config`], [`GreenPolicy`]                |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use signalvisor::{Arrivals, Config, Phase, SignalController};
//!
//! let mut ctl = SignalController::new(&Config::default(), [(0, 2), (1, 1)])?;
//!
//! // Both lanes start RED at t=0; lane 0 wins the gate at t=2.
//! let report = ctl.tick(2, &Arrivals::new().with(1, 1));
//! assert_eq!(report.snapshot.green_lane(), Some(0));
//! assert_eq!(report.drained(), 2);
//!
//! // Emergency: lane 1 goes green immediately, lane 0 is forced red.
//! let ov = ctl.force_green(1, 3)?;
//! assert_eq!(ov.drained, 2);
//! assert_eq!(ctl.lane(0).map(|l| l.phase()), Some(Phase::Red));
//! # Ok::<(), signalvisor::ControllerError>(())
//! ```
mod core;
mod error;
mod events;
mod service;
mod sim;
mod subscribers;

// ---- Public re-exports ----

pub use core::{
    Arrivals, Config, GatePolicy, GreenPolicy, Lane, LaneId, LaneSnapshot, LaneSpec, Override,
    Phase, SignalController, Snapshot, TickReport, Time, Transition,
};
pub use error::{ControllerError, ServiceError};
pub use events::{Batch, Bus, Event, EventKind};
pub use service::{Reply, ServiceBuilder, ServiceHandle, SignalService};
pub use sim::{ArrivalSource, FixedArrivals, RandomArrivals, SimConfig, SimSummary, Simulation};
pub use subscribers::{LaneTracker, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
