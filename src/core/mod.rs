//! Arbitration core: lanes, timing policy and the signal controller.
//!
//! Everything in this module is synchronous and free of I/O. Time is a logical
//! counter supplied by the caller, which makes every run replayable.
//!
//! Internal modules:
//! - [`lane`]: one approach to the intersection and its phase bookkeeping;
//! - [`controller`]: the per-tick transition table, all-red gate and emergency override;
//! - [`config`]: durations, green sizing and gate rule;
//! - [`snapshot`] / [`report`]: read-only values handed to renderers and the event layer.

mod arrivals;
mod config;
mod controller;
mod lane;
mod report;
mod snapshot;

pub use arrivals::Arrivals;
pub use config::{Config, GatePolicy, GreenPolicy};
pub use controller::SignalController;
pub use lane::{Lane, LaneSpec, Phase};
pub use report::{Override, TickReport, Transition};
pub use snapshot::{LaneSnapshot, Snapshot};

/// Stable lane identifier, unique within a controller.
pub type LaneId = u32;

/// Logical time in whole time units, supplied by the caller.
pub type Time = u64;
