//! # Simulation driver.
//!
//! Replays the classic two-lane demo: random arrivals every cycle, one tick per
//! cycle, a one-second pause in between, and optional scheduled emergency
//! overrides. Rendering is left to subscribers such as `LogWriter`.

mod driver;
mod source;

pub use driver::{SimConfig, SimSummary, Simulation};
pub use source::{ArrivalSource, FixedArrivals, RandomArrivals};
