//! # Event subscribers for the signal service.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling events broadcast through the [`Bus`](crate::events::Bus).
//! Renderers and loggers live here, outside the arbitration core: the core only
//! produces reports, and these collaborators decide what to display or persist.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   service loop ── publish_batch ──► Bus ── Batch ──► SubscriberSet::deliver
//!                                                            │
//!                                              ┌─────────────┼──────────┐
//!                                              ▼             ▼          ▼
//!                                          LogWriter    LaneTracker   Custom
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** - observe and react to events (logging, metrics, alerts)
//! - **Stateful subscribers** - maintain internal state based on events ([`LaneTracker`])

mod set;
mod subscribe;
mod tracker;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;
pub use tracker::LaneTracker;

#[cfg(feature = "logging")]
pub use log::LogWriter;
