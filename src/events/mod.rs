//! Service events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the service loop and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] run sequencer over `tokio::sync::broadcast`, returning [`Batch`]es
//!
//! ## Quick reference
//! - **Publisher**: the `SignalService` loop only (one batch per command, plus
//!   subscriber diagnostics it forwards).
//! - **Consumers**: the service's `SubscriberSet` (whole batches) and any
//!   receiver obtained from `ServiceHandle::subscribe` (single events).

mod bus;
mod event;

pub use bus::{Batch, Bus};
pub use event::{Event, EventKind};
