//! # Async signal service.
//!
//! Confines a [`SignalController`](crate::SignalController) to a single task and
//! exposes it through a cloneable [`ServiceHandle`].
//!
//! - [`SignalService`] owns the controller, the bus and the subscribers
//! - [`ServiceBuilder`] validates the lane table before anything runs
//! - [`ServiceHandle`] submits ticks, overrides and snapshot requests
//! - [`Reply`] is the pending answer of a non-waiting submission

mod builder;
mod command;
mod handle;
mod runtime;

pub use builder::ServiceBuilder;
pub use command::Reply;
pub use handle::ServiceHandle;
pub use runtime::SignalService;
