use std::sync::Arc;

use crate::core::{Config, LaneId, LaneSpec, SignalController, Time};
use crate::error::ControllerError;
use crate::events::Bus;
use crate::subscribers::Subscribe;

use super::SignalService;

/// Builder for constructing a [`SignalService`] with optional subscribers.
pub struct ServiceBuilder {
    cfg: Config,
    lanes: Vec<LaneSpec>,
    start: Time,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ServiceBuilder {
    /// Creates a new builder with the given configuration and no lanes.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            lanes: Vec::new(),
            start: 0,
            subscribers: Vec::new(),
        }
    }

    /// Appends lanes; arbitration order follows insertion order.
    pub fn with_lanes<I>(mut self, lanes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LaneSpec>,
    {
        self.lanes.extend(lanes.into_iter().map(Into::into));
        self
    }

    /// Appends a single lane.
    pub fn with_lane(mut self, id: LaneId, initial_queue: u64) -> Self {
        self.lanes.push(LaneSpec::new(id, initial_queue));
        self
    }

    /// Logical time the initial red phase starts at (default 0).
    pub fn starting_at(mut self, start: Time) -> Self {
        self.start = start;
        self
    }

    /// Sets event subscribers (replaces any set before).
    ///
    /// Subscribers receive service events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validates the lane table and builds the service (not yet running).
    pub fn build(self) -> Result<SignalService, ControllerError> {
        let controller = SignalController::starting_at(&self.cfg, self.lanes, self.start)?;
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        Ok(SignalService::new_internal(
            self.cfg,
            controller,
            bus,
            self.subscribers,
        ))
    }
}
