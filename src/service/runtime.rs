//! # SignalService: the controller confined to one task.
//!
//! The [`SignalService`] owns a [`SignalController`], the event bus and the
//! subscriber set. Once spawned, a single tokio task processes commands from a
//! bounded queue one at a time, which makes every tick and override a critical
//! section without any lock around the lane table.
//!
//! ## Architecture
//! ```text
//! ServiceHandle (clone 1) ─┐
//! ServiceHandle (clone 2) ─┼──► [mpsc command queue] ──► service loop ──► SignalController
//! ServiceHandle (clone N) ─┘                                  │
//!                                                             ├─► oneshot reply (report / error)
//!                                                             └─► Bus.publish_batch(events)
//!                                                                   │
//!                                                                   └─► SubscriberSet.deliver(batch)
//! ```
//!
//! ## Loop exit
//! - the `CancellationToken` is cancelled, or
//! - every [`ServiceHandle`] has been dropped.
//!
//! Subscriber panics and overflows come back to the loop on a diagnostics
//! channel and are published like any other event.
//!
//! On exit the loop publishes `ServiceStopped`, waits for subscribers to drain
//! their queues and returns the controller from the join handle.
//!
//! ## Example
//! ```rust
//! use signalvisor::{Arrivals, Config, SignalService};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = SignalService::builder(Config::default())
//!         .with_lane(0, 2)
//!         .with_lane(1, 1)
//!         .build()?;
//!
//!     let token = CancellationToken::new();
//!     let (handle, join) = service.spawn(token.clone());
//!
//!     let report = handle.tick(2, Arrivals::new().with(1, 1)).await?;
//!     assert_eq!(report.snapshot.green_lane(), Some(0));
//!
//!     token.cancel();
//!     let controller = join.await?;
//!     assert_eq!(controller.lane(1).map(|l| l.queue_len()), Some(2));
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::{Config, SignalController};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::builder::ServiceBuilder;
use super::command::Command;
use super::handle::ServiceHandle;

/// Serializes access to a [`SignalController`] and publishes its reports as events.
pub struct SignalService {
    cfg: Config,
    controller: SignalController,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    cycle: u64,
}

impl SignalService {
    /// Returns a builder for a service with the given configuration.
    pub fn builder(cfg: Config) -> ServiceBuilder {
        ServiceBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        controller: SignalController,
        bus: Bus,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self {
            cfg,
            controller,
            bus,
            subscribers,
            cycle: 0,
        }
    }

    /// The event bus; receivers created here see every event of the run.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Starts the service loop in the background.
    ///
    /// Must be called within a tokio runtime. The join handle yields the
    /// controller once the loop exits.
    pub fn spawn(self, token: CancellationToken) -> (ServiceHandle, JoinHandle<SignalController>) {
        let (tx, rx) = mpsc::channel(self.cfg.command_capacity_clamped());
        let handle = ServiceHandle::new(tx, self.bus.clone());
        let join = tokio::spawn(self.run(rx, token));
        (handle, join)
    }

    async fn run(
        mut self,
        mut rx: mpsc::Receiver<Command>,
        token: CancellationToken,
    ) -> SignalController {
        let (set, mut diagnostics) = SubscriberSet::new(std::mem::take(&mut self.subscribers));

        loop {
            tokio::select! {
                _ = token.cancelled() => break,

                cmd = rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd, &set),
                    None => break,
                },

                Some(ev) = diagnostics.recv() => self.dispatch(&set, vec![ev]),
            }
        }
        rx.close();

        let stopped = Event::new(EventKind::ServiceStopped).with_cycle(self.cycle);
        self.dispatch(&set, vec![stopped]);
        set.shutdown().await;

        // Workers are gone; whatever they reported on the way out only reaches the bus.
        while let Ok(ev) = diagnostics.try_recv() {
            self.bus.publish(ev);
        }
        self.controller
    }

    /// Handles one command; replies are best-effort (the caller may have gone away).
    ///
    /// Events are published before the reply, so a caller that sees the reply
    /// can already find its events on the bus.
    fn handle(&mut self, cmd: Command, set: &SubscriberSet) {
        match cmd {
            Command::Tick {
                now,
                arrivals,
                reply,
            } => {
                let report = self.controller.tick(now, &arrivals);
                self.dispatch(set, Event::from_tick(self.cycle, &report));
                self.cycle += 1;
                let _ = reply.send(report);
            }
            Command::ForceGreen { lane, now, reply } => {
                let outcome = self.controller.force_green(lane, now);
                let events = match &outcome {
                    Ok(ov) => Event::from_override(ov),
                    Err(e) => vec![Event::override_rejected(lane, now, e)],
                };
                self.dispatch(set, events);
                let _ = reply.send(outcome);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.controller.snapshot());
            }
        }
    }

    /// Sequences one command's events and hands them to every consumer as one batch.
    fn dispatch(&self, set: &SubscriberSet, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }
        let batch = self.bus.publish_batch(events);
        set.deliver(&batch);
    }
}
