//! # Event bus and sequencer for one service run.
//!
//! [`Bus`] stamps every event with the next sequence number of the run and
//! broadcasts it to direct receivers. Events published together (one tick, one
//! override) come back as a single [`Batch`] that the service hands to its
//! subscriber set unchanged.
//!
//! ```text
//! service loop ── publish_batch(Vec<Event>) ──► Bus ──┬──► broadcast receivers (one Event each)
//!                                                     └──► Arc<[Event]> batch ──► SubscriberSet
//! ```
//!
//! ## Rules
//! - Sequence numbers start at 1 and have no gaps within a run.
//! - A batch keeps publication order; receivers see the same order.
//! - Receivers that fall more than `capacity` events behind get `Lagged(n)`.
//! - Events sent while nobody listens are not kept.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

use super::event::Event;

/// Events published by one command, in order.
pub type Batch = Arc<[Event]>;

/// Broadcast channel plus the run's sequence counter.
///
/// Clones share both, so every clone stamps from the same sequence.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    seq: Arc<AtomicU64>,
}

impl Bus {
    /// Creates a bus whose ring buffer holds `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self {
            tx,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Stamps and broadcasts a single event; returns it as a one-event batch.
    pub fn publish(&self, ev: Event) -> Batch {
        self.publish_batch(vec![ev])
    }

    /// Stamps `events` with consecutive sequence numbers and broadcasts them in order.
    pub fn publish_batch(&self, mut events: Vec<Event>) -> Batch {
        let first = self.seq.fetch_add(events.len() as u64, Ordering::Relaxed) + 1;
        for (ev, seq) in events.iter_mut().zip(first..) {
            ev.seq = seq;
            let _ = self.tx.send(ev.clone());
        }
        events.into()
    }

    /// Creates a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of events stamped so far in this run.
    pub fn published(&self) -> u64 {
        self.seq.load(Ordering::Relaxed)
    }
}
