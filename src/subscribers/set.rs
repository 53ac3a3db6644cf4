//! # Batch delivery to subscribers.
//!
//! [`SubscriberSet`] gives every subscriber its own worker and bounded queue of
//! [`Batch`]es. One batch is everything a single command produced (a whole tick,
//! or a whole override), so a subscriber never observes half a tick: the batch is
//! either queued in full or dropped in full.
//!
//! ```text
//! deliver(batch)
//!     ├──► [queue 1] ──► worker 1 ──► for ev in batch: sub1.on_event(ev)
//!     ├──► [queue 2] ──► worker 2 ──► for ev in batch: sub2.on_event(ev)
//!     └──► [queue N] ──► worker N ──► ...
//!                           │
//!                           └──► diagnostics (SubscriberPanicked / SubscriberOverflow)
//!                                    └──► service loop ──► Bus + every subscriber
//! ```
//!
//! ## Rules
//! - Per-subscriber FIFO; no ordering across subscribers.
//! - A full queue drops the batch for that subscriber only and reports its size.
//! - A panic inside `on_event` skips that one event; the rest of the batch is delivered.
//! - Diagnostics never trigger further overflow reports.
//!
//! `AssertUnwindSafe` is used around `on_event`: a subscriber that panics while
//! holding a lock may leave its own state poisoned.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::{Batch, Event};

use super::Subscribe;

struct Worker {
    name: &'static str,
    queue: mpsc::Sender<Batch>,
    task: JoinHandle<()>,
}

/// Per-subscriber workers fed with whole batches.
pub struct SubscriberSet {
    workers: Vec<Worker>,
    diagnostics: mpsc::UnboundedSender<Event>,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber.
    ///
    /// Returns the set and the receiver of its diagnostic events, which the
    /// owner is expected to publish. Must be called within a tokio runtime.
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (diagnostics, diag_rx) = mpsc::unbounded_channel();

        let workers = subs
            .into_iter()
            .map(|sub| {
                let name = sub.name();
                let (queue, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let task = tokio::spawn(drain_queue(sub, rx, diagnostics.clone()));
                Worker { name, queue, task }
            })
            .collect();

        (
            Self {
                workers,
                diagnostics,
            },
            diag_rx,
        )
    }

    /// Queues `batch` for every subscriber without waiting.
    pub fn deliver(&self, batch: &Batch) {
        if batch.is_empty() {
            return;
        }
        let report = !batch.iter().all(Event::is_subscriber_overflow);

        for w in &self.workers {
            let reason = match w.queue.try_send(Arc::clone(batch)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if report {
                let _ = self
                    .diagnostics
                    .send(Event::subscriber_overflow(w.name, batch.len(), reason));
            }
        }
    }

    /// Closes every queue and waits until each worker has handled what was queued.
    pub async fn shutdown(self) {
        let mut tasks = Vec::with_capacity(self.workers.len());
        for w in self.workers {
            drop(w.queue);
            tasks.push(w.task);
        }
        for task in tasks {
            let _ = task.await;
        }
    }
}

async fn drain_queue(
    sub: Arc<dyn Subscribe>,
    mut rx: mpsc::Receiver<Batch>,
    diagnostics: mpsc::UnboundedSender<Event>,
) {
    while let Some(batch) = rx.recv().await {
        for ev in batch.iter() {
            let handled = AssertUnwindSafe(sub.on_event(ev)).catch_unwind().await;
            if let Err(payload) = handled {
                let info = panic_message(payload.as_ref());
                let mut report = Event::subscriber_panicked(sub.name(), info);
                report.cycle = ev.cycle;
                let _ = diagnostics.send(report);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&'static str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Bus, EventKind};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.seq);
        }

        fn name(&self) -> &'static str {
            "collect"
        }
    }

    /// Panics on lane 1 only.
    struct PanicOnLaneOne {
        seen: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl Subscribe for PanicOnLaneOne {
        async fn on_event(&self, ev: &Event) {
            if ev.lane == Some(1) {
                panic!("lane one");
            }
            self.seen.lock().unwrap().extend(ev.lane);
        }

        fn name(&self) -> &'static str {
            "panic_on_lane_one"
        }
    }

    struct Tiny;

    #[async_trait]
    impl Subscribe for Tiny {
        async fn on_event(&self, _ev: &Event) {}

        fn name(&self) -> &'static str {
            "tiny"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    fn gated(bus: &Bus, lanes: impl IntoIterator<Item = u32>) -> Batch {
        bus.publish_batch(
            lanes
                .into_iter()
                .map(|lane| Event::new(EventKind::GreenGated).with_lane(lane))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_batches_arrive_whole_and_in_order() {
        let bus = Bus::new(16);
        let a = Arc::new(Collect::default());
        let b = Arc::new(Collect::default());
        let (set, mut diag) = SubscriberSet::new(vec![a.clone(), b.clone()]);

        set.deliver(&gated(&bus, 0..3));
        set.deliver(&gated(&bus, 3..5));
        set.shutdown().await;

        assert_eq!(*a.seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(*b.seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
        assert!(diag.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_panic_skips_one_event_and_is_reported() {
        let bus = Bus::new(16);
        let sub = Arc::new(PanicOnLaneOne {
            seen: Mutex::new(Vec::new()),
        });
        let (set, mut diag) = SubscriberSet::new(vec![sub.clone()]);

        set.deliver(&gated(&bus, 0..3));
        set.shutdown().await;

        assert_eq!(*sub.seen.lock().unwrap(), vec![0, 2]);
        let ev = diag.recv().await.unwrap();
        assert!(ev.is_subscriber_panic());
        assert_eq!(ev.source.as_deref(), Some("panic_on_lane_one"));
        assert_eq!(ev.reason.as_deref(), Some("lane one"));
    }

    #[tokio::test]
    async fn test_full_queue_drops_whole_batch() {
        let bus = Bus::new(16);
        let (set, mut diag) = SubscriberSet::new(vec![Arc::new(Tiny)]);

        // Current-thread runtime: the worker has not drained anything yet.
        set.deliver(&gated(&bus, 0..2));
        set.deliver(&gated(&bus, 2..5));

        let ev = diag.try_recv().unwrap();
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.source.as_deref(), Some("tiny"));
        assert_eq!(ev.count, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("full"));

        // Overflow reports themselves are never re-reported.
        set.deliver(&Arc::from(vec![ev]));
        assert!(diag.try_recv().is_err());

        set.shutdown().await;
    }
}
