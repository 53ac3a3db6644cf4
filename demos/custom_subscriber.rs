//! # Example: custom_subscriber
//!
//! Demonstrates how to build and attach a custom event subscriber.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait.
//! - Inspect [`Event`] / [`EventKind`] for per-lane wait metrics.
//! - Combine it with the built-in [`LaneTracker`].
//!
//! ## Run
//! ```bash
//! cargo run --example custom_subscriber
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use signalvisor::{
    Config, Event, EventKind, LaneTracker, RandomArrivals, SignalService, SimConfig, Simulation,
    Subscribe,
};
use tokio_util::sync::CancellationToken;

/// Counts how many ticks each lane spent blocked by the all-red gate.
#[derive(Default)]
struct GateCounter {
    gated: Mutex<BTreeMap<u32, u64>>,
}

#[async_trait::async_trait]
impl Subscribe for GateCounter {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::GreenGated => {
                if let (Some(lane), Ok(mut gated)) = (ev.lane, self.gated.lock()) {
                    *gated.entry(lane).or_insert(0) += 1;
                }
            }
            EventKind::PhaseChanged => {
                println!(
                    "[sub] lane={} {} -> {} at t={}",
                    ev.lane.unwrap_or_default(),
                    ev.from.map_or("?", |p| p.as_str()),
                    ev.to.map_or("?", |p| p.as_str()),
                    ev.now.unwrap_or_default()
                );
            }
            EventKind::ServiceStopped => {
                println!("[sub] stopped after {} cycles", ev.cycle.unwrap_or(0));
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "gate_counter"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let counter = Arc::new(GateCounter::default());
    let tracker = Arc::new(LaneTracker::new());

    let service = SignalService::builder(Config::default())
        .with_lanes([(0, 3), (1, 0), (2, 1)])
        .with_subscriber(counter.clone())
        .with_subscriber(tracker.clone())
        .build()?;
    let token = CancellationToken::new();
    let (handle, join) = service.spawn(token.clone());

    let cfg = SimConfig {
        steps: 20,
        step: Duration::from_millis(100),
        start: 0,
    };
    Simulation::new(handle, RandomArrivals::new(2), cfg)
        .run(token.clone())
        .await?;

    token.cancel();
    join.await?;

    let gated: Vec<(u32, u64)> = match counter.gated.lock() {
        Ok(g) => g.iter().map(|(lane, n)| (*lane, *n)).collect(),
        Err(_) => Vec::new(),
    };
    for (lane, ticks) in gated {
        println!("lane={lane} gated_ticks={ticks} served={}", tracker.served(lane).await);
    }
    Ok(())
}
