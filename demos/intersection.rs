//! # Example: intersection
//!
//! The classic two-lane run: lanes start with 2 and 1 waiting vehicles, every
//! cycle each lane gets 0 or 1 new arrivals, and the built-in [`LogWriter`]
//! prints a per-cycle lane report.
//!
//! ## Flow
//! ```text
//! Simulation::run()
//!   ├─► RandomArrivals.arrivals(cycle)
//!   ├─► ServiceHandle::tick(now, arrivals)
//!   │     └─► SignalService ──► Bus ──► LogWriter.on_event()
//!   └─► sleep(1s)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example intersection --features logging
//! cargo run --example intersection --features logging -- 1@4   # force lane 1 green at cycle 4
//! ```

use std::sync::Arc;

use signalvisor::{Config, LogWriter, RandomArrivals, SignalService, SimConfig, Simulation};
use tokio_util::sync::CancellationToken;

/// Parses `LANE@CYCLE` arguments into scheduled overrides.
fn parse_overrides() -> anyhow::Result<Vec<(u64, u32)>> {
    std::env::args()
        .skip(1)
        .map(|arg| -> anyhow::Result<(u64, u32)> {
            let (lane, cycle) = arg
                .split_once('@')
                .ok_or_else(|| anyhow::anyhow!("expected LANE@CYCLE, got {arg:?}"))?;
            Ok((cycle.parse()?, lane.parse()?))
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let overrides = parse_overrides()?;

    let service = SignalService::builder(Config::default())
        .with_lanes([(0, 2), (1, 1)])
        .with_subscriber(Arc::new(LogWriter::cycles_only()))
        .build()?;

    let token = CancellationToken::new();
    let (handle, join) = service.spawn(token.clone());

    let mut sim = Simulation::new(handle, RandomArrivals::default(), SimConfig::default());
    for (cycle, lane) in overrides {
        sim = sim.with_override(cycle, lane);
    }

    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let summary = sim.run(token.clone()).await?;
    token.cancel();
    join.await?;

    println!(
        "cycles={} overrides={} processed={} waiting={}",
        summary.cycles,
        summary.overrides,
        summary.final_snapshot.total_processed(),
        summary.final_snapshot.total_waiting()
    );
    Ok(())
}
