//! # Example: emergency_override
//!
//! Drives a [`SignalService`] by hand and preempts the normal cycle.
//!
//! Shows how to:
//! - Submit ticks from one task while another requests an override mid-run.
//! - Handle a rejected override (unknown lane) without touching any lane.
//! - Read a snapshot once both tasks are done.
//!
//! ## Run
//! ```bash
//! cargo run --example emergency_override
//! ```

use std::time::Duration;

use signalvisor::{Arrivals, Config, ServiceError, SignalService};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let service = SignalService::builder(Config::default())
        .with_lanes([(0, 2), (1, 1), (2, 4)])
        .build()?;
    let token = CancellationToken::new();
    let (handle, join) = service.spawn(token.clone());

    // The ticker owns the logical clock and shares it through a watch channel.
    let (clock_tx, mut clock) = watch::channel(0u64);

    let ticker = {
        let handle = handle.clone();
        tokio::spawn(async move {
            for now in 0..10 {
                let report = handle.tick(now, Arrivals::new().with(0, 1)).await?;
                for t in &report.transitions {
                    println!("[tick {now}] lane={} {} -> {}", t.lane, t.from, t.to);
                }
                let _ = clock_tx.send(now);
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            Ok::<(), ServiceError>(())
        })
    };

    let emergency = {
        let handle = handle.clone();
        tokio::spawn(async move {
            let now = *clock.wait_for(|now| *now >= 4).await?;

            match handle.force_green(7, now).await {
                Err(ServiceError::Rejected(e)) => println!("[override] rejected: {e}"),
                other => anyhow::bail!("unexpected override outcome: {other:?}"),
            }

            let ov = handle.force_green(2, now).await?;
            println!(
                "[override t={now}] lane={} from={} drained={} preempted={}",
                ov.lane,
                ov.from,
                ov.drained,
                ov.preempted.len()
            );
            Ok::<(), anyhow::Error>(())
        })
    };

    let (ticked, overridden) = tokio::join!(ticker, emergency);
    ticked??;
    overridden??;

    for lane in &handle.snapshot().await? {
        println!(
            "lane={} phase={} waiting={} processed={}",
            lane.id, lane.phase, lane.queue_len, lane.processed_total
        );
    }

    token.cancel();
    join.await?;
    Ok(())
}
