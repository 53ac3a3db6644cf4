//! # Simulation driver.
//!
//! Feeds arrivals into a running service on a fixed wall-clock cadence.
//!
//! ```text
//! for cycle in 0..steps:
//!   ├─► now = start + cycle
//!   ├─► scheduled override for this cycle? ──► handle.force_green(lane, now)
//!   ├─► arrivals = source.arrivals(cycle, lanes)
//!   ├─► handle.tick(now, arrivals)
//!   └─► sleep(step)   (cancellable, skipped after the last cycle)
//! ```
//!
//! ### Notes
//! - A rejected override is not fatal; the service reports it as `OverrideRejected`.
//! - Logical time advances one unit per cycle whatever `step` is.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::core::{LaneId, Snapshot, Time};
use crate::error::ServiceError;
use crate::service::ServiceHandle;

use super::ArrivalSource;

/// Simulation pacing.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Number of cycles to run.
    pub steps: u64,
    /// Wall-clock pause between cycles.
    pub step: Duration,
    /// Logical time of the first cycle.
    pub start: Time,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            steps: 10,
            step: Duration::from_secs(1),
            start: 0,
        }
    }
}

/// Outcome of [`Simulation::run`].
#[derive(Debug, Clone)]
pub struct SimSummary {
    /// Ticks actually completed (less than `steps` when cancelled).
    pub cycles: u64,
    /// Overrides the service accepted.
    pub overrides: u64,
    /// Lane table after the last completed tick.
    pub final_snapshot: Snapshot,
}

/// Drives a service with arrivals from an [`ArrivalSource`].
pub struct Simulation<S: ArrivalSource> {
    handle: ServiceHandle,
    source: S,
    cfg: SimConfig,
    overrides: BTreeMap<u64, LaneId>,
}

impl<S: ArrivalSource> Simulation<S> {
    pub fn new(handle: ServiceHandle, source: S, cfg: SimConfig) -> Self {
        Self {
            handle,
            source,
            cfg,
            overrides: BTreeMap::new(),
        }
    }

    /// Schedules an emergency override of `lane` right before the tick of `cycle`.
    ///
    /// A later call for the same cycle replaces the earlier one.
    #[must_use]
    pub fn with_override(mut self, cycle: u64, lane: LaneId) -> Self {
        self.overrides.insert(cycle, lane);
        self
    }

    /// Runs until `steps` cycles complete or `token` is cancelled.
    ///
    /// Fails only if the service stops underneath the simulation.
    pub async fn run(mut self, token: CancellationToken) -> Result<SimSummary, ServiceError> {
        let mut snapshot = self.handle.snapshot().await?;
        let lanes = snapshot.lane_ids();
        let mut cycles = 0;
        let mut overrides = 0;

        for cycle in 0..self.cfg.steps {
            if token.is_cancelled() {
                break;
            }
            let now = self.cfg.start.saturating_add(cycle);

            if let Some(&lane) = self.overrides.get(&cycle) {
                match self.handle.force_green(lane, now).await {
                    Ok(_) => overrides += 1,
                    Err(ServiceError::Rejected(_)) => {}
                    Err(e) => return Err(e),
                }
            }

            let arrivals = self.source.arrivals(cycle, &lanes);
            snapshot = self.handle.tick(now, arrivals).await?.snapshot;
            cycles += 1;

            if cycle + 1 < self.cfg.steps {
                let sleep = time::sleep(self.cfg.step);
                tokio::pin!(sleep);
                select! {
                    _ = &mut sleep => {}
                    _ = token.cancelled() => break,
                }
            }
        }

        Ok(SimSummary {
            cycles,
            overrides,
            final_snapshot: snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Arrivals, Config, Phase, SignalController};
    use crate::events::EventKind;
    use crate::service::SignalService;
    use crate::sim::{FixedArrivals, RandomArrivals};

    fn spawn_two_lanes() -> (ServiceHandle, tokio::task::JoinHandle<SignalController>) {
        SignalService::builder(Config::default())
            .with_lanes([(0, 2), (1, 1)])
            .build()
            .unwrap()
            .spawn(CancellationToken::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_run_completes_all_cycles() {
        let (handle, join) = spawn_two_lanes();
        let started = time::Instant::now();

        let summary = Simulation::new(handle, FixedArrivals::default(), SimConfig::default())
            .run(CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.cycles, 10);
        assert_eq!(summary.overrides, 0);
        assert_eq!(started.elapsed(), Duration::from_secs(9));
        assert_eq!(summary.final_snapshot.total_processed(), 3);
        assert_eq!(summary.final_snapshot.total_waiting(), 0);
        assert!(summary.final_snapshot.green_count() <= 1);

        let ctl = join.await.unwrap();
        assert_eq!(ctl.snapshot(), summary.final_snapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_arrivals_reach_lanes() {
        let (handle, _join) = spawn_two_lanes();
        let script = FixedArrivals::new([
            Arrivals::new().with(1, 4),
            Arrivals::new(),
            Arrivals::new().with(0, 1),
        ]);
        let cfg = SimConfig {
            steps: 3,
            ..SimConfig::default()
        };

        let summary = Simulation::new(handle, script, cfg)
            .run(CancellationToken::new())
            .await
            .unwrap();

        // t=2: the late arrival joins lane 0 before it turns green and drains.
        let snap = summary.final_snapshot;
        assert_eq!(snap.get(0).unwrap().phase, Phase::Green);
        assert_eq!(snap.get(0).unwrap().processed_total, 3);
        assert_eq!(snap.get(0).unwrap().queue_len, 0);
        assert_eq!(snap.get(1).unwrap().queue_len, 5);
        assert_eq!(snap.get(1).unwrap().green, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_override_runs_before_tick() {
        let (handle, _join) = spawn_two_lanes();
        let mut events = handle.subscribe();
        let cfg = SimConfig {
            steps: 2,
            ..SimConfig::default()
        };

        let summary = Simulation::new(handle, FixedArrivals::default(), cfg)
            .with_override(1, 1)
            .with_override(0, 9)
            .run(CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.overrides, 1);
        assert_eq!(summary.final_snapshot.green_lane(), Some(1));

        let kinds: Vec<EventKind> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|e| e.kind)
            .filter(|k| matches!(k, EventKind::OverrideApplied | EventKind::OverrideRejected))
            .collect();
        assert_eq!(
            kinds,
            vec![EventKind::OverrideRejected, EventKind::OverrideApplied]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_between_cycles() {
        let (handle, _join) = spawn_two_lanes();
        let token = CancellationToken::new();
        let sim = Simulation::new(handle, RandomArrivals::seeded(1, 3), SimConfig::default());

        let run = tokio::spawn(sim.run(token.clone()));
        time::sleep(Duration::from_millis(2500)).await;
        token.cancel();

        let summary = run.await.unwrap().unwrap();
        assert_eq!(summary.cycles, 3);
        assert!(summary.final_snapshot.green_count() <= 1);
    }

    #[tokio::test]
    async fn test_stopped_service_is_an_error() {
        let token = CancellationToken::new();
        let (handle, join) = SignalService::builder(Config::default())
            .with_lane(0, 0)
            .build()
            .unwrap()
            .spawn(token.clone());
        token.cancel();
        join.await.unwrap();

        let err = Simulation::new(handle, FixedArrivals::default(), SimConfig::default())
            .run(CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::Closed);
    }
}
