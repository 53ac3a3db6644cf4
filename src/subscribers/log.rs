//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for demos or as a reference for a real sink.
//!
//! ## Example output
//! ```text
//! [arrivals] lane=0 vehicles=1 now=3
//! [phase] lane=0 GREEN -> YELLOW now=6
//! [drained] lane=1 vehicles=2 now=6
//! [gated] lane=1 now=3
//! [override] lane=1 from=RED drained=2 now=7
//! ===== Cycle 3 (1760000000) =====
//! Lane 0 | State: YELLOW | Waiting: 0 | Processed: 2 | G=2s Y=2s R=2s
//! Lane 1 | State: GREEN  | Waiting: 0 | Processed: 1 | G=3s Y=2s R=2s
//! ```

use std::time::UNIX_EPOCH;

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter {
    quiet: bool,
}

impl LogWriter {
    /// Construct a new [`LogWriter`] printing every event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a [`LogWriter`] that prints only per-cycle lane reports,
    /// overrides and subscriber problems.
    #[must_use]
    pub fn cycles_only() -> Self {
        Self { quiet: true }
    }

    /// Renders an event into the lines this writer prints.
    pub fn render(&self, e: &Event) -> Vec<String> {
        let lane = e.lane.map_or_else(|| "?".to_string(), |l| l.to_string());
        let now = e.now.map_or_else(|| "?".to_string(), |n| n.to_string());

        let line = match e.kind {
            EventKind::TickCompleted => return render_cycle(e),
            EventKind::ArrivalsRecorded if !self.quiet => format!(
                "[arrivals] lane={lane} vehicles={} now={now}",
                e.count.unwrap_or(0)
            ),
            EventKind::PhaseChanged if !self.quiet => format!(
                "[phase] lane={lane} {} -> {} now={now}",
                e.from.map_or("?", |p| p.as_str()),
                e.to.map_or("?", |p| p.as_str()),
            ),
            EventKind::LaneDrained if !self.quiet => format!(
                "[drained] lane={lane} vehicles={} now={now}",
                e.count.unwrap_or(0)
            ),
            EventKind::GreenGated if !self.quiet => format!("[gated] lane={lane} now={now}"),
            EventKind::OverrideApplied => format!(
                "[override] lane={lane} from={} drained={} now={now}",
                e.from.map_or("?", |p| p.as_str()),
                e.count.unwrap_or(0)
            ),
            EventKind::OverrideRejected => format!(
                "[override-rejected] lane={lane} err={}",
                e.reason.as_deref().unwrap_or("unknown")
            ),
            EventKind::SubscriberOverflow => format!(
                "[subscriber-overflow] subscriber={} dropped={} reason={}",
                e.source.as_deref().unwrap_or("unknown"),
                e.count.unwrap_or(0),
                e.reason.as_deref().unwrap_or("unknown"),
            ),
            EventKind::SubscriberPanicked => format!(
                "[subscriber-panicked] subscriber={} info={}",
                e.source.as_deref().unwrap_or("unknown"),
                e.reason.as_deref().unwrap_or("unknown"),
            ),
            EventKind::ServiceStopped => {
                format!("[service-stopped] cycles={}", e.cycle.unwrap_or(0))
            }
            _ => return Vec::new(),
        };
        vec![line]
    }
}

fn render_cycle(e: &Event) -> Vec<String> {
    let Some(snapshot) = e.snapshot.as_deref() else {
        return Vec::new();
    };
    let wall = e
        .at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(snapshot.len() + 1);
    lines.push(format!(
        "===== Cycle {} ({wall}) =====",
        e.cycle.unwrap_or(0)
    ));
    for l in snapshot {
        lines.push(format!(
            "Lane {} | State: {:<6} | Waiting: {} | Processed: {} | G={}s Y={}s R={}s",
            l.id, l.phase, l.queue_len, l.processed_total, l.green, l.yellow, l.red
        ));
    }
    lines
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        for line in self.render(e) {
            println!("{line}");
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Arrivals, Config, Phase, SignalController};

    #[test]
    fn test_cycle_report_lists_every_lane() {
        let mut ctl = SignalController::new(&Config::default(), [(0, 2), (1, 1)]).unwrap();
        let report = ctl.tick(2, &Arrivals::new());
        let events = Event::from_tick(3, &report);

        let lines = LogWriter::new().render(events.last().unwrap());
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("===== Cycle 3 ("));
        assert_eq!(
            lines[1],
            "Lane 0 | State: GREEN  | Waiting: 0 | Processed: 2 | G=4s Y=2s R=2s"
        );
        assert_eq!(
            lines[2],
            "Lane 1 | State: RED    | Waiting: 1 | Processed: 0 | G=3s Y=2s R=2s"
        );
    }

    #[test]
    fn test_quiet_writer_skips_transitions() {
        let ev = Event::new(EventKind::PhaseChanged)
            .with_lane(0)
            .with_now(6)
            .with_phases(Phase::Green, Phase::Yellow);

        assert_eq!(
            LogWriter::new().render(&ev),
            vec!["[phase] lane=0 GREEN -> YELLOW now=6".to_string()]
        );
        assert!(LogWriter::cycles_only().render(&ev).is_empty());
    }
}
