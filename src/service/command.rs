use tokio::sync::oneshot;

use crate::core::{Arrivals, LaneId, Override, Snapshot, TickReport, Time};
use crate::error::{ControllerError, ServiceError};

/// One serialized request to the service loop.
///
/// Each variant carries its own reply channel; the loop answers exactly once.
pub(crate) enum Command {
    Tick {
        now: Time,
        arrivals: Arrivals,
        reply: oneshot::Sender<TickReport>,
    },
    ForceGreen {
        lane: LaneId,
        now: Time,
        reply: oneshot::Sender<Result<Override, ControllerError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot>,
    },
}

/// Pending answer to a command submitted with a `try_*` method.
#[must_use = "the command runs regardless, but its result is lost unless awaited"]
pub struct Reply<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Reply<T> {
    pub(crate) fn new(rx: oneshot::Receiver<T>) -> Self {
        Self { rx }
    }

    /// Waits for the service loop to answer.
    pub async fn wait(self) -> Result<T, ServiceError> {
        self.rx.await.map_err(|_| ServiceError::Closed)
    }
}
