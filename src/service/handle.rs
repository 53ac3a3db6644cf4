use tokio::sync::{broadcast, mpsc, oneshot};

use crate::core::{Arrivals, LaneId, Override, Snapshot, TickReport, Time};
use crate::error::ServiceError;
use crate::events::{Bus, Event};

use super::command::{Command, Reply};

/// Cloneable handle for driving a running [`SignalService`](super::SignalService).
///
/// Every call becomes one command on the service queue, so ticks and overrides
/// from different tasks never interleave inside the controller.
#[derive(Clone)]
pub struct ServiceHandle {
    tx: mpsc::Sender<Command>,
    bus: Bus,
}

impl ServiceHandle {
    pub(crate) fn new(tx: mpsc::Sender<Command>, bus: Bus) -> Self {
        Self { tx, bus }
    }

    /// Applies `arrivals` and evaluates one tick at logical time `now`.
    ///
    /// Waits if the command queue is full.
    pub async fn tick(&self, now: Time, arrivals: Arrivals) -> Result<TickReport, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Tick {
            now,
            arrivals,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Submits a tick without waiting for queue space.
    ///
    /// Returns [`ServiceError::Full`] if the queue is full.
    pub fn try_tick(&self, now: Time, arrivals: Arrivals) -> Result<Reply<TickReport>, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.try_send(Command::Tick {
            now,
            arrivals,
            reply,
        })?;
        Ok(Reply::new(rx))
    }

    /// Emergency override: forces `lane` green and every other lane red at `now`.
    ///
    /// An unknown lane yields [`ServiceError::Rejected`] and changes nothing.
    pub async fn force_green(&self, lane: LaneId, now: Time) -> Result<Override, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ForceGreen { lane, now, reply }).await?;
        let outcome = rx.await.map_err(|_| ServiceError::Closed)?;
        Ok(outcome?)
    }

    /// Read-only copy of the lane table, ordered after every previously submitted command.
    pub async fn snapshot(&self) -> Result<Snapshot, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Direct receiver on the service event bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// True once the service loop has stopped accepting commands.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, cmd: Command) -> Result<(), ServiceError> {
        self.tx.send(cmd).await.map_err(|_| ServiceError::Closed)
    }

    fn try_send(&self, cmd: Command) -> Result<(), ServiceError> {
        self.tx.try_send(cmd).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ServiceError::Full,
            mpsc::error::TrySendError::Closed(_) => ServiceError::Closed,
        })
    }
}
