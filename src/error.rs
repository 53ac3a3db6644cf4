//! Error types used by the signal controller and its async service.
//!
//! This module defines two error enums:
//!
//! - [`ControllerError`]: errors raised by the arbitration core itself.
//! - [`ServiceError`]: errors raised when talking to a running [`SignalService`](crate::SignalService).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! None of them is fatal: a rejected operation leaves every lane exactly as it was.

use thiserror::Error;

use crate::core::LaneId;

/// # Errors produced by the arbitration core.
///
/// Construction errors (`NoLanes`, `DuplicateLane`) are raised once, when the
/// lane table is built. `InvalidLane` is raised by
/// [`SignalController::force_green`](crate::SignalController::force_green) and
/// guarantees that no lane was mutated.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The requested lane does not exist in this controller.
    #[error("invalid lane {lane}: controller has {lanes} lane(s)")]
    InvalidLane {
        /// The lane id that was requested.
        lane: LaneId,
        /// Number of lanes the controller owns.
        lanes: usize,
    },

    /// A controller must own at least one lane.
    #[error("controller requires at least one lane")]
    NoLanes,

    /// Two lane specs share the same id.
    #[error("duplicate lane id {lane}")]
    DuplicateLane {
        /// The id that appeared more than once.
        lane: LaneId,
    },
}

impl ControllerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use signalvisor::ControllerError;
    ///
    /// let err = ControllerError::InvalidLane { lane: 5, lanes: 2 };
    /// assert_eq!(err.as_label(), "controller_invalid_lane");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ControllerError::InvalidLane { .. } => "controller_invalid_lane",
            ControllerError::NoLanes => "controller_no_lanes",
            ControllerError::DuplicateLane { .. } => "controller_duplicate_lane",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ControllerError::InvalidLane { lane, lanes } => {
                format!("lane={lane} is not one of {lanes} lane(s)")
            }
            ControllerError::NoLanes => "no lanes configured".to_string(),
            ControllerError::DuplicateLane { lane } => format!("lane={lane} declared twice"),
        }
    }
}

/// # Errors produced by the async service handle.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Command queue is full (only returned by the `try_*` methods).
    #[error("command queue full")]
    Full,

    /// The service loop has stopped (cancelled, or all work done).
    #[error("service channel closed")]
    Closed,

    /// The controller rejected the command.
    #[error("rejected: {0}")]
    Rejected(#[from] ControllerError),
}

impl ServiceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use signalvisor::{ControllerError, ServiceError};
    ///
    /// let err = ServiceError::from(ControllerError::NoLanes);
    /// assert_eq!(err.as_label(), "service_rejected");
    /// assert_eq!(ServiceError::Closed.as_label(), "service_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Full => "service_full",
            ServiceError::Closed => "service_closed",
            ServiceError::Rejected(_) => "service_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::Full => "command queue full".to_string(),
            ServiceError::Closed => "service stopped".to_string(),
            ServiceError::Rejected(e) => format!("rejected: {}", e.as_message()),
        }
    }

    /// Returns the controller error if the command reached the controller and was refused.
    pub fn rejection(&self) -> Option<&ControllerError> {
        match self {
            ServiceError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}
