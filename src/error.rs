//! Error types for waits and timers.

use thiserror::Error;

/// Outcome of a wait that did not reach its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitError {
    /// The wait was cancelled before its deadline, either explicitly or because
    /// the primitive that armed it was re-armed or dropped.
    #[error("wait cancelled before its deadline")]
    Cancelled,
}

/// Errors returned by [`PointTimer`](crate::PointTimer) and
/// [`DurationTimer`](crate::DurationTimer).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimerError {
    #[error("timer is already running")]
    AlreadyRunning,

    #[error("{count} {unit} is not a representable duration")]
    InvalidDuration { count: f64, unit: &'static str },

    #[error("next expiry overflows the clock's time point range")]
    ExpiryOverflow,
}
