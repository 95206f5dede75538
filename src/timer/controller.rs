//! Weak control handle to a running timer.
//!
//! A callback cannot borrow the timer that invokes it, so it captures a
//! [`TimerController`] instead:
//!
//! ```ignore
//! let timer: PointTimer<Seconds> = PointTimer::new(&ioc, SystemTime::now());
//! timer.recursive(true);
//!
//! let control = timer.controller();
//! let mut remaining = 3;
//! timer.start(move || {
//!     remaining -= 1;
//!     if remaining == 0 {
//!         control.recursive(false);
//!     }
//! })?;
//! ioc.run();
//! ```
//!
//! The controller never keeps the timer alive. Once the owning timer is dropped
//! every call is a no-op.

use crate::timer::core::TimerState;

use std::fmt;
use std::sync::Weak;

pub(crate) trait Control: Send + Sync {
    fn set_recursive(&self, recursive: bool);
    fn is_recursive(&self) -> bool;
    fn state(&self) -> TimerState;
    fn fired(&self) -> u64;
    fn cancel(&self) -> bool;
}

/// Cloneable, weak handle to a timer's repetition flag and cancellation.
#[derive(Clone)]
pub struct TimerController {
    id: u64,
    timer: Weak<dyn Control>,
}

impl TimerController {
    pub(crate) fn new(id: u64, timer: Weak<dyn Control>) -> Self {
        Self { id, timer }
    }

    /// Enables or disables re-arming after each firing.
    ///
    /// Disabling from inside the callback lets the current firing complete
    /// and schedules nothing further.
    pub fn recursive(&self, recursive: bool) {
        if let Some(timer) = self.timer.upgrade() {
            timer.set_recursive(recursive);
        }
    }

    /// Repetition flag, or `false` once the timer is gone.
    pub fn is_recursive(&self) -> bool {
        self.timer
            .upgrade()
            .is_some_and(|timer| timer.is_recursive())
    }

    /// Cancels the timer. Returns `false` if it was not running or is gone.
    pub fn cancel(&self) -> bool {
        self.timer.upgrade().is_some_and(|timer| timer.cancel())
    }

    /// Current state, or `None` once the timer is gone.
    pub fn state(&self) -> Option<TimerState> {
        self.timer.upgrade().map(|timer| timer.state())
    }

    /// Number of firings since the last start, or `None` once the timer is gone.
    pub fn fired(&self) -> Option<u64> {
        self.timer.upgrade().map(|timer| timer.fired())
    }

    /// Returns `true` while the owning timer exists.
    pub fn is_alive(&self) -> bool {
        self.timer.strong_count() > 0
    }

    /// Identifier of the timer, as reported in log fields.
    pub fn timer_id(&self) -> u64 {
        self.id
    }
}

impl fmt::Debug for TimerController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerController")
            .field("timer_id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}
