//! Timer firing after a relative duration.

use crate::error::TimerError;
use crate::reactor::{IoContext, Reactor};
use crate::time::clock::Clock;
use crate::time::unit::Unit;
use crate::time::waitable::{SteadyTimer, TimePointOf, WaitPrimitive};
use crate::timer::controller::TimerController;
use crate::timer::core::{TimerCore, TimerState};

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

/// Fires a callback a fixed duration after [`start`](Self::start) and, when
/// recursive, every same duration after that.
///
/// The duration is given as a count of `U`, fractional counts included.
/// Waits use the monotonic clock ([`SteadyTimer`]) by default.
///
/// The n-th firing is due at `start + n * duration`. Re-arming adds to the
/// previous expiry, so callback run time does not accumulate as drift.
///
/// # Example
/// ```ignore
/// let ioc = IoContext::new();
/// let timer: DurationTimer<Seconds> = DurationTimer::new(&ioc, 1.5, false)?;
/// timer.start(|| println!("1.5 s after start"))?;
/// ioc.run();
/// ```
pub struct DurationTimer<U: Unit, R: Reactor = IoContext, W: WaitPrimitive<R> = SteadyTimer<R>> {
    core: TimerCore<R, W>,
    _unit: PhantomData<fn() -> U>,
}

impl<U: Unit, R: Reactor, W: WaitPrimitive<R>> DurationTimer<U, R, W> {
    /// Binds a timer waiting `count` units of `U`.
    ///
    /// Fails with [`TimerError::InvalidDuration`] for negative, non-finite or
    /// overflowing counts.
    pub fn new(reactor: &R, count: impl Into<f64>, recursive: bool) -> Result<Self, TimerError> {
        let count = count.into();
        let duration = U::duration_of(count).ok_or(TimerError::InvalidDuration {
            count,
            unit: U::NAME,
        })?;

        Ok(Self::with_duration(reactor, duration, recursive))
    }

    /// Binds a timer waiting exactly `duration`.
    pub fn with_duration(reactor: &R, duration: Duration, recursive: bool) -> Self {
        Self {
            core: TimerCore::new("duration", W::new(reactor), duration, recursive),
            _unit: PhantomData,
        }
    }

    /// Registers `callback` and starts waiting. The duration counts from this
    /// call. Never blocks.
    pub fn start<F>(&self, callback: F) -> Result<(), TimerError>
    where
        F: FnMut() + Send + 'static,
    {
        let expiry = W::Clock::checked_add(W::Clock::now(), self.core.step())
            .ok_or(TimerError::ExpiryOverflow)?;

        self.core.start(Box::new(callback), Some(expiry))
    }

    /// Enables or disables re-arming after each firing.
    pub fn recursive(&self, recursive: bool) {
        self.core.set_recursive(recursive);
    }

    /// Returns `true` while repetition is enabled.
    pub fn is_recursive(&self) -> bool {
        self.core.is_recursive()
    }

    /// Wait between start and the first firing, and between firings.
    pub fn duration(&self) -> Duration {
        self.core.step()
    }

    /// Expiry of the current, or most recent, arm cycle.
    pub fn expiry(&self) -> TimePointOf<W, R> {
        self.core.expiry()
    }

    /// Cancels the outstanding wait. Returns `false` if nothing was running.
    pub fn cancel(&self) -> bool {
        self.core.cancel()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TimerState {
        self.core.state()
    }

    /// Returns `true` while armed or firing.
    pub fn is_running(&self) -> bool {
        self.core.state().is_running()
    }

    /// Number of firings since the last start.
    pub fn fired(&self) -> u64 {
        self.core.fired()
    }

    /// Weak handle for use inside the callback.
    pub fn controller(&self) -> TimerController {
        self.core.controller()
    }

    /// Identifier reported in log fields.
    pub fn id(&self) -> u64 {
        self.core.id()
    }
}

impl<U: Unit, R: Reactor, W: WaitPrimitive<R>> fmt::Debug for DurationTimer<U, R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DurationTimer")
            .field("id", &self.core.id())
            .field("unit", &U::NAME)
            .field("duration", &self.core.step())
            .field("state", &self.core.state())
            .finish()
    }
}
