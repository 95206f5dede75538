//! Timer firing at an absolute time point.

use crate::error::TimerError;
use crate::reactor::{IoContext, Reactor};
use crate::time::unit::Unit;
use crate::time::waitable::{SystemTimer, TimePointOf, WaitPrimitive};
use crate::timer::controller::TimerController;
use crate::timer::core::{TimerCore, TimerState};

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

/// Fires a callback at an absolute time point and, when recursive, every
/// `G::PERIOD` after it.
///
/// The expiry is expressed in the clock of the wait primitive `W`: wall
/// clock ([`SystemTimer`]) by default, [`SteadyTimer`](crate::SteadyTimer)
/// for monotonic instants, [`DeadlineTimer`](crate::DeadlineTimer) for UTC
/// calendar time. Repetition starts disabled.
///
/// Re-arming adds one period to the previous expiry rather than to the time
/// the callback ran, so a recursive timer does not drift.
///
/// Dropping the timer cancels its outstanding wait.
///
/// # Example
/// ```ignore
/// let ioc = IoContext::new();
/// let timer: PointTimer<Hours> = PointTimer::new(&ioc, SystemTime::now() + Duration::from_secs(1));
/// timer.start(|| println!("one second later"))?;
/// ioc.run();
/// ```
pub struct PointTimer<G: Unit, R: Reactor = IoContext, W: WaitPrimitive<R> = SystemTimer<R>> {
    core: TimerCore<R, W>,
    _unit: PhantomData<fn() -> G>,
}

impl<G: Unit, R: Reactor, W: WaitPrimitive<R>> PointTimer<G, R, W> {
    /// Binds a timer to `reactor`, expiring at `expiry`. Nothing is armed until
    /// [`start`](Self::start).
    pub fn new(reactor: &R, expiry: TimePointOf<W, R>) -> Self {
        let mut primitive = W::new(reactor);
        primitive.expires_at(expiry);

        Self {
            core: TimerCore::new("point", primitive, G::PERIOD, false),
            _unit: PhantomData,
        }
    }

    /// Registers `callback` and starts waiting for the expiry. Never blocks.
    ///
    /// Restarting a finished or cancelled timer reuses its last expiry, which
    /// fires on the next reactor turn if already past. Use
    /// [`set_expiry`](Self::set_expiry) to move it first.
    pub fn start<F>(&self, callback: F) -> Result<(), TimerError>
    where
        F: FnMut() + Send + 'static,
    {
        self.core.start(Box::new(callback), None)
    }

    /// Enables or disables re-arming after each firing.
    pub fn recursive(&self, recursive: bool) {
        self.core.set_recursive(recursive);
    }

    /// Returns `true` while repetition is enabled.
    pub fn is_recursive(&self) -> bool {
        self.core.is_recursive()
    }

    /// Moves the expiry. Fails with [`TimerError::AlreadyRunning`] while armed
    /// or firing.
    pub fn set_expiry(&self, expiry: TimePointOf<W, R>) -> Result<(), TimerError> {
        self.core.set_expiry(expiry)
    }

    /// Expiry of the current, or most recent, arm cycle.
    pub fn expiry(&self) -> TimePointOf<W, R> {
        self.core.expiry()
    }

    /// Repeat step.
    pub fn interval(&self) -> Duration {
        G::PERIOD
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

impl<G: Unit, R: Reactor, W: WaitPrimitive<R>> fmt::Debug for PointTimer<G, R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointTimer")
            .field("id", &self.core.id())
            .field("unit", &G::NAME)
            .field("expiry", &self.core.expiry())
            .field("state", &self.core.state())
            .finish()
    }
}
