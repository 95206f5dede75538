//! Wait primitives: an expiry time point armed on a reactor.
//!
//! [`WaitableTimer`] pairs a [`Clock`] with a [`Reactor`]. It records an
//! expiry and registers completion handlers that run once that expiry has
//! passed. Re-arming or dropping the timer cancels its outstanding waits,
//! whose handlers then receive [`WaitError::Cancelled`].

use crate::error::{TimerError, WaitError};
use crate::reactor::{IoContext, Reactor, WaitId};
use crate::time::clock::{Clock, SteadyClock, SystemClock, UtcClock};

use std::fmt;
use std::marker::PhantomData;
use std::thread;
use std::time::Duration;

/// Time point type of a wait primitive's clock.
pub type TimePointOf<W, R> = <<W as WaitPrimitive<R>>::Clock as Clock>::TimePoint;

/// A deadline wait armed on a reactor of type `R`.
///
/// Timers are generic over this trait so the same scheduling logic runs
/// against any clock, or against a primitive other than [`WaitableTimer`].
pub trait WaitPrimitive<R: Reactor>: Send + 'static {
    /// Clock the expiry is expressed in.
    type Clock: Clock;

    /// Creates a primitive bound to `reactor`, expiring now.
    fn new(reactor: &R) -> Self;

    /// Current expiry.
    fn expiry(&self) -> <Self::Clock as Clock>::TimePoint;

    /// Sets the expiry, cancelling outstanding waits. Returns how many were
    /// cancelled.
    fn expires_at(&mut self, expiry: <Self::Clock as Clock>::TimePoint) -> usize;

    /// Registers `handler` to run on the reactor once the expiry has passed.
    fn async_wait<F>(&mut self, handler: F)
    where
        F: FnOnce(Result<(), WaitError>) + Send + 'static;

    /// Cancels outstanding waits. Returns how many were cancelled.
    fn cancel(&mut self) -> usize;
}

/// Wait primitive over any [`Clock`].
///
/// # Example
/// ```ignore
/// let ioc = IoContext::new();
/// let mut timer = SteadyTimer::new(&ioc);
/// timer.expires_after(Duration::from_millis(20))?;
/// timer.async_wait(|result| println!("expired: {result:?}"));
/// ioc.run();
/// ```
pub struct WaitableTimer<C: Clock, R: Reactor = IoContext> {
    reactor: R,
    expiry: C::TimePoint,
    pending: Vec<WaitId>,
    _clock: PhantomData<fn() -> C>,
}

/// Monotonic wait primitive.
pub type SteadyTimer<R = IoContext> = WaitableTimer<SteadyClock, R>;

/// Wall clock wait primitive.
pub type SystemTimer<R = IoContext> = WaitableTimer<SystemClock, R>;

/// UTC calendar-time wait primitive.
pub type DeadlineTimer<R = IoContext> = WaitableTimer<UtcClock, R>;

impl<C: Clock, R: Reactor> WaitableTimer<C, R> {
    /// Creates a primitive bound to `reactor`, expiring at `expiry`.
    pub fn at(reactor: &R, expiry: C::TimePoint) -> Self {
        Self {
            reactor: reactor.clone(),
            expiry,
            pending: Vec::new(),
            _clock: PhantomData,
        }
    }

    /// Sets the expiry relative to now, cancelling outstanding waits.
    pub fn expires_after(&mut self, duration: Duration) -> Result<usize, TimerError> {
        let expiry = C::checked_add(C::now(), duration).ok_or(TimerError::ExpiryOverflow)?;

        Ok(WaitPrimitive::expires_at(self, expiry))
    }

    /// Blocks the calling thread until the expiry has passed.
    ///
    /// The reactor is not involved.
    pub fn wait(&self) {
        loop {
            let remaining = C::deadline(self.expiry).remaining();
            if remaining.is_zero() {
                return;
            }

            thread::sleep(remaining);
        }
    }

    /// Reactor the waits are armed on.
    pub fn reactor(&self) -> &R {
        &self.reactor
    }

    /// Number of waits armed by this primitive that are still pending.
    pub fn pending(&self) -> usize {
        self.pending
            .iter()
            .filter(|id| self.reactor.is_pending(**id))
            .count()
    }
}

impl<C: Clock, R: Reactor> WaitPrimitive<R> for WaitableTimer<C, R> {
    type Clock = C;

    fn new(reactor: &R) -> Self {
        Self::at(reactor, C::now())
    }

    fn expiry(&self) -> C::TimePoint {
        self.expiry
    }

    fn expires_at(&mut self, expiry: C::TimePoint) -> usize {
        let cancelled = self.cancel();
        self.expiry = expiry;

        cancelled
    }

    fn async_wait<F>(&mut self, handler: F)
    where
        F: FnOnce(Result<(), WaitError>) + Send + 'static,
    {
        let reactor = &self.reactor;
        self.pending.retain(|id| reactor.is_pending(*id));

        let id = self
            .reactor
            .schedule(C::deadline(self.expiry), Box::new(handler));
        self.pending.push(id);
    }

    fn cancel(&mut self) -> usize {
        let reactor = &self.reactor;

        self.pending
            .drain(..)
            .filter(|id| reactor.cancel(*id))
            .count()
    }
}

impl<C: Clock, R: Reactor> Drop for WaitableTimer<C, R> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<C: Clock, R: Reactor> fmt::Debug for WaitableTimer<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitableTimer")
            .field("clock", &C::NAME)
            .field("expiry", &self.expiry)
            .field("pending", &self.pending.len())
            .finish()
    }
}
