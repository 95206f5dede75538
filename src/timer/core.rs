//! State machine shared by [`PointTimer`](crate::PointTimer) and
//! [`DurationTimer`](crate::DurationTimer).
//!
//! The owner holds the only strong reference to the timer state. Waits armed on
//! the reactor carry a weak reference plus the arm generation they belong to,
//! so a completion that outlives the owner, or an earlier arm cycle, is a
//! no-op.
//!
//! The state lock is never held while the user callback runs. The repetition
//! flag is read only after the callback has returned.

use crate::error::{TimerError, WaitError};
use crate::reactor::Reactor;
use crate::time::clock::Clock;
use crate::time::waitable::{TimePointOf, WaitPrimitive};
use crate::timer::controller::{Control, TimerController};

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// User callback invoked on each expiry.
pub(crate) type Callback = Box<dyn FnMut() + Send + 'static>;

/// Lifecycle of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerState {
    /// Constructed, never started.
    Idle,
    /// A wait is outstanding.
    Armed,
    /// The callback is executing.
    Firing,
    /// Fired with repetition disabled.
    Finished,
    /// Cancelled explicitly, by drop, or because its wait was aborted.
    Cancelled,
}

impl TimerState {
    /// `true` while armed or firing.
    pub fn is_running(self) -> bool {
        matches!(self, TimerState::Armed | TimerState::Firing)
    }
}

struct Inner<W> {
    primitive: W,
    step: Duration,
    recursive: bool,
    callback: Option<Callback>,
    state: TimerState,
    fired: u64,
    generation: u64,
}

pub(crate) struct Shared<R, W> {
    id: u64,
    kind: &'static str,
    inner: Mutex<Inner<W>>,
    _reactor: PhantomData<fn() -> R>,
}

impl<R: Reactor, W: WaitPrimitive<R>> Shared<R, W> {
    fn lock(&self) -> MutexGuard<'_, Inner<W>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Registers a wait for the current expiry under a fresh generation.
    fn arm(self: &Arc<Self>, inner: &mut Inner<W>) {
        inner.generation += 1;
        inner.state = TimerState::Armed;

        let generation = inner.generation;
        let timer = Arc::downgrade(self);
        inner.primitive.async_wait(move |result| {
            if let Some(timer) = timer.upgrade() {
                timer.complete(generation, result);
            }
        });
    }

    fn complete(self: &Arc<Self>, generation: u64, result: Result<(), WaitError>) {
        let mut callback = {
            let mut inner = self.lock();

            if inner.generation != generation || inner.state != TimerState::Armed {
                tracing::trace!(timer = self.id, generation, "stale completion ignored");
                return;
            }

            if let Err(error) = result {
                inner.state = TimerState::Cancelled;
                let callback = inner.callback.take();
                drop(inner);
                drop(callback);

                tracing::debug!(timer = self.id, kind = self.kind, %error, "wait aborted");
                return;
            }

            inner.state = TimerState::Firing;
            inner.fired += 1;
            tracing::trace!(timer = self.id, kind = self.kind, fired = inner.fired, "firing");

            inner.callback.take()
        };

        {
            let _unwind = FinishOnUnwind(self);
            if let Some(callback) = callback.as_mut() {
                callback();
            }
        }

        let mut inner = self.lock();
        if inner.state != TimerState::Firing {
            // Cancelled from inside the callback.
            return;
        }

        if !inner.recursive {
            inner.state = TimerState::Finished;
            tracing::debug!(timer = self.id, kind = self.kind, fired = inner.fired, "finished");
            return;
        }

        let Some(next) = W::Clock::checked_add(inner.primitive.expiry(), inner.step) else {
            inner.state = TimerState::Finished;
            tracing::warn!(
                timer = self.id,
                kind = self.kind,
                error = %TimerError::ExpiryOverflow,
                "repetition stopped"
            );
            return;
        };

        inner.primitive.expires_at(next);
        inner.callback = callback.take();
        self.arm(&mut inner);

        tracing::trace!(timer = self.id, kind = self.kind, expiry = ?next, "re-armed");
    }

    fn set_recursive(&self, recursive: bool) {
        self.lock().recursive = recursive;
    }

    fn is_recursive(&self) -> bool {
        self.lock().recursive
    }

    fn state(&self) -> TimerState {
        self.lock().state
    }

    fn fired(&self) -> u64 {
        self.lock().fired
    }

    fn cancel(&self) -> bool {
        let mut inner = self.lock();

        let callback = match inner.state {
            TimerState::Armed => {
                inner.primitive.cancel();
                inner.callback.take()
            }
            // The firing in progress hands its callback back and sees the
            // state change once it returns.
            TimerState::Firing => None,
            _ => return false,
        };
        inner.state = TimerState::Cancelled;
        drop(inner);
        drop(callback);

        tracing::debug!(timer = self.id, kind = self.kind, "cancelled");
        true
    }
}

impl<R: Reactor, W: WaitPrimitive<R>> Control for Shared<R, W> {
    fn set_recursive(&self, recursive: bool) {
        Shared::set_recursive(self, recursive);
    }

    fn is_recursive(&self) -> bool {
        Shared::is_recursive(self)
    }

    fn state(&self) -> TimerState {
        Shared::state(self)
    }

    fn fired(&self) -> u64 {
        Shared::fired(self)
    }

    fn cancel(&self) -> bool {
        Shared::cancel(self)
    }
}

// Marks the timer finished if the callback unwinds, so it does not stay
// `Firing` forever.
struct FinishOnUnwind<'a, R: Reactor, W: WaitPrimitive<R>>(&'a Shared<R, W>);

impl<R: Reactor, W: WaitPrimitive<R>> Drop for FinishOnUnwind<'_, R, W> {
    fn drop(&mut self) {
        if thread::panicking() {
            let mut inner = self.0.lock();
            if inner.state == TimerState::Firing {
                inner.state = TimerState::Finished;
            }
        }
    }
}

/// Owning handle to a timer's state. Dropping it cancels the timer.
pub(crate) struct TimerCore<R: Reactor, W: WaitPrimitive<R>> {
    shared: Arc<Shared<R, W>>,
}

impl<R: Reactor, W: WaitPrimitive<R>> TimerCore<R, W> {
    pub(crate) fn new(kind: &'static str, primitive: W, step: Duration, recursive: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed),
                kind,
                inner: Mutex::new(Inner {
                    primitive,
                    step,
                    recursive,
                    callback: None,
                    state: TimerState::Idle,
                    fired: 0,
                    generation: 0,
                }),
                _reactor: PhantomData,
            }),
        }
    }

    /// Arms the timer with `callback`, optionally moving the expiry first.
    pub(crate) fn start(
        &self,
        callback: Callback,
        expiry: Option<TimePointOf<W, R>>,
    ) -> Result<(), TimerError> {
        let mut inner = self.shared.lock();
        if inner.state.is_running() {
            return Err(TimerError::AlreadyRunning);
        }

        if let Some(expiry) = expiry {
            inner.primitive.expires_at(expiry);
        }
        inner.callback = Some(callback);
        inner.fired = 0;
        self.shared.arm(&mut inner);

        tracing::debug!(
            timer = self.shared.id,
            kind = self.shared.kind,
            clock = W::Clock::NAME,
            expiry = ?inner.primitive.expiry(),
            step = ?inner.step,
            recursive = inner.recursive,
            "armed"
        );
        Ok(())
    }

    pub(crate) fn set_expiry(&self, expiry: TimePointOf<W, R>) -> Result<(), TimerError> {
        let mut inner = self.shared.lock();
        if inner.state.is_running() {
            return Err(TimerError::AlreadyRunning);
        }

        inner.primitive.expires_at(expiry);
        Ok(())
    }

    pub(crate) fn expiry(&self) -> TimePointOf<W, R> {
        self.shared.lock().primitive.expiry()
    }

    pub(crate) fn step(&self) -> Duration {
        self.shared.lock().step
    }

    pub(crate) fn set_recursive(&self, recursive: bool) {
        self.shared.set_recursive(recursive);
    }

    pub(crate) fn is_recursive(&self) -> bool {
        self.shared.is_recursive()
    }

    pub(crate) fn state(&self) -> TimerState {
        self.shared.state()
    }

    pub(crate) fn fired(&self) -> u64 {
        self.shared.fired()
    }

    pub(crate) fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    pub(crate) fn controller(&self) -> TimerController {
        let shared: Arc<dyn Control> = self.shared.clone();

        TimerController::new(self.shared.id, Arc::downgrade(&shared))
    }

    pub(crate) fn id(&self) -> u64 {
        self.shared.id
    }
}

impl<R: Reactor, W: WaitPrimitive<R>> Drop for TimerCore<R, W> {
    fn drop(&mut self) {
        self.shared.cancel();
    }
}
