//! Execution context that dispatches handlers and completes deadline waits.
//!
//! An [`IoContext`] is a cheap, cloneable handle. Every clone drives the same
//! queues, so a timer can be armed from one thread while another thread runs
//! the context.

use crate::builder::ReactorBuilder;
use crate::error::WaitError;
use crate::reactor::context;
use crate::reactor::queue::HandlerQueue;
use crate::reactor::timer_queue::TimerQueue;
use crate::reactor::{Handler, Reactor, WaitHandler, WaitId};
use crate::time::Deadline;

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct State {
    handlers: HandlerQueue,
    timers: TimerQueue,
    stopped: bool,
    guards: usize,
}

impl State {
    fn has_work(&self) -> bool {
        !self.handlers.is_empty() || !self.timers.is_empty() || self.guards > 0
    }
}

struct Shared {
    name: String,
    wall_clock_resync: Duration,
    state: Mutex<State>,
    wakeup: Condvar,
}

/// Reactor driving timer completions.
///
/// Nothing happens until a thread calls [`run`](Self::run),
/// [`run_one`](Self::run_one), [`poll`](Self::poll) or
/// [`poll_one`](Self::poll_one). Handlers execute on that thread, with no
/// internal lock held, so they may freely post, schedule or cancel.
///
/// # Example
/// ```ignore
/// let ioc = IoContext::new();
/// ioc.post(|| println!("hello from the reactor"));
/// assert_eq!(ioc.run(), 1);
/// ```
#[derive(Clone)]
pub struct IoContext {
    shared: Arc<Shared>,
}

impl IoContext {
    /// Creates a context with the default configuration.
    ///
    /// Equivalent to `ReactorBuilder::new().build()`.
    pub fn new() -> Self {
        ReactorBuilder::new().build()
    }

    /// Returns a builder to configure a new context.
    pub fn builder() -> ReactorBuilder {
        ReactorBuilder::new()
    }

    pub(crate) fn with_config(name: String, wall_clock_resync: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                name,
                wall_clock_resync,
                state: Mutex::new(State {
                    handlers: HandlerQueue::new(),
                    timers: TimerQueue::new(),
                    stopped: false,
                    guards: 0,
                }),
                wakeup: Condvar::new(),
            }),
        }
    }

    /// Name given at construction, used in log fields.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Longest single sleep while a wall-clock wait is pending.
    pub fn wall_clock_resync(&self) -> Duration {
        self.shared.wall_clock_resync
    }

    /// Runs handlers until the context is out of work or stopped.
    ///
    /// The context is out of work when no handler is queued, no wait is
    /// pending and no [`WorkGuard`] is alive. While only waits are pending the
    /// calling thread sleeps until the nearest deadline. Returns the number of
    /// handlers executed, which is 0 straight away if there was nothing to do.
    ///
    /// A panicking handler unwinds out of `run`. The context stays usable.
    pub fn run(&self) -> usize {
        self.drive(true, usize::MAX)
    }

    /// Runs at most one handler, blocking until one is ready or the context
    /// is out of work or stopped.
    pub fn run_one(&self) -> usize {
        self.drive(true, 1)
    }

    /// Runs every handler that is ready now, including expired waits, without
    /// blocking.
    pub fn poll(&self) -> usize {
        self.drive(false, usize::MAX)
    }

    /// Runs at most one ready handler without blocking.
    pub fn poll_one(&self) -> usize {
        self.drive(false, 1)
    }

    /// Makes every `run`/`poll` call return as soon as possible.
    ///
    /// Queued handlers and pending waits are kept. Later calls return
    /// immediately until [`restart`](Self::restart) is called.
    pub fn stop(&self) {
        let mut state = self.lock();
        state.stopped = true;
        self.shared.wakeup.notify_all();

        tracing::debug!(context = %self.shared.name, "stopped");
    }

    /// Returns `true` after [`stop`](Self::stop) until the next restart.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Clears a previous [`stop`](Self::stop).
    pub fn restart(&self) {
        self.lock().stopped = false;

        tracing::debug!(context = %self.shared.name, "restarted");
    }

    /// Queues a handler for dispatch by a thread driving this context.
    pub fn post<F>(&self, handler: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.lock();
        state.handlers.push(Box::new(handler));
        self.shared.wakeup.notify_one();
    }

    /// Keeps [`run`](Self::run) from returning for lack of work while the
    /// returned guard is alive.
    pub fn work_guard(&self) -> WorkGuard {
        WorkGuard::new(self.clone())
    }

    /// Returns `true` when called from a handler, or any code, executing
    /// inside `run`/`poll` of this context on the current thread.
    pub fn running_in_this_thread(&self) -> bool {
        context::is_current(self.id())
    }

    /// Number of waits that have neither expired nor been cancelled.
    pub fn pending_waits(&self) -> usize {
        self.lock().timers.len()
    }

    /// Number of handlers queued and ready to run.
    pub fn ready_handlers(&self) -> usize {
        self.lock().handlers.len()
    }

    fn drive(&self, block: bool, limit: usize) -> usize {
        let _entered = context::enter(self.id());
        let mut executed = 0;

        while executed < limit {
            let Some(handler) = self.next_handler(block) else {
                break;
            };

            tracing::trace!(context = %self.shared.name, "dispatching handler");
            handler();
            executed += 1;
        }

        executed
    }

    // Pops the next ready handler, sleeping until a deadline or a notification
    // when `block` is set and work remains.
    fn next_handler(&self, block: bool) -> Option<Handler> {
        let mut state = self.lock();

        loop {
            if state.stopped {
                return None;
            }

            let State {
                handlers, timers, ..
            } = &mut *state;
            timers.fire_expired(handlers);

            if let Some(handler) = state.handlers.pop() {
                return Some(handler);
            }

            if !block || !state.has_work() {
                return None;
            }

            let timeout = state.timers.next_remaining(self.shared.wall_clock_resync);
            state = match timeout {
                Some(timeout) => {
                    self.shared
                        .wakeup
                        .wait_timeout(state, timeout)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .shared
                    .wakeup
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.shared) as usize
    }
}

impl Reactor for IoContext {
    fn post(&self, handler: Handler) {
        IoContext::post(self, handler);
    }

    fn schedule(&self, deadline: Deadline, handler: WaitHandler) -> WaitId {
        let mut state = self.lock();
        let id = state.timers.register(deadline, handler);
        self.shared.wakeup.notify_all();

        tracing::trace!(context = %self.shared.name, %id, ?deadline, "wait scheduled");
        id
    }

    fn cancel(&self, id: WaitId) -> bool {
        let mut state = self.lock();
        let Some(handler) = state.timers.cancel(id) else {
            return false;
        };

        state
            .handlers
            .push(Box::new(move || handler(Err(WaitError::Cancelled))));
        self.shared.wakeup.notify_all();

        tracing::trace!(context = %self.shared.name, %id, "wait cancelled");
        true
    }

    fn is_pending(&self, id: WaitId) -> bool {
        self.lock().timers.contains(id)
    }
}

impl Default for IoContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();

        f.debug_struct("IoContext")
            .field("name", &self.shared.name)
            .field("ready_handlers", &state.handlers.len())
            .field("pending_waits", &state.timers.len())
            .field("stopped", &state.stopped)
            .finish()
    }
}

/// Keeps an [`IoContext`] busy while alive.
///
/// Useful when waits are armed from another thread after `run` has started.
/// Dropping the guard, or calling [`reset`](Self::reset), lets `run` return
/// once the remaining work is done.
#[must_use = "dropping a WorkGuard immediately releases it"]
pub struct WorkGuard {
    context: Option<IoContext>,
}

impl WorkGuard {
    fn new(context: IoContext) -> Self {
        context.lock().guards += 1;

        Self {
            context: Some(context),
        }
    }

    /// Releases the guard early. Further calls do nothing.
    pub fn reset(&mut self) {
        if let Some(context) = self.context.take() {
            let mut state = context.lock();
            state.guards -= 1;
            context.shared.wakeup.notify_all();
        }
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.reset();
    }
}

impl fmt::Debug for WorkGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkGuard")
            .field("active", &self.context.is_some())
            .finish()
    }
}
