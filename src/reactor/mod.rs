//! Completion-dispatching reactor.
//!
//! This module provides the execution context timers are bound to:
//! - [`core`]: [`IoContext`], the run loop and its [`WorkGuard`]
//! - [`queue`]: FIFO of ready completion handlers
//! - [`timer_queue`]: pending waits keyed by deadline
//! - [`context`]: thread-local marker of the context being driven
//!
//! The [`Reactor`] trait is the seam timers and wait primitives are generic
//! over, so another execution context can be substituted for [`IoContext`].

pub(crate) mod context;
pub mod core;
pub(crate) mod queue;
pub(crate) mod timer_queue;

use crate::error::WaitError;
use crate::time::Deadline;

use std::fmt;

pub use self::core::{IoContext, WorkGuard};

/// A ready handler, run once by whichever thread drives the reactor.
pub type Handler = Box<dyn FnOnce() + Send + 'static>;

/// Completion handler of a wait. Receives `Ok(())` when the deadline passed
/// and `Err(WaitError::Cancelled)` when the wait was cancelled.
pub type WaitHandler = Box<dyn FnOnce(Result<(), WaitError>) + Send + 'static>;

/// Identifies a wait registered with a reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaitId(pub(crate) u64);

impl fmt::Display for WaitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wait#{}", self.0)
    }
}

/// An execution context that runs handlers and completes deadline waits.
///
/// Handlers are never invoked from inside these methods. They run later, on a
/// thread driving the reactor.
pub trait Reactor: Clone + Send + Sync + 'static {
    /// Queues a handler for dispatch.
    fn post(&self, handler: Handler);

    /// Registers a wait completing with `Ok(())` once `deadline` has passed.
    fn schedule(&self, deadline: Deadline, handler: WaitHandler) -> WaitId;

    /// Cancels a pending wait. Its handler is queued with
    /// `Err(WaitError::Cancelled)`.
    ///
    /// Returns `false` if the wait already completed or is unknown.
    fn cancel(&self, id: WaitId) -> bool;

    /// Returns `true` while the wait has neither expired nor been cancelled.
    fn is_pending(&self, id: WaitId) -> bool;
}
