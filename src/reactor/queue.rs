//! FIFO of handlers ready to run.
//!
//! The queue itself is not synchronised: it lives inside the reactor state and
//! is only touched under the reactor lock.

use crate::reactor::Handler;

use std::collections::VecDeque;

/// First-in-first-out queue of ready handlers.
#[derive(Default)]
pub(crate) struct HandlerQueue {
    handlers: VecDeque<Handler>,
}

impl HandlerQueue {
    pub(crate) fn new() -> Self {
        Self {
            handlers: VecDeque::new(),
        }
    }

    /// Enqueues a handler behind the ones already queued.
    pub(crate) fn push(&mut self, handler: Handler) {
        self.handlers.push_back(handler);
    }

    /// Dequeues the oldest handler, if any.
    pub(crate) fn pop(&mut self) -> Option<Handler> {
        self.handlers.pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}
