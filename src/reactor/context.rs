//! Thread-local marker of the context currently being driven.
//!
//! [`IoContext::run`](crate::IoContext::run) and its siblings enter the
//! context for the duration of the call, which is what
//! [`IoContext::running_in_this_thread`](crate::IoContext::running_in_this_thread)
//! reports. Entering nests: the previous marker is restored on exit, including
//! when a handler unwinds.

use std::cell::Cell;

thread_local! {
    /// Identity of the context driven by this thread, if any.
    static CURRENT_CONTEXT: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Restores the previous marker when dropped.
pub(crate) struct EnterGuard {
    previous: Option<usize>,
}

impl Drop for EnterGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|current| current.set(self.previous));
    }
}

/// Marks the context `id` as driven by the current thread.
pub(crate) fn enter(id: usize) -> EnterGuard {
    let previous = CURRENT_CONTEXT.with(|current| current.replace(Some(id)));

    EnterGuard { previous }
}

/// Returns `true` if the context `id` is being driven by the current thread.
pub(crate) fn is_current(id: usize) -> bool {
    CURRENT_CONTEXT.with(|current| current.get() == Some(id))
}
