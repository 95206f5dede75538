//! Pending deadline waits.
//!
//! Waits are registered once with their deadline and completion handler. The
//! run loop sweeps the table, moving every expired wait onto the ready queue,
//! and sleeps until the nearest remaining deadline.

use crate::reactor::queue::HandlerQueue;
use crate::reactor::{WaitHandler, WaitId};
use crate::time::Deadline;

use std::cmp::Reverse;
use std::time::{Duration, Instant, SystemTime};

struct PendingWait {
    id: WaitId,
    deadline: Deadline,
    handler: WaitHandler,
}

impl PendingWait {
    fn remaining_at(&self, now: Instant, wall_now: SystemTime) -> Duration {
        match self.deadline {
            Deadline::Monotonic(at) => at.saturating_duration_since(now),
            Deadline::Wall(at) => at.duration_since(wall_now).unwrap_or(Duration::ZERO),
        }
    }

    fn overdue_at(&self, now: Instant, wall_now: SystemTime) -> Duration {
        match self.deadline {
            Deadline::Monotonic(at) => now.saturating_duration_since(at),
            Deadline::Wall(at) => wall_now.duration_since(at).unwrap_or(Duration::ZERO),
        }
    }
}

/// Table of waits that have not completed yet.
pub(crate) struct TimerQueue {
    waits: Vec<PendingWait>,
    next_id: u64,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self {
            waits: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers a wait and returns its id.
    pub(crate) fn register(&mut self, deadline: Deadline, handler: WaitHandler) -> WaitId {
        let id = WaitId(self.next_id);
        self.next_id += 1;

        self.waits.push(PendingWait {
            id,
            deadline,
            handler,
        });

        id
    }

    /// Removes a pending wait, handing back its handler.
    pub(crate) fn cancel(&mut self, id: WaitId) -> Option<WaitHandler> {
        let index = self.waits.iter().position(|wait| wait.id == id)?;

        Some(self.waits.remove(index).handler)
    }

    pub(crate) fn contains(&self, id: WaitId) -> bool {
        self.waits.iter().any(|wait| wait.id == id)
    }

    /// Moves every expired wait onto `ready` as a successful completion.
    ///
    /// Expired waits are queued earliest deadline first, ties in registration
    /// order. Returns the number of waits that expired.
    pub(crate) fn fire_expired(&mut self, ready: &mut HandlerQueue) -> usize {
        if self.waits.is_empty() {
            return 0;
        }

        let now = Instant::now();
        let wall_now = SystemTime::now();

        let mut expired = Vec::new();
        let mut index = 0;
        while index < self.waits.len() {
            if self.waits[index].remaining_at(now, wall_now).is_zero() {
                expired.push(self.waits.swap_remove(index));
            } else {
                index += 1;
            }
        }

        if expired.is_empty() {
            return 0;
        }
        expired.sort_by_key(|wait| (Reverse(wait.overdue_at(now, wall_now)), wait.id));

        let fired = expired.len();
        for wait in expired {
            tracing::trace!(id = %wait.id, deadline = ?wait.deadline, "wait expired");
            let handler = wait.handler;
            ready.push(Box::new(move || handler(Ok(()))));
        }

        fired
    }

    /// Time until the nearest deadline, if any wait is pending.
    ///
    /// Wall-clock deadlines report at most `wall_resync` so the caller wakes up
    /// and re-reads the wall clock, which may have been stepped meanwhile.
    pub(crate) fn next_remaining(&self, wall_resync: Duration) -> Option<Duration> {
        let now = Instant::now();
        let wall_now = SystemTime::now();

        self.waits
            .iter()
            .map(|wait| {
                let remaining = wait.remaining_at(now, wall_now);
                if wait.deadline.is_wall() {
                    remaining.min(wall_resync)
                } else {
                    remaining
                }
            })
            .min()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.waits.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.waits.len()
    }
}
