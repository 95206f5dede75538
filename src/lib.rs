//! Point and duration timers on a minimal completion reactor.
//!
//! A [`PointTimer`] fires a callback at an absolute time point, a
//! [`DurationTimer`] after a relative duration. Either can repeat, and
//! repetition can be switched off at any time, including from inside the
//! callback through a [`TimerController`].
//!
//! # Architecture
//!
//! - **IoContext**: reactor that queues handlers and completes deadline waits when driven
//! - **ReactorBuilder**: fluent builder for IoContext configuration
//! - **Reactor**: trait seam timers are generic over
//! - **WaitPrimitive**: trait seam for clock-specific waits, implemented by
//!   [`SteadyTimer`], [`SystemTimer`] and [`DeadlineTimer`]
//! - **Unit**: repeat granularity and duration unit (`Hours`, `Seconds`, ...)
//! - **PointTimer / DurationTimer**: the scheduling shims on top
//!
//! # Example
//! ```ignore
//! use reactor_timer::{DurationTimer, IoContext, Seconds};
//!
//! let ioc = IoContext::new();
//! let timer: DurationTimer<Seconds> = DurationTimer::new(&ioc, 1, true)?;
//!
//! let control = timer.controller();
//! let mut remaining = 3;
//! timer.start(move || {
//!     remaining -= 1;
//!     if remaining == 0 {
//!         control.recursive(false);
//!     }
//! })?;
//!
//! ioc.run(); // returns after the third firing
//! ```

mod builder;
pub mod error;
pub mod reactor;
pub mod time;
pub mod timer;

pub use builder::{DEFAULT_NAME, DEFAULT_WALL_CLOCK_RESYNC, ReactorBuilder};
pub use error::{TimerError, WaitError};
pub use reactor::{Handler, IoContext, Reactor, WaitHandler, WaitId, WorkGuard};
pub use time::{
    Clock, Deadline, DeadlineTimer, Hours, Microseconds, Milliseconds, Minutes, Seconds,
    SteadyClock, SteadyTimer, SystemClock, SystemTimer, Unit, UtcClock, WaitPrimitive,
    WaitableTimer,
};
pub use timer::{DurationTimer, PointTimer, TimerController, TimerState};
