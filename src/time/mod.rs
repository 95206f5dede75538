//! Clocks, units and the wait primitives timers are built on.
//!
//! - [`clock`]: the [`Clock`] trait with monotonic, wall and UTC calendar clocks
//! - [`unit`]: granularity units used for repeat intervals and duration counts
//! - [`waitable`]: the [`WaitPrimitive`] trait and [`WaitableTimer`]
//!
//! # Example
//!
//! ```ignore
//! use reactor_timer::{IoContext, SteadyTimer, WaitPrimitive};
//! use std::time::Duration;
//!
//! let ioc = IoContext::new();
//! let mut timer = SteadyTimer::new(&ioc);
//! timer.expires_after(Duration::from_millis(10));
//! timer.async_wait(|result| assert!(result.is_ok()));
//! ioc.run();
//! ```

pub mod clock;
pub mod unit;
pub mod waitable;

pub use clock::{Clock, Deadline, SteadyClock, SystemClock, UtcClock};
pub use unit::{Hours, Microseconds, Milliseconds, Minutes, Seconds, Unit};
pub use waitable::{DeadlineTimer, SteadyTimer, SystemTimer, WaitPrimitive, WaitableTimer};
