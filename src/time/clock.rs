//! Clock abstraction shared by wait primitives.
//!
//! A [`Clock`] names a time-point type and knows how to turn one of its time
//! points into a reactor [`Deadline`]. Monotonic clocks map to
//! [`Deadline::Monotonic`], calendar clocks to [`Deadline::Wall`] so the
//! reactor re-reads the wall clock while waiting.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::time::{Duration, Instant, SystemTime};

/// Absolute point in time a reactor waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Deadline on the monotonic clock. Unaffected by wall clock changes.
    Monotonic(Instant),
    /// Deadline on the system wall clock.
    Wall(SystemTime),
}

impl Deadline {
    /// Time left until the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        match self {
            Deadline::Monotonic(at) => at.saturating_duration_since(Instant::now()),
            Deadline::Wall(at) => at
                .duration_since(SystemTime::now())
                .unwrap_or(Duration::ZERO),
        }
    }

    /// Returns `true` once the deadline is reached.
    pub fn has_elapsed(&self) -> bool {
        self.remaining().is_zero()
    }

    pub(crate) fn is_wall(&self) -> bool {
        matches!(self, Deadline::Wall(_))
    }
}

/// A source of time points a wait primitive can be armed with.
pub trait Clock: Send + Sync + 'static {
    /// Time point type of this clock.
    type TimePoint: Copy + Ord + fmt::Debug + Send + Sync + 'static;

    /// Short name used in log fields.
    const NAME: &'static str;

    /// Current time on this clock.
    fn now() -> Self::TimePoint;

    /// `point + duration`, or `None` if the result is out of range.
    fn checked_add(point: Self::TimePoint, duration: Duration) -> Option<Self::TimePoint>;

    /// Converts a time point into a deadline the reactor understands.
    fn deadline(point: Self::TimePoint) -> Deadline;
}

/// Monotonic clock backed by [`Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SteadyClock;

impl Clock for SteadyClock {
    type TimePoint = Instant;

    const NAME: &'static str = "steady";

    fn now() -> Instant {
        Instant::now()
    }

    fn checked_add(point: Instant, duration: Duration) -> Option<Instant> {
        point.checked_add(duration)
    }

    fn deadline(point: Instant) -> Deadline {
        Deadline::Monotonic(point)
    }
}

/// Wall clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type TimePoint = SystemTime;

    const NAME: &'static str = "system";

    fn now() -> SystemTime {
        SystemTime::now()
    }

    fn checked_add(point: SystemTime, duration: Duration) -> Option<SystemTime> {
        point.checked_add(duration)
    }

    fn deadline(point: SystemTime) -> Deadline {
        Deadline::Wall(point)
    }
}

/// Calendar clock in UTC, backed by [`chrono::DateTime<Utc>`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcClock;

impl Clock for UtcClock {
    type TimePoint = DateTime<Utc>;

    const NAME: &'static str = "utc";

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn checked_add(point: DateTime<Utc>, duration: Duration) -> Option<DateTime<Utc>> {
        let delta = TimeDelta::from_std(duration).ok()?;
        point.checked_add_signed(delta)
    }

    fn deadline(point: DateTime<Utc>) -> Deadline {
        Deadline::Wall(SystemTime::from(point))
    }
}
