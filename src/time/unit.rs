//! Granularity units.
//!
//! A unit is a zero-sized type carrying a fixed period. `PointTimer<Seconds>`
//! repeats every second, `DurationTimer<Milliseconds>` counts its duration in
//! milliseconds.

use std::time::Duration;

/// A fixed period used as repeat step or duration unit.
pub trait Unit: Send + Sync + 'static {
    /// Length of one unit.
    const PERIOD: Duration;

    /// Plural name used in errors and log fields.
    const NAME: &'static str;

    /// Converts a (possibly fractional) count of this unit into a [`Duration`].
    ///
    /// Returns `None` for negative, non-finite or overflowing counts.
    fn duration_of(count: f64) -> Option<Duration> {
        if !count.is_finite() || count < 0.0 {
            return None;
        }

        Duration::try_from_secs_f64(Self::PERIOD.as_secs_f64() * count).ok()
    }
}

macro_rules! unit {
    ($(#[$meta:meta])* $name:ident, $period:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl Unit for $name {
            const PERIOD: Duration = $period;
            const NAME: &'static str = $label;
        }
    };
}

unit!(
    /// One hour.
    Hours,
    Duration::from_secs(3600),
    "hours"
);
unit!(
    /// One minute.
    Minutes,
    Duration::from_secs(60),
    "minutes"
);
unit!(
    /// One second.
    Seconds,
    Duration::from_secs(1),
    "seconds"
);
unit!(Milliseconds, Duration::from_millis(1), "milliseconds");
unit!(Microseconds, Duration::from_micros(1), "microseconds");
