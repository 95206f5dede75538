#![allow(dead_code)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use std::sync::Once;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// How late a firing may be. Firings are never allowed to be early.
pub const FIRING_TOLERANCE: Duration = Duration::from_millis(10);

/// Tighter bound for waits on the monotonic clock, which never go through a
/// wall-clock resync.
pub const STEADY_FIRING_TOLERANCE: Duration = Duration::from_millis(2);

/// Installs a fmt subscriber once per test binary, filtered by `RUST_LOG`.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Asserts that `late`, the delay between the requested and the observed
/// firing time, is within [`FIRING_TOLERANCE`].
pub fn assert_on_time(late: Duration, what: &str) {
    assert_late_within(late, FIRING_TOLERANCE, what);
}

/// Same as [`assert_on_time`] with [`STEADY_FIRING_TOLERANCE`].
pub fn assert_on_steady_time(late: Duration, what: &str) {
    assert_late_within(late, STEADY_FIRING_TOLERANCE, what);
}

fn assert_late_within(late: Duration, tolerance: Duration, what: &str) {
    assert!(
        late < tolerance,
        "{what} fired {late:?} late, tolerance is {tolerance:?}"
    );
}
