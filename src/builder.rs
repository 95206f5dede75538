//! Fluent builder for IoContext construction.
//!
//! Provides a builder pattern interface for creating and configuring
//! [`IoContext`] instances.

use crate::reactor::IoContext;

use std::time::Duration;

/// Name given to contexts built without an explicit one.
pub const DEFAULT_NAME: &str = "io-context";

/// Default upper bound on a single sleep while a wall-clock wait is pending.
pub const DEFAULT_WALL_CLOCK_RESYNC: Duration = Duration::from_secs(1);

const MIN_WALL_CLOCK_RESYNC: Duration = Duration::from_millis(1);

/// Builder for constructing [`IoContext`] instances with fluent API.
///
/// # Example
/// ```ignore
/// let ioc = ReactorBuilder::new()
///     .name("scheduler")
///     .wall_clock_resync(Duration::from_millis(250))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ReactorBuilder {
    name: String,
    wall_clock_resync: Duration,
}

impl Default for ReactorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactorBuilder {
    /// Creates a builder holding the default configuration.
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            wall_clock_resync: DEFAULT_WALL_CLOCK_RESYNC,
        }
    }

    /// Sets the name reported in log fields.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets how long the context may sleep before re-reading the wall clock
    /// while a wall-clock wait is pending.
    ///
    /// Shorter intervals notice wall clock steps sooner. Values under one
    /// millisecond are raised to one millisecond.
    pub fn wall_clock_resync(mut self, interval: Duration) -> Self {
        self.wall_clock_resync = interval.max(MIN_WALL_CLOCK_RESYNC);
        self
    }

    /// Consumes the builder and constructs the context.
    pub fn build(self) -> IoContext {
        tracing::debug!(
            context = %self.name,
            wall_clock_resync = ?self.wall_clock_resync,
            "building io context"
        );

        IoContext::with_config(self.name, self.wall_clock_resync)
    }
}
