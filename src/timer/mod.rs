//! Point and duration timers over an injected reactor and wait primitive.

pub mod controller;
pub(crate) mod core;
pub mod duration;
pub mod point;

pub use self::core::TimerState;
pub use controller::TimerController;
pub use duration::DurationTimer;
pub use point::PointTimer;
