mod common;

use common::init_test_logging;
use reactor_timer::{
    Clock, Deadline, DeadlineTimer, IoContext, SteadyTimer, SystemTimer, TimerError, UtcClock,
    WaitError, WaitPrimitive,
};

use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

#[test]
fn test_steady_timer_async_wait() {
    init_test_logging();
    let ioc = IoContext::new();
    let mut timer = SteadyTimer::new(&ioc);
    timer.expires_after(Duration::from_millis(20)).unwrap();

    let outcome = Arc::new(Mutex::new(None));
    let outcome_clone = outcome.clone();
    timer.async_wait(move |result| *outcome_clone.lock().unwrap() = Some(result));
    assert_eq!(timer.pending(), 1);

    let start = Instant::now();
    ioc.run();

    assert!(start.elapsed() >= Duration::from_millis(15));
    assert_eq!(*outcome.lock().unwrap(), Some(Ok(())));
    assert_eq!(timer.pending(), 0);
}

#[test]
fn test_expires_at_cancels_outstanding_waits() {
    init_test_logging();
    let ioc = IoContext::new();
    let mut timer = SystemTimer::new(&ioc);
    timer.expires_at(SystemTime::now() + Duration::from_secs(60));

    let outcomes = Arc::new(Mutex::new(Vec::new()));
    for _ in 0..2 {
        let outcomes_clone = outcomes.clone();
        timer.async_wait(move |result| outcomes_clone.lock().unwrap().push(result));
    }

    let cancelled = timer.expires_at(SystemTime::now());
    assert_eq!(cancelled, 2, "Both pending waits should be cancelled");
    assert_eq!(timer.cancel(), 0, "Nothing left to cancel");

    ioc.run();
    assert_eq!(
        *outcomes.lock().unwrap(),
        vec![Err(WaitError::Cancelled), Err(WaitError::Cancelled)]
    );
}

#[test]
fn test_dropping_primitive_cancels_its_waits() {
    init_test_logging();
    let ioc = IoContext::new();
    let outcome = Arc::new(Mutex::new(None));

    {
        let mut timer = SteadyTimer::new(&ioc);
        timer.expires_after(Duration::from_secs(60)).unwrap();
        let outcome_clone = outcome.clone();
        timer.async_wait(move |result| *outcome_clone.lock().unwrap() = Some(result));
        assert_eq!(ioc.pending_waits(), 1);
    }

    assert_eq!(ioc.pending_waits(), 0);
    ioc.run();
    assert_eq!(*outcome.lock().unwrap(), Some(Err(WaitError::Cancelled)));
}

#[test]
fn test_expires_after_overflow() {
    init_test_logging();
    let ioc = IoContext::new();
    let mut timer = SteadyTimer::new(&ioc);

    assert_eq!(
        timer.expires_after(Duration::MAX),
        Err(TimerError::ExpiryOverflow)
    );
}

#[test]
fn test_blocking_wait() {
    init_test_logging();
    let ioc = IoContext::new();
    let mut timer = DeadlineTimer::new(&ioc);
    let expiry = Utc::now() + chrono::Duration::milliseconds(20);
    timer.expires_at(expiry);

    let deadline = UtcClock::deadline(expiry);
    assert!(!deadline.has_elapsed());

    timer.wait();

    assert!(Utc::now() >= expiry);
    assert!(deadline.has_elapsed());
    assert_eq!(deadline.remaining(), Duration::ZERO);
    assert_eq!(ioc.run(), 0, "A blocking wait does not involve the reactor");
}

#[test]
fn test_new_primitive_expires_now() {
    init_test_logging();
    let ioc = IoContext::new();
    let before = Instant::now();
    let timer = SteadyTimer::new(&ioc);

    assert!(timer.expiry() >= before);
    assert!(timer.expiry() <= Instant::now());
    assert_eq!(timer.reactor().name(), ioc.name());
}

#[test]
fn test_deadline_has_elapsed() {
    init_test_logging();
    let past = Deadline::Monotonic(Instant::now() - Duration::from_millis(5));
    let future = Deadline::Wall(SystemTime::now() + Duration::from_secs(60));

    assert!(past.has_elapsed());
    assert!(!future.has_elapsed());
    assert!(future.remaining() > Duration::from_secs(59));
}
