mod common;

use common::init_test_logging;
use reactor_timer::{Hours, IoContext, PointTimer, SteadyTimer, TimerState};

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

struct Owner {
    value: i32,
    shared: Arc<AtomicI32>,
    timer: PointTimer<Hours, IoContext, SteadyTimer>,
}

impl Owner {
    fn new(ioc: &IoContext, expires_in: Duration, fired: Arc<AtomicBool>) -> Self {
        let owner = Self {
            value: 111,
            shared: Arc::new(AtomicI32::new(222)),
            timer: PointTimer::new(ioc, Instant::now() + expires_in),
        };

        let value = owner.value;
        let shared = owner.shared.clone();
        owner
            .timer
            .start(move || {
                thread::sleep(Duration::from_millis(50));
                assert_eq!(value, 111);
                assert_eq!(shared.load(Ordering::SeqCst), 222);
                fired.store(true, Ordering::SeqCst);
            })
            .unwrap();

        owner
    }
}

// Builds an `Owner` on another thread, keeps it alive for `keep_alive`, then
// drops it while the calling thread drives the reactor.
fn race_owner_against_reactor(expires_in: Duration, keep_alive: Duration) -> bool {
    let ioc = IoContext::new();
    let fired = Arc::new(AtomicBool::new(false));
    let (started_tx, started_rx) = mpsc::channel();

    let thread_ioc = ioc.clone();
    let thread_fired = fired.clone();
    let owner_thread = thread::spawn(move || {
        let owner = Owner::new(&thread_ioc, expires_in, thread_fired);
        started_tx.send(()).unwrap();
        thread::sleep(keep_alive);
        drop(owner);
    });

    started_rx.recv().unwrap();
    ioc.run();
    owner_thread.join().expect("owner thread panicked");

    assert_eq!(ioc.pending_waits(), 0, "No wait may outlive its owner");
    fired.load(Ordering::SeqCst)
}

#[test]
fn test_owner_dropped_while_callback_runs() {
    init_test_logging();

    // The owner goes away 10ms into the 50ms callback. Either outcome is
    // acceptable; what matters is that nothing dangles and run returns.
    race_owner_against_reactor(Duration::from_millis(1000), Duration::from_millis(1010));
}

#[test]
fn test_owner_dropped_before_expiry_cancels_timer() {
    init_test_logging();

    let start = Instant::now();
    let fired = race_owner_against_reactor(Duration::from_millis(500), Duration::from_millis(100));

    assert!(!fired, "A timer dropped before expiry must not fire");
    assert!(
        start.elapsed() < Duration::from_millis(400),
        "run should return as soon as the owner is gone"
    );
}

#[test]
fn test_owner_outlives_firing() {
    init_test_logging();

    let fired = race_owner_against_reactor(Duration::from_millis(100), Duration::from_millis(300));
    assert!(fired, "Timer should fire while its owner is alive");
}

#[test]
fn test_controller_outliving_timer_is_inert() {
    init_test_logging();
    let ioc = IoContext::new();
    let timer: PointTimer<Hours, IoContext, SteadyTimer> =
        PointTimer::new(&ioc, Instant::now() + Duration::from_secs(60));
    timer.start(|| {}).unwrap();

    let control = timer.controller();
    assert!(control.is_alive());
    assert_eq!(control.state(), Some(TimerState::Armed));
    assert_eq!(control.timer_id(), timer.id());

    drop(timer);

    assert!(!control.is_alive());
    assert_eq!(control.state(), None);
    assert_eq!(control.fired(), None);
    assert!(!control.cancel());
    assert!(!control.is_recursive());
    control.recursive(true);

    assert_eq!(ioc.pending_waits(), 0, "Dropping the timer cancels its wait");
    ioc.run();
}

#[test]
fn test_callback_may_drop_captured_state_after_finish() {
    init_test_logging();
    let ioc = IoContext::new();
    let payload = Arc::new(());

    let timer: PointTimer<Hours, IoContext, SteadyTimer> = PointTimer::new(&ioc, Instant::now());
    let captured = payload.clone();
    timer
        .start(move || {
            let _keep = &captured;
        })
        .unwrap();
    ioc.run();

    assert_eq!(
        Arc::strong_count(&payload),
        1,
        "A finished timer releases its callback"
    );
}
