mod common;

use std::cell::{Cell, RefCell};

use common::{Latch, Sim};
use coord_core::WaitOutcome;
use embassy_time::Duration;

const TIMEOUT: Duration = Duration::from_millis(1000);

#[test]
fn burst_of_signals_is_observed_exactly_once() {
    let latch = Latch::new();
    let outcomes: RefCell<Vec<(u64, WaitOutcome)>> = RefCell::default();
    let mut sim = Sim::new();

    for _ in 0..5 {
        latch.signal();
    }
    sim.spawn(async {
        for _ in 0..2 {
            let outcome = latch.wait(TIMEOUT).await;
            outcomes.borrow_mut().push((Sim::now_ms(), outcome));
        }
    });
    sim.run_for(Duration::from_millis(1500));

    assert_eq!(
        *outcomes.borrow(),
        vec![(0, WaitOutcome::Observed), (1000, WaitOutcome::TimedOut)]
    );
}

#[test]
fn single_signal_is_observed_once() {
    let latch = Latch::new();
    let outcomes: RefCell<Vec<WaitOutcome>> = RefCell::default();
    let mut sim = Sim::new();

    latch.signal();
    sim.spawn(async {
        for _ in 0..2 {
            outcomes.borrow_mut().push(latch.wait(TIMEOUT).await);
        }
    });
    sim.run_for(Duration::from_millis(1000));

    assert_eq!(
        *outcomes.borrow(),
        vec![WaitOutcome::Observed, WaitOutcome::TimedOut]
    );
    assert!(!latch.is_signaled());
}

#[test]
fn timeout_is_never_early_and_never_more_than_a_tick_late() {
    let latch = Latch::new();
    let done: Cell<Option<(u64, WaitOutcome)>> = Cell::new(None);
    let mut sim = Sim::new();

    // Start off the millisecond grid origin.
    sim.run_for(Duration::from_millis(37));
    let start = Sim::now_ms();
    sim.spawn(async {
        let outcome = latch.wait(Duration::from_millis(250)).await;
        done.set(Some((Sim::now_ms(), outcome)));
    });

    sim.run_for(Duration::from_millis(249));
    assert_eq!(done.get(), None);

    sim.run_for(Duration::from_millis(1));
    assert_eq!(done.get(), Some((start + 250, WaitOutcome::TimedOut)));
}

#[test]
fn signal_during_a_wait_ends_it_immediately() {
    let latch = Latch::new();
    let done: Cell<Option<(u64, WaitOutcome)>> = Cell::new(None);
    let mut sim = Sim::new();

    sim.spawn(async {
        let outcome = latch.wait(TIMEOUT).await;
        done.set(Some((Sim::now_ms(), outcome)));
    });
    sim.run_for(Duration::from_millis(400));
    assert_eq!(done.get(), None);

    latch.signal();
    sim.settle();
    assert_eq!(done.get(), Some((400, WaitOutcome::Observed)));
    assert!(!latch.is_signaled());
}
