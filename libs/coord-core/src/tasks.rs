//! Task bodies. Each one loops forever; the board wraps them in
//! `#[embassy_executor::task]` functions bound to concrete types.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant, Timer};

use crate::cursor::WakeCursor;
use crate::latch::{EventLatch, WaitOutcome};
use crate::traits::{DebugSink, EdgeSource};

pub const HEARTBEAT_LINE: &str = "Heartbeat\n";
pub const BLINK_LINE: &str = "Blink\n";
pub const BUTTON_PRESSED_LINE: &str = "Button pressed\n";
pub const BUTTON_TIMEOUT_LINE: &str = "Button time out\n";

/// Heartbeat Task
///
/// Logs, then sleeps `period` relative to the end of the log. Drift is
/// accepted here.
pub async fn heartbeat<S: DebugSink + ?Sized>(sink: &S, period: Duration) {
    loop {
        sink.emit(HEARTBEAT_LINE);
        Timer::after(period).await;
    }
}

/// Blink-Coordinator Task
///
/// Runs on absolute deadlines so each cycle starts exactly one `period`
/// after the previous one, whatever the logging cost.
pub async fn blink_coordinator<S: DebugSink + ?Sized>(sink: &S, period: Duration) {
    let mut cursor = WakeCursor::new(period);
    loop {
        sink.emit(BLINK_LINE);
        cursor.wait().await;
    }
}

/// Button-Handler Task
///
/// Never blocks longer than `timeout`, so a timeout line doubles as liveness
/// evidence when nobody presses the button.
pub async fn button_handler<M, S>(latch: &EventLatch<M>, sink: &S, timeout: Duration)
where
    M: RawMutex,
    S: DebugSink + ?Sized,
{
    loop {
        match latch.wait(timeout).await {
            WaitOutcome::Observed => sink.emit(BUTTON_PRESSED_LINE),
            WaitOutcome::TimedOut => sink.emit(BUTTON_TIMEOUT_LINE),
        }
    }
}

/// Interrupt side of the button pipeline: every accepted edge signals the
/// latch and nothing else.
///
/// With `debounce` set, edges arriving within the window after the last
/// accepted edge are dropped.
pub async fn forward_edges<M, E>(mut edges: E, latch: &EventLatch<M>, debounce: Option<Duration>)
where
    M: RawMutex,
    E: EdgeSource,
{
    let mut last_accepted: Option<Instant> = None;
    loop {
        edges.wait_for_edge().await;
        let now = Instant::now();
        if let (Some(window), Some(last)) = (debounce, last_accepted) {
            if now.duration_since(last) < window {
                continue;
            }
        }
        last_accepted = Some(now);
        latch.signal();
    }
}
