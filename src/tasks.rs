//! Executor tasks. Each one binds a coordination-core body to the board's
//! concrete types; see `platform` for which executor runs which task.

use coord_core::{EventLatch, TimerService, tasks};
use embassy_stm32::exti::ExtiInput;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Duration;

use crate::config::TIMER_SLOTS;
use crate::hardware::gpio_button::GpioButton;
use crate::hardware::rtt_sink::RttSink;

pub type ButtonLatch = EventLatch<CriticalSectionRawMutex>;
pub type BoardTimers = TimerService<'static, CriticalSectionRawMutex, TIMER_SLOTS>;

/// Heartbeat Task
///
/// Lowest priority; logs every `period`.
#[embassy_executor::task]
pub async fn heartbeat_task(sink: &'static RttSink, period: Duration) {
    tasks::heartbeat(sink, period).await
}

/// Blink-Coordinator Task
#[embassy_executor::task]
pub async fn blink_task(sink: &'static RttSink, period: Duration) {
    tasks::blink_coordinator(sink, period).await
}

/// Button-Handler Task
///
/// Responsibilities:
/// 1. Wait on the button latch for at most `timeout`
/// 2. Log a press or a timeout, whichever came first
#[embassy_executor::task]
pub async fn button_task(latch: &'static ButtonLatch, sink: &'static RttSink, timeout: Duration) {
    tasks::button_handler(latch, sink, timeout).await
}

/// Runs at interrupt priority and only ever signals the latch.
#[embassy_executor::task]
pub async fn edge_task(
    button: GpioButton<ExtiInput<'static>>,
    latch: &'static ButtonLatch,
    debounce: Option<Duration>,
) {
    tasks::forward_edges(button, latch, debounce).await
}

/// Timer-service context: software timer callbacks run here.
#[embassy_executor::task]
pub async fn timer_service_task(timers: &'static BoardTimers) {
    timers.run().await
}
