//! STM32 Blue Pill Cooperative Multitasking Demonstrator
//! =============================================================================================
//!
//! This firmware coordinates, under a preemptive priority scheduler:
//! 1. A heartbeat task logging every 200ms (relative delay)
//! 2. A blink-coordinator task logging every 250ms (absolute, drift-free delay)
//! 3. A button-handler task woken by the EXTI edge through a single-slot latch,
//!    reporting a timeout after 1s without a press
//! 4. A 500ms auto-reload software timer toggling the onboard LED
//!
//! Hardware Connections:
//!   - Onboard LED: PC13 (no external connection needed)
//!   - Button: PB1 (connect to ground when pressed, with pull-up enabled)
//!
//! Expected Behavior:
//!   - LED toggles every 500ms
//!   - Task lines are logged via defmt RTT; a press logs "Button pressed"

#![no_std]
#![no_main]

use bluepill_coord::config::BOOT_CONFIG;
use bluepill_coord::hardware::rtt_sink::RTT_SINK;
use bluepill_coord::platform::{Board, Spawners};
use coord_core::boot;
use cortex_m_rt::{ExceptionFrame, entry, exception};
use defmt::{info, panic};
use embassy_executor::{Executor, InterruptExecutor};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

static EXECUTOR_SERVICE: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_BUTTON: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_BLINK: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_THREAD: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn USART1() {
    unsafe { EXECUTOR_SERVICE.on_interrupt() }
}

#[interrupt]
unsafe fn USART2() {
    unsafe { EXECUTOR_BUTTON.on_interrupt() }
}

#[interrupt]
unsafe fn USART3() {
    unsafe { EXECUTOR_BLINK.on_interrupt() }
}

#[entry]
fn main() -> ! {
    // Lower number = more urgent
    interrupt::USART1.set_priority(Priority::P6);
    let service = EXECUTOR_SERVICE.start(interrupt::USART1);

    interrupt::USART2.set_priority(Priority::P7);
    let button = EXECUTOR_BUTTON.start(interrupt::USART2);

    interrupt::USART3.set_priority(Priority::P8);
    let blink = EXECUTOR_BLINK.start(interrupt::USART3);

    // The thread executor is the scheduler proper: `run` never returns.
    let executor = EXECUTOR_THREAD.init(Executor::new());
    executor.run(move |thread| {
        let mut board = Board::new(Spawners {
            thread,
            blink,
            button,
            service,
        });
        match boot(&mut board, &RTT_SINK, &BOOT_CONFIG) {
            Ok(report) => info!("boot report: {}", report),
            Err(e) => panic!("invalid boot configuration: {}", e),
        }
    })
}

/// Stack overflow and other hard faults: halt. Nothing is logged since the
/// stack can no longer be trusted.
#[exception]
unsafe fn HardFault(_frame: &ExceptionFrame) -> ! {
    loop {
        cortex_m::asm::nop();
    }
}
