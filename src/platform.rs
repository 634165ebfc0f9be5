//! [`Platform`] implementation for the Blue Pill.
//!
//! Task priorities map onto executors:
//!
//! | executor                  | runs                                  |
//! |---------------------------|---------------------------------------|
//! | thread mode               | heartbeat                             |
//! | `USART3` interrupt, P8    | blink coordinator                     |
//! | `USART2` interrupt, P7    | button handler                        |
//! | `USART1` interrupt, P6    | timer service, button edge forwarder  |
//!
//! A higher interrupt executor preempts everything below it, so a ready
//! higher-priority task always runs first.

use coord_core::boot::{Platform, SpawnFailure, Task};
use coord_core::timer::{TimerError, TimerHandle, TimerSpec};
use coord_core::{ClockSource, EventLatch, Led, TimerService, ToggleIndicator};
use embassy_executor::{SendSpawner, Spawner};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Duration;
use static_cell::StaticCell;

use crate::board;
use crate::hardware::gpio_button::GpioButton;
use crate::hardware::gpio_led::GpioLed;
use crate::hardware::rtt_sink::RTT_SINK;
use crate::tasks::{
    BoardTimers, ButtonLatch, blink_task, button_task, edge_task, heartbeat_task,
    timer_service_task,
};

type Indicator = ToggleIndicator<CriticalSectionRawMutex, GpioLed<Output<'static>>>;

static TIMERS: BoardTimers = TimerService::new();
static INDICATOR: StaticCell<Indicator> = StaticCell::new();
static LATCH: StaticCell<ButtonLatch> = StaticCell::new();

/// One spawner per priority level.
#[derive(Clone, Copy)]
pub struct Spawners {
    pub thread: Spawner,
    pub blink: SendSpawner,
    pub button: SendSpawner,
    pub service: SendSpawner,
}

pub struct Board {
    spawners: Spawners,
    led: Option<Output<'static>>,
    button: Option<ExtiInput<'static>>,
    timer_service_running: bool,
}

impl Board {
    pub fn new(spawners: Spawners) -> Self {
        Self {
            spawners,
            led: None,
            button: None,
            timer_service_running: false,
        }
    }
}

impl Platform for Board {
    type Latch = &'static ButtonLatch;

    fn initialize_hardware(&mut self, clock: ClockSource) {
        let pins = board::initialize_hardware(clock);
        self.led = Some(pins.led);
        self.button = Some(pins.button);
    }

    fn create_latch(&mut self) -> Option<Self::Latch> {
        LATCH.try_init(EventLatch::new()).map(|latch| &*latch)
    }

    fn create_timer(&mut self, spec: &TimerSpec) -> Result<TimerHandle, TimerError> {
        // The LED and the indicator cell can be claimed once only.
        TIMERS.can_create(spec)?;
        if !self.timer_service_running {
            self.spawners
                .service
                .spawn(timer_service_task(&TIMERS))
                .map_err(|_| TimerError::ServiceUnavailable)?;
            self.timer_service_running = true;
        }
        let mut led = GpioLed::new(self.led.take().ok_or(TimerError::CallbackUnavailable)?);
        led.off();
        let indicator = INDICATOR
            .try_init(ToggleIndicator::new(led))
            .ok_or(TimerError::CallbackUnavailable)?;
        TIMERS.create(*spec, indicator)
    }

    fn start_timer(&mut self, handle: TimerHandle) -> Result<(), TimerError> {
        TIMERS.start(handle)
    }

    fn spawn(&mut self, task: Task<Self::Latch>) -> Result<(), SpawnFailure> {
        let spawned = match task {
            Task::Heartbeat { period } => self.spawners.thread.spawn(heartbeat_task(&RTT_SINK, period)),
            Task::Blink { period } => self.spawners.blink.spawn(blink_task(&RTT_SINK, period)),
            Task::ButtonHandler { latch, timeout } => self
                .spawners
                .button
                .spawn(button_task(latch, &RTT_SINK, timeout)),
        };
        spawned.map_err(|_| SpawnFailure::Busy)
    }

    fn attach_edge_source(
        &mut self,
        latch: Self::Latch,
        debounce: Option<Duration>,
    ) -> Result<(), SpawnFailure> {
        let button = self.button.take().ok_or(SpawnFailure::Unavailable)?;
        self.spawners
            .service
            .spawn(edge_task(GpioButton::new(button), latch, debounce))
            .map_err(|_| SpawnFailure::Busy)
    }
}
