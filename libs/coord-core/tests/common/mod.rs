//! Deterministic host harness: a mock clock stepped one millisecond at a time
//! and a poll loop standing in for the executor.

#![allow(dead_code)]

use std::cell::RefCell;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard};
use std::task::{Context, Waker};

use coord_core::boot::{Platform, SpawnFailure, Task};
use coord_core::config::ClockSource;
use coord_core::tasks;
use coord_core::timer::{TimerError, TimerHandle, TimerService, TimerSpec};
use coord_core::{DebugSink, EdgeSource, EventLatch, Led, ToggleIndicator};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, MockDriver};

pub type Latch = EventLatch<CriticalSectionRawMutex>;
pub type Indicator = ToggleIndicator<CriticalSectionRawMutex, FakeLed>;
pub type Timers = TimerService<'static, CriticalSectionRawMutex, 2>;

/// Timer callbacks are registered for the life of the program; tests leak
/// them the same way the board keeps them in statics.
pub fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

/// The mock driver is process global; simulations must not overlap.
static CLOCK: Mutex<()> = Mutex::new(());

/// Polls per millisecond step, enough for a wake to ripple through a
/// signal, a forwarder and a waiting task.
const SETTLE_PASSES: usize = 4;

pub struct Sim<'a> {
    // Finished tasks are dropped so they are never polled again.
    tasks: Vec<Option<Pin<Box<dyn Future<Output = ()> + 'a>>>>,
    _clock: MutexGuard<'static, ()>,
}

impl<'a> Sim<'a> {
    pub fn new() -> Self {
        let clock = CLOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        MockDriver::get().reset();
        Self {
            tasks: Vec::new(),
            _clock: clock,
        }
    }

    pub fn spawn(&mut self, task: impl Future<Output = ()> + 'a) {
        self.tasks.push(Some(Box::pin(task)));
    }

    pub fn now_ms() -> u64 {
        Instant::now().as_millis()
    }

    /// Poll every task until nothing else can make progress at this instant.
    pub fn settle(&mut self) {
        let mut cx = Context::from_waker(Waker::noop());
        for _ in 0..SETTLE_PASSES {
            for slot in self.tasks.iter_mut() {
                if let Some(task) = slot {
                    if task.as_mut().poll(&mut cx).is_ready() {
                        *slot = None;
                    }
                }
            }
        }
    }

    /// Advance the clock to `now + duration`, settling at every millisecond
    /// boundary on the way.
    pub fn run_for(&mut self, duration: Duration) {
        self.settle();
        let target = Instant::now().as_micros() + duration.as_micros();
        loop {
            let now = Instant::now().as_micros();
            if now >= target {
                break;
            }
            let next = (now / 1000 + 1) * 1000;
            MockDriver::get().advance(Duration::from_micros(next.min(target) - now));
            self.settle();
        }
    }
}

/// Sink recording each line with the millisecond it was emitted at.
#[derive(Default)]
pub struct RecordingSink {
    lines: RefCell<Vec<(u64, String)>>,
    /// Simulated cost of emitting one line.
    jitter: Option<Duration>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jitter(jitter: Duration) -> Self {
        Self {
            lines: RefCell::default(),
            jitter: Some(jitter),
        }
    }

    /// Timestamps (ms) of every line equal to `line`.
    pub fn times_of(&self, line: &str) -> Vec<u64> {
        self.lines
            .borrow()
            .iter()
            .filter(|(_, text)| text == line)
            .map(|(at, _)| *at)
            .collect()
    }

    pub fn count_before(&self, line: &str, before_ms: u64) -> usize {
        self.times_of(line).into_iter().filter(|&at| at < before_ms).count()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.starts_with("WARN:"))
            .collect()
    }
}

impl DebugSink for RecordingSink {
    fn emit(&self, text: &str) {
        self.lines
            .borrow_mut()
            .push((Instant::now().as_millis(), text.to_string()));
        if let Some(jitter) = self.jitter {
            MockDriver::get().advance(jitter);
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeLed {
    pub lit: bool,
    pub toggles: u32,
}

impl Led for FakeLed {
    fn off(&mut self) {
        self.lit = false;
    }

    fn toggle(&mut self) {
        self.lit = !self.lit;
        self.toggles += 1;
    }
}

/// Button input fed by the test: `press()` plays the peripheral raising an
/// edge interrupt.
pub struct FakeButton {
    edge: Signal<CriticalSectionRawMutex, ()>,
}

impl FakeButton {
    pub const fn new() -> Self {
        Self { edge: Signal::new() }
    }

    pub fn press(&self) {
        self.edge.signal(());
    }

    pub fn edges(&self) -> FakeEdges<'_> {
        FakeEdges { button: self }
    }
}

pub struct FakeEdges<'a> {
    button: &'a FakeButton,
}

impl EdgeSource for FakeEdges<'_> {
    async fn wait_for_edge(&mut self) {
        self.button.edge.wait().await;
    }
}

/// Platform spawning everything into a [`Sim`], with switches to make each
/// creation step fail.
pub struct SimPlatform<'s, 'a> {
    pub sim: &'s mut Sim<'a>,
    pub sink: &'a RecordingSink,
    pub latch: &'a Latch,
    pub timers: &'a Timers,
    pub indicator: &'static Indicator,
    pub button: &'a FakeButton,
    pub clock: Option<ClockSource>,
    pub fail_latch: bool,
    pub fail_timer: bool,
    pub fail_timer_start: bool,
    pub fail_edges: bool,
    pub fail_task: Option<&'static str>,
    pub spawned: Vec<&'static str>,
    daemon_running: bool,
}

impl<'s, 'a> SimPlatform<'s, 'a> {
    pub fn new(
        sim: &'s mut Sim<'a>,
        sink: &'a RecordingSink,
        latch: &'a Latch,
        timers: &'a Timers,
        indicator: &'static Indicator,
        button: &'a FakeButton,
    ) -> Self {
        Self {
            sim,
            sink,
            latch,
            timers,
            indicator,
            button,
            clock: None,
            fail_latch: false,
            fail_timer: false,
            fail_timer_start: false,
            fail_edges: false,
            fail_task: None,
            spawned: Vec::new(),
            daemon_running: false,
        }
    }
}

impl<'a> Platform for SimPlatform<'_, 'a> {
    type Latch = &'a Latch;

    fn initialize_hardware(&mut self, clock: ClockSource) {
        self.clock = Some(clock);
        self.indicator.with_led(|led| led.off());
    }

    fn create_latch(&mut self) -> Option<Self::Latch> {
        if self.fail_latch {
            None
        } else {
            Some(self.latch)
        }
    }

    fn create_timer(&mut self, spec: &TimerSpec) -> Result<TimerHandle, TimerError> {
        if self.fail_timer {
            return Err(TimerError::ServiceUnavailable);
        }
        if !self.daemon_running {
            let timers = self.timers;
            self.sim.spawn(timers.run());
            self.daemon_running = true;
        }
        self.timers.create(*spec, self.indicator)
    }

    fn start_timer(&mut self, handle: TimerHandle) -> Result<(), TimerError> {
        if self.fail_timer_start {
            return Err(TimerError::QueueFull);
        }
        self.timers.start(handle)
    }

    fn spawn(&mut self, task: Task<Self::Latch>) -> Result<(), SpawnFailure> {
        let name = task.descriptor().name;
        if self.fail_task == Some(name) {
            return Err(SpawnFailure::Busy);
        }
        let sink = self.sink;
        match task {
            Task::Heartbeat { period } => self.sim.spawn(tasks::heartbeat(sink, period)),
            Task::Blink { period } => self.sim.spawn(tasks::blink_coordinator(sink, period)),
            Task::ButtonHandler { latch, timeout } => {
                self.sim.spawn(tasks::button_handler(latch, sink, timeout))
            }
        }
        self.spawned.push(name);
        Ok(())
    }

    fn attach_edge_source(
        &mut self,
        latch: Self::Latch,
        debounce: Option<Duration>,
    ) -> Result<(), SpawnFailure> {
        if self.fail_edges {
            return Err(SpawnFailure::Unavailable);
        }
        self.sim
            .spawn(tasks::forward_edges(self.button.edges(), latch, debounce));
        self.spawned.push("edges");
        Ok(())
    }
}
