//! Startup sequencer.
//!
//! [`boot`] brings the system up in a fixed order against a [`Platform`], the
//! scheduler control surface the board provides:
//!
//! 1. hardware bring-up
//! 2. event latch (button pipeline only)
//! 3. indicator timer
//! 4. heartbeat task, then blink-coordinator task
//! 5. start the indicator timer, if it was created
//! 6. button-handler task and edge forwarder, if the latch was created
//!
//! Nothing here retries. Each failed step is reported through the debug sink,
//! recorded in the [`BootReport`], and skips only the steps depending on it.
//! Starting the scheduler is left to the caller.

use core::fmt::Write;

use embassy_time::Duration;
use heapless::String;

use crate::config::{BootConfig, ClockSource, ConfigError};
use crate::timer::{TimerError, TimerHandle, TimerSpec};
use crate::traits::DebugSink;

pub const HW_INITIALIZED_LINE: &str = "INFO: HW initialized\n";

/// Bytes reserved for one `WARN:` line, newline included.
const DIAGNOSTIC_CAPACITY: usize = 96;

/// Relative urgency of a task. Higher runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskPriority {
    Low = 1,
    Medium = 2,
    High = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskDescriptor {
    pub name: &'static str,
    pub priority: TaskPriority,
}

pub const HEARTBEAT: TaskDescriptor = TaskDescriptor {
    name: "heartbeat",
    priority: TaskPriority::Low,
};

pub const BLINK: TaskDescriptor = TaskDescriptor {
    name: "blink",
    priority: TaskPriority::Medium,
};

pub const BUTTON: TaskDescriptor = TaskDescriptor {
    name: "button",
    priority: TaskPriority::High,
};

/// A task to create, with its startup parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task<L> {
    Heartbeat { period: Duration },
    Blink { period: Duration },
    ButtonHandler { latch: L, timeout: Duration },
}

impl<L> Task<L> {
    pub fn descriptor(&self) -> &'static TaskDescriptor {
        match self {
            Task::Heartbeat { .. } => &HEARTBEAT,
            Task::Blink { .. } => &BLINK,
            Task::ButtonHandler { .. } => &BUTTON,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpawnFailure {
    /// The task's pool is exhausted.
    Busy,
    /// A resource the task needs is missing.
    Unavailable,
}

/// Scheduler control surface consumed by [`boot`].
pub trait Platform {
    /// Shared handle to the event latch. It is handed both to the
    /// button-handler task and to the edge source, never kept in a global by
    /// the core.
    type Latch: Copy;

    /// Clock tree, status LED and button input with interrupt-on-edge.
    fn initialize_hardware(&mut self, clock: ClockSource);

    fn create_latch(&mut self) -> Option<Self::Latch>;

    /// Create the indicator timer; the platform binds the LED toggle as its
    /// callback.
    fn create_timer(&mut self, spec: &TimerSpec) -> Result<TimerHandle, TimerError>;

    fn start_timer(&mut self, handle: TimerHandle) -> Result<(), TimerError>;

    fn spawn(&mut self, task: Task<Self::Latch>) -> Result<(), SpawnFailure>;

    /// Route button edges into `latch`.
    fn attach_edge_source(
        &mut self,
        latch: Self::Latch,
        debounce: Option<Duration>,
    ) -> Result<(), SpawnFailure>;
}

/// What came up. `false`/`None` fields are degraded subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    pub latch_created: bool,
    pub timer: Option<TimerHandle>,
    pub timer_started: bool,
    pub heartbeat: bool,
    pub blink: bool,
    pub button_handler: bool,
    pub edge_source: bool,
    /// Diagnostics emitted while booting.
    pub degraded: u8,
}

impl BootReport {
    pub fn running_tasks(&self) -> u8 {
        [self.heartbeat, self.blink, self.button_handler]
            .into_iter()
            .filter(|&up| up)
            .count() as u8
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded > 0
    }
}

/// Bring the system up. See the module docs for the order of steps.
///
/// Fails only if `config` is invalid, before any hardware is touched.
pub fn boot<P, S>(platform: &mut P, sink: &S, config: &BootConfig) -> Result<BootReport, ConfigError>
where
    P: Platform,
    S: DebugSink + ?Sized,
{
    config.validate()?;

    platform.initialize_hardware(config.clock);
    sink.emit(HW_INITIALIZED_LINE);

    let mut report = BootReport::default();

    let latch = if config.button_pipeline {
        let latch = platform.create_latch();
        if latch.is_none() {
            warn!("event latch not created");
            diagnose(sink, &mut report, format_args!("event latch not created, button handler disabled"));
        }
        latch
    } else {
        None
    };
    report.latch_created = latch.is_some();

    let spec = TimerSpec::indicator(config.indicator_period);
    report.timer = match platform.create_timer(&spec) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("indicator timer not created: {}", e);
            diagnose(sink, &mut report, format_args!("indicator timer not created: {:?}", e));
            None
        }
    };

    report.heartbeat = spawn_checked(
        platform,
        sink,
        &mut report,
        Task::Heartbeat {
            period: config.heartbeat_period,
        },
    );
    report.blink = spawn_checked(
        platform,
        sink,
        &mut report,
        Task::Blink {
            period: config.blink_period,
        },
    );

    if let Some(handle) = report.timer {
        match platform.start_timer(handle) {
            Ok(()) => report.timer_started = true,
            Err(e) => {
                warn!("indicator timer not started: {}", e);
                diagnose(sink, &mut report, format_args!("indicator timer not started: {:?}", e));
            }
        }
    }

    if let Some(latch) = latch {
        report.button_handler = spawn_checked(
            platform,
            sink,
            &mut report,
            Task::ButtonHandler {
                latch,
                timeout: config.button_timeout,
            },
        );
        if report.button_handler {
            match platform.attach_edge_source(latch, config.debounce) {
                Ok(()) => report.edge_source = true,
                Err(e) => {
                    warn!("button edges not attached: {}", e);
                    diagnose(sink, &mut report, format_args!("button edges not attached: {:?}", e));
                }
            }
        }
    }

    info!(
        "boot: {=u8} task(s) running, {=u8} degraded step(s)",
        report.running_tasks(),
        report.degraded
    );
    Ok(report)
}

fn spawn_checked<P, S>(platform: &mut P, sink: &S, report: &mut BootReport, task: Task<P::Latch>) -> bool
where
    P: Platform,
    S: DebugSink + ?Sized,
{
    let name = task.descriptor().name;
    match platform.spawn(task) {
        Ok(()) => true,
        Err(e) => {
            warn!("task {=str} not created: {}", name, e);
            diagnose(sink, report, format_args!("task {} not created: {:?}", name, e));
            false
        }
    }
}

fn diagnose<S: DebugSink + ?Sized>(sink: &S, report: &mut BootReport, args: core::fmt::Arguments<'_>) {
    report.degraded = report.degraded.saturating_add(1);
    let mut line: String<DIAGNOSTIC_CAPACITY> = String::new();
    // A piece that does not fit is dropped whole, so every diagnostic must fit.
    let _ = write!(line, "WARN: {}", args);
    let _ = line.push('\n');
    sink.emit(&line);
}
