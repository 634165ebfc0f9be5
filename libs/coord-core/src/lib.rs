//! Coordination core for the Blue Pill multitasking demonstrator.
//!
//! Everything in here is board independent so it can be exercised by host-side
//! tests: the event latch bridging interrupt and task context, the software
//! timer service, the three periodic task bodies and the boot sequencer. The
//! firmware crate supplies the [`boot::Platform`] implementation, the debug
//! sink and the LED / button drivers.

#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod boot;
pub mod config;
pub mod cursor;
pub mod indicator;
pub mod latch;
pub mod tasks;
pub mod timer;
pub mod traits;

pub use boot::{BootReport, Platform, SpawnFailure, Task, TaskDescriptor, TaskPriority, boot};
pub use config::{BootConfig, ClockSource, ConfigError};
pub use cursor::WakeCursor;
pub use indicator::ToggleIndicator;
pub use latch::{EventLatch, WaitOutcome};
pub use timer::{TimerCallback, TimerError, TimerHandle, TimerService, TimerSpec};
pub use traits::{DebugSink, EdgeSource, Led};
