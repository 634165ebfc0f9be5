//! Software timer service.
//!
//! Timers are registered with [`TimerService::create`] and controlled through a
//! small command queue ([`start`](TimerService::start),
//! [`stop`](TimerService::stop)). Callbacks never run in the caller's context:
//! they run inside [`TimerService::run`], which the board spawns as its own
//! task and which therefore forms the timer-service context. Callbacks must be
//! short and must not block.

use core::cell::RefCell;

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;

/// Pending start/stop commands the service can hold before `start` fails.
pub const COMMAND_QUEUE_LEN: usize = 4;

/// Work performed when a timer expires.
pub trait TimerCallback {
    fn expired(&self);
}

impl<F: Fn()> TimerCallback for F {
    fn expired(&self) {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerSpec {
    pub name: &'static str,
    pub period: Duration,
    /// Re-arm after every expiry instead of going dormant.
    pub auto_reload: bool,
}

impl TimerSpec {
    /// The LED indicator timer: auto-reload, no per-timer context.
    pub const fn indicator(period: Duration) -> Self {
        Self {
            name: "indicator",
            period,
            auto_reload: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerHandle(u8);

impl TimerHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    ZeroPeriod,
    /// Every slot of the service is taken.
    RegistryFull,
    InvalidHandle,
    /// The command could not be queued without waiting.
    QueueFull,
    /// The timer-service task could not be started.
    ServiceUnavailable,
    /// The platform had nothing to bind the callback to.
    CallbackUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start(TimerHandle),
    Stop(TimerHandle),
}

struct Slot<'a> {
    spec: TimerSpec,
    callback: &'a (dyn TimerCallback + Sync),
    deadline: Option<Instant>,
}

/// Registry of up to `N` software timers plus their command queue.
pub struct TimerService<'a, M: RawMutex, const N: usize> {
    slots: Mutex<M, RefCell<Vec<Slot<'a>, N>>>,
    commands: Channel<M, Command, COMMAND_QUEUE_LEN>,
}

impl<'a, M: RawMutex, const N: usize> TimerService<'a, M, N> {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new(Vec::new())),
            commands: Channel::new(),
        }
    }

    /// Whether `create` would accept `spec` right now. Lets a caller check
    /// before giving up a resource the callback owns.
    pub fn can_create(&self, spec: &TimerSpec) -> Result<(), TimerError> {
        if spec.period.as_ticks() == 0 {
            return Err(TimerError::ZeroPeriod);
        }
        if self.len() >= N.min(usize::from(u8::MAX) + 1) {
            return Err(TimerError::RegistryFull);
        }
        Ok(())
    }

    /// Register a dormant timer. Nothing runs until it is started.
    pub fn create(
        &self,
        spec: TimerSpec,
        callback: &'a (dyn TimerCallback + Sync),
    ) -> Result<TimerHandle, TimerError> {
        self.can_create(&spec)?;
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            let index = u8::try_from(slots.len()).map_err(|_| TimerError::RegistryFull)?;
            slots
                .push(Slot {
                    spec,
                    callback,
                    deadline: None,
                })
                .map_err(|_| TimerError::RegistryFull)?;
            Ok(TimerHandle(index))
        })
    }

    /// Queue a start command; the first expiry is one period after the
    /// service processes it. Never waits for queue space.
    pub fn start(&self, handle: TimerHandle) -> Result<(), TimerError> {
        self.send(Command::Start(handle))
    }

    pub fn stop(&self, handle: TimerHandle) -> Result<(), TimerError> {
        self.send(Command::Stop(handle))
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.slots.lock(|slots| {
            slots
                .borrow()
                .get(handle.index())
                .is_some_and(|slot| slot.deadline.is_some())
        })
    }

    pub fn len(&self) -> usize {
        self.slots.lock(|slots| slots.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn send(&self, command: Command) -> Result<(), TimerError> {
        let (Command::Start(handle) | Command::Stop(handle)) = command;
        if handle.index() >= self.len() {
            return Err(TimerError::InvalidHandle);
        }
        self.commands
            .try_send(command)
            .map_err(|_| TimerError::QueueFull)
    }

    /// Timer-service loop. Sleeps until the earliest armed deadline or the next
    /// command, whichever comes first. Never returns.
    pub async fn run(&self) {
        loop {
            let command = match self.next_deadline() {
                Some(at) => match select(self.commands.receive(), Timer::at(at)).await {
                    Either::First(command) => Some(command),
                    Either::Second(()) => None,
                },
                None => Some(self.commands.receive().await),
            };
            match command {
                Some(command) => self.apply(command, Instant::now()),
                None => self.fire_expired(Instant::now()),
            }
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.slots
            .lock(|slots| slots.borrow().iter().filter_map(|slot| slot.deadline).min())
    }

    fn apply(&self, command: Command, now: Instant) {
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            match command {
                Command::Start(handle) => {
                    if let Some(slot) = slots.get_mut(handle.index()) {
                        slot.deadline = Some(now + slot.spec.period);
                        debug!("timer {=str} armed", slot.spec.name);
                    }
                }
                Command::Stop(handle) => {
                    if let Some(slot) = slots.get_mut(handle.index()) {
                        slot.deadline = None;
                    }
                }
            }
        });
    }

    fn fire_expired(&self, now: Instant) {
        let due = self.slots.lock(|slots| {
            let mut due: Vec<&'a (dyn TimerCallback + Sync), N> = Vec::new();
            for slot in slots.borrow_mut().iter_mut() {
                let Some(deadline) = slot.deadline else {
                    continue;
                };
                if deadline > now {
                    continue;
                }
                slot.deadline = if slot.spec.auto_reload {
                    let next = deadline + slot.spec.period;
                    Some(if next <= now { now + slot.spec.period } else { next })
                } else {
                    None
                };
                // Capacity equals the slot count, so this cannot fail.
                let _ = due.push(slot.callback);
            }
            due
        });

        // Run callbacks outside the lock so they may use the service.
        for callback in due {
            callback.expired();
        }
    }
}

impl<M: RawMutex, const N: usize> Default for TimerService<'_, M, N> {
    fn default() -> Self {
        Self::new()
    }
}
