//! Single-slot latch handing a button event from interrupt context to the
//! button-handler task.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, with_timeout};

/// Result of a bounded wait on an [`EventLatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitOutcome {
    /// A signal was pending or arrived in time and has been consumed.
    Observed,
    /// The timeout elapsed with no signal.
    TimedOut,
}

/// Binary latch: empty or signaled.
///
/// The producer (interrupt side) only calls [`signal`](Self::signal); the
/// consumer only calls [`wait`](Self::wait). Signaling an already signaled
/// latch is a no-op, nothing is queued or counted.
pub struct EventLatch<M: RawMutex> {
    signal: Signal<M, ()>,
}

impl<M: RawMutex> EventLatch<M> {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Mark the latch signaled. Never blocks and does no logging, so it is
    /// safe from an interrupt handler.
    pub fn signal(&self) {
        self.signal.signal(());
    }

    /// Block the calling task until the latch is signaled or `timeout`
    /// elapses. A signal is consumed atomically; exactly one waiter sees it.
    pub async fn wait(&self, timeout: Duration) -> WaitOutcome {
        match with_timeout(timeout, self.signal.wait()).await {
            Ok(()) => WaitOutcome::Observed,
            Err(_) => WaitOutcome::TimedOut,
        }
    }

    /// Consume a pending signal without blocking.
    pub fn try_take(&self) -> bool {
        self.signal.try_take().is_some()
    }

    pub fn is_signaled(&self) -> bool {
        self.signal.signaled()
    }
}

impl<M: RawMutex> Default for EventLatch<M> {
    fn default() -> Self {
        Self::new()
    }
}
