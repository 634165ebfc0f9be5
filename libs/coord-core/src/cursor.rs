//! Absolute wake-time cursor for drift-free periodic tasks.

use embassy_time::{Duration, Instant, Timer};

/// Tracks the deadline of the current cycle.
///
/// Each cycle's deadline is the previous deadline plus the period, so time
/// spent between wake-ups (logging, preemption) never accumulates. If a task
/// overruns a whole period the cursor re-anchors on `now` instead of firing a
/// burst of catch-up cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeCursor {
    deadline: Instant,
    period: Duration,
}

impl WakeCursor {
    /// Anchor a cursor at the current time.
    pub fn new(period: Duration) -> Self {
        Self::starting_at(Instant::now(), period)
    }

    pub const fn starting_at(anchor: Instant, period: Duration) -> Self {
        Self {
            deadline: anchor,
            period,
        }
    }

    /// Start of the current cycle.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Move to the next cycle given the current time and return its deadline.
    pub fn advance(&mut self, now: Instant) -> Instant {
        let next = self.deadline + self.period;
        self.deadline = if next < now { now + self.period } else { next };
        self.deadline
    }

    /// Sleep until the next cycle's deadline.
    pub async fn wait(&mut self) {
        let deadline = self.advance(Instant::now());
        Timer::at(deadline).await;
    }
}
