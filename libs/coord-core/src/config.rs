//! Boot-time configuration.
//!
//! One value selects the board variant (clock tree, button pipeline) and
//! carries every period the tasks and the indicator timer run at.

use embassy_time::Duration;

/// Heartbeat task sleep between log lines.
pub const HEARTBEAT_PERIOD: Duration = Duration::from_millis(200);
/// Blink-coordinator cycle length.
pub const BLINK_PERIOD: Duration = Duration::from_millis(250);
/// Indicator toggle period of the auto-reload software timer.
pub const INDICATOR_PERIOD: Duration = Duration::from_millis(500);
/// Longest the button handler waits before reporting a timeout.
pub const BUTTON_TIMEOUT: Duration = Duration::from_millis(1000);

/// System clock source used during hardware bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Reset defaults: 8 MHz internal RC oscillator.
    Internal,
    /// 8 MHz external oscillator multiplied by the PLL to 72 MHz.
    ExternalPll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroHeartbeatPeriod,
    ZeroBlinkPeriod,
    ZeroIndicatorPeriod,
    ZeroButtonTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootConfig {
    pub clock: ClockSource,
    /// Create the event latch, the button-handler task and the edge forwarder.
    pub button_pipeline: bool,
    pub heartbeat_period: Duration,
    pub blink_period: Duration,
    pub indicator_period: Duration,
    pub button_timeout: Duration,
    /// Edges closer than this to the last accepted edge are dropped.
    /// `None` forwards every edge the peripheral reports.
    pub debounce: Option<Duration>,
}

impl BootConfig {
    pub const DEFAULT: Self = Self {
        clock: ClockSource::Internal,
        button_pipeline: true,
        heartbeat_period: HEARTBEAT_PERIOD,
        blink_period: BLINK_PERIOD,
        indicator_period: INDICATOR_PERIOD,
        button_timeout: BUTTON_TIMEOUT,
        debounce: None,
    };

    pub const fn with_clock(mut self, clock: ClockSource) -> Self {
        self.clock = clock;
        self
    }

    pub const fn with_button_pipeline(mut self, enabled: bool) -> Self {
        self.button_pipeline = enabled;
        self
    }

    pub const fn with_debounce(mut self, window: Option<Duration>) -> Self {
        self.debounce = window;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat_period.as_ticks() == 0 {
            return Err(ConfigError::ZeroHeartbeatPeriod);
        }
        if self.blink_period.as_ticks() == 0 {
            return Err(ConfigError::ZeroBlinkPeriod);
        }
        if self.indicator_period.as_ticks() == 0 {
            return Err(ConfigError::ZeroIndicatorPeriod);
        }
        if self.button_pipeline && self.button_timeout.as_ticks() == 0 {
            return Err(ConfigError::ZeroButtonTimeout);
        }
        Ok(())
    }
}

impl Default for BootConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
