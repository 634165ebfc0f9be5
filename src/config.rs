//! Board variant, picked at build time with Cargo features:
//!
//! - `hse-pll`: external 8 MHz crystal through the PLL (72 MHz SYSCLK)
//! - `button`: button latch, handler task and edge forwarder (default)

use coord_core::{BootConfig, ClockSource};

pub const BOOT_CONFIG: BootConfig = BootConfig::DEFAULT
    .with_clock(if cfg!(feature = "hse-pll") {
        ClockSource::ExternalPll
    } else {
        ClockSource::Internal
    })
    .with_button_pipeline(cfg!(feature = "button"));

/// Software timers the service can hold; only the indicator uses one.
pub const TIMER_SLOTS: usize = 2;
