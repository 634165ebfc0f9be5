//! Blue Pill bring-up.
//!
//! Hardware Connections:
//!   - Onboard LED: PC13 (active low, no external connection needed)
//!   - Button: PB1 to ground, internal pull-up enabled, EXTI1 on the falling edge

use coord_core::ClockSource;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use embassy_stm32::time::Hertz;

/// Pins the coordination core drives once the clocks are up.
pub struct BoardPins {
    pub led: Output<'static>,
    pub button: ExtiInput<'static>,
}

/// Clock tree for `clock`. `Internal` keeps the reset defaults (HSI 8 MHz).
pub fn rcc_config(clock: ClockSource) -> embassy_stm32::Config {
    let mut config = embassy_stm32::Config::default();
    if clock == ClockSource::ExternalPll {
        use embassy_stm32::rcc::*;
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll = Some(Pll {
            src: PllSource::HSE,
            prediv: PllPreDiv::DIV1,
            mul: PllMul::MUL9, // 8 MHz * 9 = 72 MHz
        });
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV2; // APB1 is limited to 36 MHz
        config.rcc.apb2_pre = APBPrescaler::DIV1;
    }
    config
}

/// Initialize clocks and the time driver, then claim the LED and button pins.
pub fn initialize_hardware(clock: ClockSource) -> BoardPins {
    let p = embassy_stm32::init(rcc_config(clock));

    // Initial state: High (LED off for the active-low onboard LED)
    let led = Output::new(p.PC13, Level::High, Speed::Low);
    let button = ExtiInput::new(p.PB1, p.EXTI1, Pull::Up);

    defmt::info!("clock source: {}", clock);
    BoardPins { led, button }
}
