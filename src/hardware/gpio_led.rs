use coord_core::Led;
use embedded_hal::digital::StatefulOutputPin;

/// Active-low LED, like the Blue Pill's PC13.
pub struct GpioLed<P> {
    pin: P,
}

impl<P: StatefulOutputPin> GpioLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

// Pin errors are infallible on the STM32 GPIO driver.
impl<P: StatefulOutputPin> Led for GpioLed<P> {
    fn off(&mut self) {
        let _ = self.pin.set_high();
    }

    fn toggle(&mut self) {
        let _ = self.pin.toggle();
    }
}
