use coord_core::EdgeSource;
use embedded_hal_async::digital::Wait;

/// Push button wired to ground with the pull-up enabled: a press is a
/// falling edge.
pub struct GpioButton<W> {
    pin: W,
}

impl<W: Wait> GpioButton<W> {
    pub fn new(pin: W) -> Self {
        Self { pin }
    }
}

impl<W: Wait> EdgeSource for GpioButton<W> {
    async fn wait_for_edge(&mut self) {
        // ExtiInput's error type is Infallible.
        let _ = self.pin.wait_for_falling_edge().await;
    }
}
