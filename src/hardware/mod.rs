pub mod gpio_button;
pub mod gpio_led;
pub mod rtt_sink;
