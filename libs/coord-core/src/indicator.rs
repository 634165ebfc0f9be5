use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::timer::TimerCallback;
use crate::traits::Led;

/// Timer callback that flips the status LED on every expiry.
pub struct ToggleIndicator<M: RawMutex, L> {
    led: Mutex<M, RefCell<L>>,
}

impl<M: RawMutex, L: Led> ToggleIndicator<M, L> {
    pub const fn new(led: L) -> Self {
        Self {
            led: Mutex::new(RefCell::new(led)),
        }
    }

    pub fn with_led<R>(&self, f: impl FnOnce(&mut L) -> R) -> R {
        self.led.lock(|led| f(&mut led.borrow_mut()))
    }
}

impl<M: RawMutex, L: Led> TimerCallback for ToggleIndicator<M, L> {
    fn expired(&self) {
        self.with_led(|led| led.toggle());
    }
}
