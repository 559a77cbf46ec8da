//! GPIO input adapter.
//!
//! Samples the two buttons and the touch pad through `embedded-hal` 1.0
//! [`InputPin`]s and reports raw levels. On the device the pins are
//! `esp_idf_hal` `PinDriver`s configured by
//! [`hw_init::input_pins`](crate::drivers::hw_init::input_pins); on the host
//! they are [`SimPin`]s whose level a test or simulation sets directly.

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin};
use log::warn;

use crate::app::ports::InputPort;
use crate::interaction::InputLevels;

pub struct PinInputs<M, Y, T> {
    mode: M,
    miss_you: Y,
    touch: T,
}

impl<M, Y, T> PinInputs<M, Y, T>
where
    M: InputPin,
    Y: InputPin,
    T: InputPin,
{
    pub fn new(mode: M, miss_you: Y, touch: T) -> Self {
        Self {
            mode,
            miss_you,
            touch,
        }
    }
}

/// A failed read counts as the idle level so a flaky pin cannot fire
/// phantom presses.
fn sample<P: InputPin>(pin: &mut P, idle: bool, name: &str) -> bool {
    pin.is_high().unwrap_or_else(|e| {
        warn!("Inputs: {} read failed: {:?}", name, e);
        idle
    })
}

impl<M, Y, T> InputPort for PinInputs<M, Y, T>
where
    M: InputPin,
    Y: InputPin,
    T: InputPin,
{
    fn levels(&mut self) -> InputLevels {
        let idle = InputLevels::IDLE;
        InputLevels {
            mode_button: sample(&mut self.mode, idle.mode_button, "mode button"),
            miss_you_button: sample(&mut self.miss_you, idle.miss_you_button, "miss-you button"),
            touch: sample(&mut self.touch, idle.touch, "touch"),
        }
    }
}

// ── Simulation ────────────────────────────────────────────────

/// Input pin whose level is shared with a controlling handle.
#[derive(Debug, Clone, Default)]
pub struct SimPin(Rc<Cell<bool>>);

impl SimPin {
    pub fn new(high: bool) -> Self {
        Self(Rc::new(Cell::new(high)))
    }

    pub fn set_high(&self, high: bool) {
        self.0.set(high);
    }
}

impl ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}
