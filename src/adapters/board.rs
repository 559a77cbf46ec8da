//! The physical board as one value.
//!
//! [`AppService::tick`](crate::app::service::AppService::tick) takes a
//! single `&mut B` that satisfies every local port. `Board` bundles the
//! OLED, the eyes animator, the input pins, the clock and the RNG so the
//! display can be shared between the renderer and the eyes engine.

use embedded_hal::digital::InputPin;
use embedded_hal::i2c::I2c;

use super::display::OledDisplay;
use super::eyes::EyesAnimator;
use super::inputs::PinInputs;
use super::random::HwRandom;
use super::time::SystemClock;
use crate::animation::Bitmap;
use crate::app::ports::{ClockPort, DisplayPort, EyesCue, EyesPort, InputPort, RandomPort};
use crate::interaction::InputLevels;
use crate::mood::Mood;

pub struct Board<I2C, M, Y, T> {
    display: OledDisplay<I2C>,
    eyes: EyesAnimator,
    inputs: PinInputs<M, Y, T>,
    clock: SystemClock,
    rng: HwRandom,
}

impl<I2C, M, Y, T> Board<I2C, M, Y, T>
where
    I2C: I2c,
    M: InputPin,
    Y: InputPin,
    T: InputPin,
{
    pub fn new(
        display: OledDisplay<I2C>,
        inputs: PinInputs<M, Y, T>,
        clock: SystemClock,
        rng: HwRandom,
    ) -> Self {
        Self {
            display,
            eyes: EyesAnimator::new(),
            inputs,
            clock,
            rng,
        }
    }

    pub fn display(&self) -> &OledDisplay<I2C> {
        &self.display
    }
}

impl<I2C: I2c, M, Y, T> DisplayPort for Board<I2C, M, Y, T> {
    fn clear(&mut self) {
        self.eyes.invalidate();
        self.display.clear();
    }

    fn draw_text(&mut self, x: u8, y: u8, size: u8, text: &str) {
        self.display.draw_text(x, y, size, text);
    }

    fn draw_bitmap(&mut self, x: u8, y: u8, bitmap: &Bitmap) {
        self.display.draw_bitmap(x, y, bitmap);
    }

    fn present(&mut self) {
        self.display.present();
    }
}

impl<I2C: I2c, M, Y, T> EyesPort for Board<I2C, M, Y, T> {
    fn advance(&mut self, mood: Mood, now_ms: u64) {
        if !self.eyes.due(now_ms) {
            return;
        }
        let Ok(()) = self.eyes.draw(self.display.frame_mut(), mood, now_ms);
        self.display.present();
    }

    fn play_cue(&mut self, cue: EyesCue) {
        self.eyes.queue_cue(cue);
    }
}

impl<I2C, M, Y, T> InputPort for Board<I2C, M, Y, T>
where
    M: InputPin,
    Y: InputPin,
    T: InputPin,
{
    fn levels(&mut self) -> InputLevels {
        self.inputs.levels()
    }
}

impl<I2C, M, Y, T> ClockPort for Board<I2C, M, Y, T> {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn hour_of_day(&self) -> Option<u8> {
        self.clock.hour_of_day()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }
}

impl<I2C, M, Y, T> RandomPort for Board<I2C, M, Y, T> {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }
}
