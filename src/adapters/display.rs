//! [`DisplayPort`] on an SSD1306 panel.
//!
//! Text uses a 5×8 mono font in a 6×8 cell, scaled by an integer factor
//! (1–4), and wraps to the left edge when the next glyph would cross the
//! right edge. Bitmaps are drawn as opaque 1-bpp images.
//!
//! I²C errors on `present` are logged and counted, never propagated.

use embedded_graphics::image::{Image, ImageRaw};
use embedded_graphics::mono_font::{ascii::FONT_5X8, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::animation::Bitmap;
use crate::app::ports::DisplayPort;
use crate::codec::{MAX_TEXT_SIZE, MIN_TEXT_SIZE};
use crate::drivers::ssd1306::{FrameBuffer, Ssd1306, HEIGHT, WIDTH};

const CELL_W: i32 = 6;
const CELL_H: i32 = 8;

/// Draw target that blows every pixel up to a `factor`×`factor` block
/// placed relative to `origin`.
struct Scaled<'a, D> {
    inner: &'a mut D,
    origin: Point,
    factor: u32,
}

impl<D> Dimensions for Scaled<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fn bounding_box(&self) -> Rectangle {
        let size = self.inner.bounding_box().size;
        Rectangle::new(Point::zero(), size / self.factor)
    }
}

impl<D> DrawTarget for Scaled<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    type Color = BinaryColor;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let f = self.factor as i32;
        for Pixel(p, color) in pixels {
            let block = Rectangle::new(
                self.origin + Point::new(p.x * f, p.y * f),
                Size::new(self.factor, self.factor),
            );
            self.inner.fill_solid(&block, color)?;
        }
        Ok(())
    }
}

/// Lay `text` out at (`x`, `y`) with scale `size`.
pub fn draw_text<D>(target: &mut D, x: u8, y: u8, size: u8, text: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let factor = size.clamp(MIN_TEXT_SIZE, MAX_TEXT_SIZE);
    let (cell_w, cell_h) = (CELL_W * i32::from(factor), CELL_H * i32::from(factor));
    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    let mut cursor = Point::new(i32::from(x), i32::from(y));
    let mut utf8 = [0u8; 4];

    for ch in text.chars() {
        if ch == '\n' {
            cursor = Point::new(0, cursor.y + cell_h);
            continue;
        }
        if cursor.x + cell_w > WIDTH as i32 {
            cursor = Point::new(0, cursor.y + cell_h);
        }
        if cursor.y >= HEIGHT as i32 {
            break;
        }
        let mut scaled = Scaled {
            inner: &mut *target,
            origin: cursor,
            factor: u32::from(factor),
        };
        Text::with_baseline(ch.encode_utf8(&mut utf8), Point::zero(), style, Baseline::Top)
            .draw(&mut scaled)?;
        cursor.x += cell_w;
    }
    Ok(())
}

pub fn draw_bitmap<D>(target: &mut D, x: u8, y: u8, bitmap: &Bitmap) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let raw = ImageRaw::<BinaryColor>::new(bitmap.data, u32::from(bitmap.width));
    Image::new(&raw, Point::new(i32::from(x), i32::from(y))).draw(target)
}

pub struct OledDisplay<I2C> {
    panel: Ssd1306<I2C>,
    failed_flushes: u32,
}

impl<I2C: I2c> OledDisplay<I2C> {
    /// Wrap an initialised panel.
    pub fn new(panel: Ssd1306<I2C>) -> Self {
        Self {
            panel,
            failed_flushes: 0,
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        self.panel.buffer()
    }

    pub fn frame_mut(&mut self) -> &mut FrameBuffer {
        self.panel.buffer_mut()
    }

    pub fn failed_flushes(&self) -> u32 {
        self.failed_flushes
    }
}

impl<I2C: I2c> DisplayPort for OledDisplay<I2C> {
    fn clear(&mut self) {
        self.panel.buffer_mut().clear();
    }

    fn draw_text(&mut self, x: u8, y: u8, size: u8, text: &str) {
        let Ok(()) = draw_text(self.panel.buffer_mut(), x, y, size, text);
    }

    fn draw_bitmap(&mut self, x: u8, y: u8, bitmap: &Bitmap) {
        let Ok(()) = draw_bitmap(self.panel.buffer_mut(), x, y, bitmap);
    }

    fn present(&mut self) {
        if let Err(e) = self.panel.flush() {
            self.failed_flushes = self.failed_flushes.saturating_add(1);
            if self.failed_flushes == 1 || self.failed_flushes % 100 == 0 {
                warn!("Display: flush failed ({:?}), {} so far", e, self.failed_flushes);
            }
        } else {
            debug!("Display: frame presented");
        }
    }
}
