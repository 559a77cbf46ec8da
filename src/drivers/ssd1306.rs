//! SSD1306 128×64 OLED driver (I²C, page addressing).
//!
//! Drawing happens in a RAM [`FrameBuffer`] that implements the
//! `embedded-graphics` [`DrawTarget`]; [`Ssd1306::flush`] pushes the eight
//! 128-byte pages to the panel.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_hal::i2c::I2c;

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// Control byte prefixes.
const CONTROL_CMD: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const RESUME_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
}

/// 1-bpp frame buffer in SSD1306 page layout: byte `x` of page `p` holds
/// rows `8p..8p+8`, LSB on top.
#[derive(Clone)]
pub struct FrameBuffer {
    pages: [[u8; WIDTH]; PAGES],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    pub fn clear(&mut self) {
        for page in &mut self.pages {
            page.fill(0);
        }
    }

    /// Set one pixel; out-of-bounds writes are clipped.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let bit = 1u8 << (y % 8);
        let byte = &mut self.pages[y / 8][x];
        if on {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.pages[y / 8][x] & (1 << (y % 8)) != 0
    }

    /// Number of lit pixels.
    pub fn lit(&self) -> u32 {
        self.pages
            .iter()
            .flatten()
            .map(|b| b.count_ones())
            .sum()
    }

    pub fn page(&self, index: usize) -> &[u8; WIDTH] {
        &self.pages[index]
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

pub struct Ssd1306<I2C> {
    i2c: I2C,
    addr: u8,
    buffer: FrameBuffer,
}

impl<I2C: I2c> Ssd1306<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            buffer: FrameBuffer::new(),
        }
    }

    pub fn init(&mut self) -> Result<(), I2C::Error> {
        const INIT: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80,
            cmd::SET_MUX_RATIO,
            0x3F,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14,
            cmd::SET_MEMORY_MODE,
            0x02, // page addressing
            cmd::SET_SEG_REMAP,
            cmd::SET_COM_SCAN_DEC,
            cmd::SET_COM_PINS,
            0x12,
            cmd::SET_CONTRAST,
            0xCF,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::RESUME_RAM,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ];
        for &c in INIT {
            self.command(c)?;
        }
        self.buffer.clear();
        self.flush()
    }

    fn command(&mut self, c: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, &[CONTROL_CMD, c])
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buffer
    }

    pub fn flush(&mut self) -> Result<(), I2C::Error> {
        let mut data = [0u8; WIDTH + 1];
        data[0] = CONTROL_DATA;
        for page in 0..PAGES {
            self.command(cmd::SET_PAGE_ADDR | page as u8)?;
            self.command(cmd::SET_LOW_COLUMN)?;
            self.command(cmd::SET_HIGH_COLUMN)?;
            data[1..].copy_from_slice(self.buffer.page(page));
            self.i2c.write(self.addr, &data)?;
        }
        Ok(())
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}
