//! "New message" animation and the static unread glyph.
//!
//! The announcement is a short, fixed sequence: the envelope hops twice
//! above a caption. Playback blocks the tick loop for
//! `ANNOUNCEMENT_FRAMES × announcement_frame_ms`; inputs sampled during
//! that time are lost.

use crate::app::ports::{ClockPort, DisplayPort};
use crate::render::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// 1-bpp bitmap, rows packed MSB-first, each row padded to a whole byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u8,
    pub height: u8,
    pub data: &'static [u8],
}

impl Bitmap {
    pub const fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Whether the pixel at (`x`, `y`) is lit. Out of range reads as off.
    pub fn pixel(&self, x: u8, y: u8) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * self.row_bytes() + x as usize / 8;
        self.data
            .get(idx)
            .is_some_and(|b| b & (0x80 >> (x % 8)) != 0)
    }
}

#[rustfmt::skip]
const ENVELOPE_DATA: [u8; 24] = [
    0xFF, 0xFF,
    0xC0, 0x03,
    0xA0, 0x05,
    0x90, 0x09,
    0x88, 0x11,
    0x84, 0x21,
    0x82, 0x41,
    0x81, 0x81,
    0x80, 0x01,
    0x80, 0x01,
    0x80, 0x01,
    0xFF, 0xFF,
];

pub const ENVELOPE: Bitmap = Bitmap {
    width: 16,
    height: 12,
    data: &ENVELOPE_DATA,
};

/// Vertical lift of the envelope per frame, in pixels. Frame 0 is the
/// resting pose used for the unread glyph.
const HOP_OFFSETS: [u8; 8] = [0, 3, 6, 3, 0, 3, 6, 0];

pub const ANNOUNCEMENT_FRAMES: usize = HOP_OFFSETS.len();

const CAPTION: &str = "New message!";
const CAPTION_Y: u8 = 40;
const GLYPH_X: u8 = (DISPLAY_WIDTH - ENVELOPE.width) / 2;
const GLYPH_Y: u8 = (DISPLAY_HEIGHT - ENVELOPE.height) / 2 - 8;

pub struct AnimationPlayer {
    frame_ms: u32,
}

impl AnimationPlayer {
    pub fn new(frame_ms: u32) -> Self {
        Self { frame_ms }
    }

    /// Play the whole announcement. Returns once the last frame has been
    /// on screen for its full duration.
    pub fn play_announcement(&self, hw: &mut (impl DisplayPort + ClockPort)) {
        for frame in 0..ANNOUNCEMENT_FRAMES {
            self.draw_frame(hw, frame);
            hw.present();
            hw.delay_ms(self.frame_ms);
        }
    }

    /// Show the resting frame as a static "you have mail" indicator.
    pub fn show_unread_glyph(&self, hw: &mut impl DisplayPort) {
        self.draw_frame(hw, 0);
        hw.present();
    }

    fn draw_frame(&self, hw: &mut impl DisplayPort, frame: usize) {
        let lift = HOP_OFFSETS[frame % ANNOUNCEMENT_FRAMES];
        hw.clear();
        hw.draw_bitmap(GLYPH_X, GLYPH_Y.saturating_sub(lift), &ENVELOPE);
        let caption_x = (DISPLAY_WIDTH - CAPTION.len() as u8 * 6) / 2;
        hw.draw_text(caption_x, CAPTION_Y, 1, CAPTION);
    }
}
