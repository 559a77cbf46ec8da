//! Animated eyes.
//!
//! Two rounded-rectangle eyes with periodic blinks. The mood shapes the
//! lids: Tired droops the upper half, Angry cuts the inner corners,
//! Happy curves the lower edge up. The Happy cue makes the eyes hop.
//!
//! Frames are rate-limited to [`FRAME_MS`]; the tick loop may call
//! [`EyesAnimator::due`] every tick.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, PrimitiveStyle, Rectangle, RoundedRectangle, Triangle,
};

use crate::app::ports::EyesCue;
use crate::mood::Mood;

pub const FRAME_MS: u64 = 40;
const BLINK_MS: u64 = 150;
/// Gaps between blinks, cycled so the rhythm does not look mechanical.
const BLINK_GAPS_MS: [u64; 3] = [3_200, 4_700, 2_600];
const CUE_MS: u64 = 800;
const HOP_PX: i32 = 5;

const EYE_W: u32 = 32;
const EYE_H: u32 = 32;
const EYE_RADIUS: u32 = 8;
const EYE_CENTERS_X: [i32; 2] = [36, 92];
const EYE_CENTER_Y: i32 = 32;
const BLINK_H: u32 = 4;

#[derive(Debug, Clone)]
pub struct EyesAnimator {
    last_frame_ms: Option<u64>,
    next_blink_ms: u64,
    blink_until_ms: u64,
    blinks: usize,
    cue_pending: Option<EyesCue>,
    cue_until_ms: u64,
}

impl Default for EyesAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl EyesAnimator {
    pub fn new() -> Self {
        Self {
            last_frame_ms: None,
            next_blink_ms: BLINK_GAPS_MS[0],
            blink_until_ms: 0,
            blinks: 0,
            cue_pending: None,
            cue_until_ms: 0,
        }
    }

    pub fn queue_cue(&mut self, cue: EyesCue) {
        self.cue_pending = Some(cue);
    }

    /// A new frame should be drawn at `now_ms`.
    pub fn due(&self, now_ms: u64) -> bool {
        self.last_frame_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= FRAME_MS)
    }

    /// Forget the last frame time so the next call draws immediately.
    pub fn invalidate(&mut self) {
        self.last_frame_ms = None;
    }

    pub fn is_blinking(&self, now_ms: u64) -> bool {
        now_ms < self.blink_until_ms
    }

    /// Draw one full frame.
    pub fn draw<D>(&mut self, target: &mut D, mood: Mood, now_ms: u64) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.last_frame_ms = Some(now_ms);
        if let Some(EyesCue::Happy) = self.cue_pending.take() {
            self.cue_until_ms = now_ms + CUE_MS;
        }
        if now_ms >= self.next_blink_ms {
            self.blink_until_ms = now_ms + BLINK_MS;
            self.blinks += 1;
            self.next_blink_ms = now_ms + BLINK_GAPS_MS[self.blinks % BLINK_GAPS_MS.len()];
        }

        target.clear(BinaryColor::Off)?;

        let hop = if now_ms < self.cue_until_ms {
            // up on the first and third quarter of the cue
            let phase = (self.cue_until_ms - now_ms) * 4 / CUE_MS;
            if phase % 2 == 1 { -HOP_PX } else { 0 }
        } else {
            0
        };
        let blinking = self.is_blinking(now_ms);

        for (side, &cx) in EYE_CENTERS_X.iter().enumerate() {
            let h = if blinking { BLINK_H } else { EYE_H };
            let top_left = Point::new(cx - EYE_W as i32 / 2, EYE_CENTER_Y - h as i32 / 2 + hop);
            let eye = Rectangle::new(top_left, Size::new(EYE_W, h));
            let radius = if blinking { BLINK_H / 2 } else { EYE_RADIUS };
            RoundedRectangle::with_equal_corners(eye, Size::new(radius, radius))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(target)?;
            if !blinking {
                draw_lids(target, eye, mood, side == 0)?;
            }
        }
        Ok(())
    }
}

/// Cut the mood shape out of an open eye.
fn draw_lids<D>(target: &mut D, eye: Rectangle, mood: Mood, left: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let lid = PrimitiveStyle::with_fill(BinaryColor::Off);
    let top = eye.top_left.y;
    let (x0, x1) = (eye.top_left.x, eye.top_left.x + eye.size.width as i32 - 1);
    let bottom = top + eye.size.height as i32 - 1;
    match mood {
        Mood::Default => Ok(()),
        Mood::Tired => Rectangle::new(eye.top_left, Size::new(eye.size.width, eye.size.height / 2))
            .into_styled(lid)
            .draw(target),
        Mood::Angry => {
            // inner corner sits next to the nose
            let (inner, outer) = if left { (x1, x0) } else { (x0, x1) };
            Triangle::new(
                Point::new(outer, top - 1),
                Point::new(inner, top - 1),
                Point::new(inner, top + eye.size.height as i32 / 2),
            )
            .into_styled(lid)
            .draw(target)
        }
        Mood::Happy => {
            let d = eye.size.width + 8;
            let center = Point::new((x0 + x1) / 2, bottom + d as i32 / 2 - 8);
            Circle::with_center(center, d).into_styled(lid).draw(target)
        }
    }
}
