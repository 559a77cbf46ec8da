//! Screen layouts for the non-eyes display modes.
//!
//! The renderer owns no state; every call repaints the whole frame.

use core::fmt::Write;

use heapless::String;

use crate::app::ports::DisplayPort;
use crate::codec::Message;
use crate::store::Statistics;

pub const DISPLAY_WIDTH: u8 = 128;
pub const DISPLAY_HEIGHT: u8 = 64;

/// Height of one text line at size 1.
const LINE_H: u8 = 8;

pub const BANNER_TEXT: &str = "Pixelpal Ready";
const NO_MESSAGE_TEXT: &str = "No messages yet";
/// Access point the device opens for provisioning.
pub const SETUP_AP_NAME: &str = "Pixelpal-Setup";

/// Device status shown on the Debug screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusView {
    pub wifi_associated: bool,
    pub link_connected: bool,
    pub offline_events: u32,
    pub persistent: bool,
    pub uptime_s: u64,
}

#[derive(Debug, Clone, Copy)]
pub enum RenderRequest<'a> {
    Banner,
    Message(Option<&'a Message>),
    Stats(&'a Statistics),
    Status(StatusView),
    /// Blank frame, handed over to the eyes engine.
    Blank,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, hw: &mut impl DisplayPort, req: RenderRequest<'_>) {
        hw.clear();
        match req {
            RenderRequest::Banner => hw.draw_text(0, 0, 1, BANNER_TEXT),
            RenderRequest::Message(Some(msg)) => {
                hw.draw_text(msg.position.x, msg.position.y, msg.size, &msg.text);
            }
            RenderRequest::Message(None) => hw.draw_text(0, 0, 1, NO_MESSAGE_TEXT),
            RenderRequest::Stats(stats) => Self::draw_stats(hw, stats),
            RenderRequest::Status(status) => Self::draw_status(hw, &status),
            RenderRequest::Blank => {}
        }
        hw.present();
    }

    fn draw_stats(hw: &mut impl DisplayPort, stats: &Statistics) {
        let rows = [
            ("Headpats", stats.headpats),
            ("Miss you", stats.miss_you_presses),
            ("Mood swings", stats.mood_swings),
            ("Messages", stats.messages_received),
        ];
        for (i, (label, value)) in rows.into_iter().enumerate() {
            let mut line: String<32> = String::new();
            let _ = write!(line, "{}: {}", label, value);
            hw.draw_text(0, i as u8 * LINE_H * 2, 1, &line);
        }
    }

    fn draw_status(hw: &mut impl DisplayPort, status: &StatusView) {
        let mut lines: heapless::Vec<String<32>, 6> = heapless::Vec::new();
        let mut push = |args: core::fmt::Arguments<'_>| {
            let mut line = String::new();
            let _ = line.write_fmt(args);
            let _ = lines.push(line);
        };

        push(format_args!(
            "WiFi: {}",
            if status.wifi_associated { "connected" } else { "offline" }
        ));
        push(format_args!(
            "Link: {}",
            if status.link_connected { "up" } else { "down" }
        ));
        if !status.wifi_associated {
            push(format_args!("Join {}", SETUP_AP_NAME));
        }
        push(format_args!("Queued: {}", status.offline_events));
        push(format_args!("Up: {}s", status.uptime_s));
        if !status.persistent {
            push(format_args!("Storage: off"));
        }

        for (i, line) in lines.iter().enumerate() {
            hw.draw_text(0, i as u8 * LINE_H, 1, line);
        }
    }
}
