//! Display mode controller.
//!
//! ```text
//!   Eyes ──btn──▶ Message ──btn──▶ Stats ──btn──▶ Debug ──btn──▶ Eyes
//!     any ──ForceMessage──▶ Message        any ──ForceDebug──▶ Debug
//! ```
//!
//! The button walks `DeviceState::cycle`; a [`ForceOverride`] only moves
//! the displayed mode, is consumed by exactly one [`ModeController::tick`]
//! and leaves the cycle where it was.

use log::info;

use crate::animation::AnimationPlayer;
use crate::app::ports::{ClockPort, DisplayPort, EyesPort, StoragePort};
use crate::codec::Message;
use crate::config::DeviceConfig;
use crate::error::Result;
use crate::render::{RenderRequest, Renderer, StatusView};
use crate::state::DeviceState;
use crate::store::{Counter, PersistentStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DisplayMode {
    Eyes = 0,
    Message = 1,
    Stats = 2,
    Debug = 3,
}

impl DisplayMode {
    pub const COUNT: usize = 4;
    pub const ALL: [Self; Self::COUNT] = [Self::Eyes, Self::Message, Self::Stats, Self::Debug];

    /// Next mode in button order.
    pub fn next(self) -> Self {
        Self::from_index(self as usize + 1)
    }

    /// Mode at `index` in cycle order, wrapping.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Eyes => "eyes",
            Self::Message => "message",
            Self::Stats => "stats",
            Self::Debug => "debug",
        }
    }
}

/// One-shot jump to a specific mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForceOverride {
    #[default]
    None,
    ForceMessage,
    ForceDebug,
}

impl ForceOverride {
    pub fn is_pending(self) -> bool {
        self != Self::None
    }

    pub fn target(self) -> Option<DisplayMode> {
        match self {
            Self::None => None,
            Self::ForceMessage => Some(DisplayMode::Message),
            Self::ForceDebug => Some(DisplayMode::Debug),
        }
    }

    /// Consume the override, leaving `None` behind.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

/// What one [`ModeController::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeTick {
    /// `(from, to)` when an override was applied.
    pub forced: Option<(DisplayMode, DisplayMode)>,
    /// The unread message was acknowledged and announced.
    pub acknowledged: bool,
}

pub struct ModeController {
    stats_refresh_ms: u64,
    renderer: Renderer,
    animation: AnimationPlayer,
}

impl ModeController {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            stats_refresh_ms: u64::from(config.stats_refresh_ms),
            renderer: Renderer::new(),
            animation: AnimationPlayer::new(config.announcement_frame_ms),
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Handle a debounced mode-button press. A pending override is kept.
    pub fn advance_mode(&self, state: &mut DeviceState) -> DisplayMode {
        let next = state.cycle.next();
        state.cycle = next;
        Self::show(state, next);
        next
    }

    /// Record a freshly decoded network message.
    ///
    /// In-memory state is updated even when persisting fails; the first
    /// storage error is returned for logging.
    pub fn on_message_arrived<S: StoragePort>(
        &self,
        state: &mut DeviceState,
        store: &mut PersistentStore<S>,
        msg: Message,
        force_switch: bool,
    ) -> Result<()> {
        let saved_msg = store.save_last_message(&msg);
        state.message = Some(msg);
        state.unread = true;
        state.stats.bump(Counter::MessagesReceived);
        let saved_stats = store.save_stats(&state.stats);
        if force_switch {
            state.force = ForceOverride::ForceMessage;
        }
        state.redraw = true;
        saved_msg.and(saved_stats)
    }

    /// Run the display side of one tick.
    ///
    /// `ack` is a touch that started this tick while the Message screen
    /// was showing.
    pub fn tick<H>(&self, state: &mut DeviceState, ack: bool, now_ms: u64, hw: &mut H) -> ModeTick
    where
        H: DisplayPort + EyesPort + ClockPort,
    {
        let mut out = ModeTick::default();

        if let Some(target) = state.force.take().target() {
            let from = state.mode;
            Self::show(state, target);
            out.forced = Some((from, target));
            info!("Mode: override {} -> {}", from.name(), target.name());
            self.repaint(state, now_ms, hw);
            return out;
        }

        match state.mode {
            DisplayMode::Message => {
                if ack && state.unread {
                    state.unread = false;
                    out.acknowledged = true;
                    self.animation.play_announcement(hw);
                    self.repaint(state, now_ms, hw);
                } else if state.redraw {
                    self.repaint(state, now_ms, hw);
                }
            }
            DisplayMode::Stats | DisplayMode::Debug => {
                let due = state
                    .last_refresh_ms
                    .is_none_or(|last| now_ms.saturating_sub(last) >= self.stats_refresh_ms);
                if due || state.redraw {
                    self.repaint(state, now_ms, hw);
                }
            }
            DisplayMode::Eyes => {
                if state.redraw {
                    self.repaint(state, now_ms, hw);
                }
                hw.advance(state.mood.current, now_ms);
            }
        }
        out
    }

    /// Paint the screen for the current mode unconditionally.
    fn repaint<H: DisplayPort>(&self, state: &mut DeviceState, now_ms: u64, hw: &mut H) {
        state.redraw = false;
        match state.mode {
            DisplayMode::Message if state.unread => self.animation.show_unread_glyph(hw),
            DisplayMode::Message => self
                .renderer
                .render(hw, RenderRequest::Message(state.message.as_ref())),
            DisplayMode::Stats => {
                state.last_refresh_ms = Some(now_ms);
                self.renderer.render(hw, RenderRequest::Stats(&state.stats));
            }
            DisplayMode::Debug => {
                state.last_refresh_ms = Some(now_ms);
                self.renderer
                    .render(hw, RenderRequest::Status(status_view(state, now_ms)));
            }
            DisplayMode::Eyes => self.renderer.render(hw, RenderRequest::Blank),
        }
    }

    fn show(state: &mut DeviceState, mode: DisplayMode) {
        if state.mode != mode {
            state.last_refresh_ms = None;
        }
        state.mode = mode;
        state.redraw = true;
    }
}

fn status_view(state: &DeviceState, now_ms: u64) -> StatusView {
    StatusView {
        wifi_associated: state.wifi_associated,
        link_connected: state.link_connected,
        offline_events: state.offline_events,
        persistent: state.persistent,
        uptime_s: now_ms / 1000,
    }
}
