//! The single owned aggregate of everything the tick loop mutates.

use crate::codec::{Message, TextStyle};
use crate::mode::{DisplayMode, ForceOverride};
use crate::mood::MoodState;
use crate::store::Statistics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    /// Mode currently on screen.
    pub mode: DisplayMode,
    /// Position in the button cycle. Overrides move `mode` but not this.
    pub cycle: DisplayMode,
    pub force: ForceOverride,
    /// The current screen must be repainted on the next tick.
    pub redraw: bool,
    /// Last paint of a periodically refreshed screen (Stats, Debug).
    pub last_refresh_ms: Option<u64>,

    pub mood: MoodState,

    pub message: Option<Message>,
    pub style: TextStyle,
    pub unread: bool,

    pub stats: Statistics,
    pub offline_events: u32,

    pub wifi_associated: bool,
    pub link_connected: bool,
    /// A storage backend is mounted.
    pub persistent: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Eyes,
            cycle: DisplayMode::Eyes,
            force: ForceOverride::None,
            redraw: true,
            last_refresh_ms: None,
            mood: MoodState::default(),
            message: None,
            style: TextStyle::default(),
            unread: false,
            stats: Statistics::default(),
            offline_events: 0,
            wifi_associated: false,
            link_connected: false,
            persistent: false,
        }
    }
}
