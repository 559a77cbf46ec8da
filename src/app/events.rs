//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, count in tests, etc.

use crate::codec::CodecError;
use crate::mode::DisplayMode;
use crate::mood::Mood;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the first mode shown).
    Started { mode: DisplayMode, associated: bool },

    /// The displayed mode changed, by button or override.
    ModeChanged {
        from: DisplayMode,
        to: DisplayMode,
        forced: bool,
    },

    /// A mode press arrived while an override was pending and was dropped.
    PressAbsorbed,

    MoodChanged { from: Mood, to: Mood, swing: bool },

    Headpat { total: u32 },

    /// A network message was accepted.
    MessageReceived { len: usize, total: u32 },

    /// An inbound payload failed to decode.
    MessageRejected(CodecError),

    /// The unread message was acknowledged by touch.
    MessageAcknowledged,

    /// A miss-you event went out immediately.
    MissYouSent,

    /// A miss-you event was queued for later delivery.
    MissYouQueued { pending: u32 },

    /// Queued miss-you events were replayed after reconnecting.
    OfflineFlushed { sent: u32, remaining: u32 },

    LinkChanged { connected: bool },
}
