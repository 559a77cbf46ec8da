//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one `TAG | key=value` line per
//! application event to the logger (UART / USB-CDC on the device).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { mode, associated } => {
                info!("START | mode={} | wifi={}", mode.name(), associated);
            }
            AppEvent::ModeChanged { from, to, forced } => {
                info!(
                    "MODE | {} -> {}{}",
                    from.name(),
                    to.name(),
                    if *forced { " | forced" } else { "" }
                );
            }
            AppEvent::PressAbsorbed => info!("MODE | press absorbed"),
            AppEvent::MoodChanged { from, to, swing } => {
                info!("MOOD | {} -> {} | swing={}", from.label(), to.label(), swing);
            }
            AppEvent::Headpat { total } => info!("PAT | total={}", total),
            AppEvent::MessageReceived { len, total } => {
                info!("MSG | len={} | total={}", len, total);
            }
            AppEvent::MessageRejected(e) => warn!("MSG | rejected: {}", e),
            AppEvent::MessageAcknowledged => info!("MSG | acknowledged"),
            AppEvent::MissYouSent => info!("MISSYOU | sent"),
            AppEvent::MissYouQueued { pending } => info!("MISSYOU | queued | pending={}", pending),
            AppEvent::OfflineFlushed { sent, remaining } => {
                info!("OFFLINE | flushed={} | remaining={}", sent, remaining);
            }
            AppEvent::LinkChanged { connected } => {
                info!("LINK | {}", if *connected { "up" } else { "down" });
            }
        }
    }
}
