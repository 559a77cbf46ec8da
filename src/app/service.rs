//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the [`DeviceState`] aggregate, the persistent store
//! and the per-tick components. All I/O flows through port traits passed
//! in at call sites, making the whole service testable with mock adapters.
//!
//! ```text
//!  LinkPort ──▶ InboundQueue ─┐
//!                             ▼
//!  InputPort ──▶ ┌───────────────────────────────┐ ──▶ EventSink
//!                │          AppService            │
//!  ClockPort ──▶ │ Interaction · Mood · Mode      │ ──▶ DisplayPort / EyesPort
//!  RandomPort ─▶ └───────────────────────────────┘ ──▶ LinkPort (miss-you)
//! ```
//!
//! One tick: drain inbound payloads → poll inputs → mood → mode/render →
//! link edge → offline replay while the link is up.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{
    ClockPort, DisplayPort, EventSink, EyesCue, EyesPort, InputPort, LinkPort, RandomPort,
    StoragePort,
};
use crate::codec::{self, OutboundEvent};
use crate::config::DeviceConfig;
use crate::interaction::{InputEvent, InteractionMonitor};
use crate::link::inbound::InboundQueue;
use crate::mode::{DisplayMode, ForceOverride, ModeController};
use crate::mood::{MoodEngine, MoodInputs};
use crate::render::RenderRequest;
use crate::state::DeviceState;
use crate::store::{log_save_error, Counter, PersistentStore};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService<S: StoragePort> {
    config: DeviceConfig,
    state: DeviceState,
    store: PersistentStore<S>,
    inbox: InboundQueue,
    inputs: InteractionMonitor,
    mood: MoodEngine,
    modes: ModeController,
    /// No offline replay before this time (set after a failed send).
    flush_retry_at: Option<u64>,
}

impl<S: StoragePort> AppService<S> {
    /// Build the service and restore persisted records.
    ///
    /// Does **not** pick the first mode: call [`start`](Self::start) next.
    pub fn new(config: DeviceConfig, store: PersistentStore<S>) -> Self {
        let mut state = DeviceState {
            stats: store.load_stats(),
            offline_events: store.load_offline_count(),
            persistent: store.is_persistent(),
            ..Default::default()
        };
        if let Some(msg) = store.load_last_message() {
            state.style = msg.style();
            state.message = Some(msg);
        }
        if !state.persistent {
            warn!("AppService: no storage, running without persistence");
        }
        info!(
            "AppService: restored stats={:?} offline={} message={}",
            state.stats,
            state.offline_events,
            state.message.is_some()
        );

        Self {
            inputs: InteractionMonitor::new(config.debounce_ms),
            mood: MoodEngine::from_config(&config),
            modes: ModeController::from_config(&config),
            inbox: InboundQueue::new(),
            flush_retry_at: None,
            config,
            state,
            store,
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Paint the boot banner. Shown while association runs.
    pub fn show_banner(&self, hw: &mut impl DisplayPort) {
        self.modes.renderer().render(hw, RenderRequest::Banner);
    }

    /// Pick the first mode from the startup association result.
    ///
    /// Without a network the device opens on the Debug screen, and the
    /// button cycle continues from there.
    pub fn start(&mut self, associated: bool, now_ms: u64, sink: &mut impl EventSink) {
        self.state.wifi_associated = associated;
        self.state.mood.last_change_ms = now_ms;
        let mode = if associated {
            DisplayMode::Eyes
        } else {
            self.state.cycle = DisplayMode::Debug;
            self.state.force = ForceOverride::ForceDebug;
            DisplayMode::Debug
        };
        sink.emit(&AppEvent::Started { mode, associated });
        info!("AppService started in {} (associated={})", mode.name(), associated);
    }

    /// Report the station's association state (polled by the main loop).
    pub fn set_wifi_associated(&mut self, associated: bool) {
        if self.state.wifi_associated != associated {
            self.state.wifi_associated = associated;
            self.status_changed();
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one pass of the controller.
    ///
    /// `board` satisfies every local port at once, which avoids a double
    /// mutable borrow while keeping the port boundary explicit.
    pub fn tick<B, L>(&mut self, board: &mut B, link: &mut L, sink: &mut impl EventSink)
    where
        B: InputPort + DisplayPort + EyesPort + ClockPort + RandomPort,
        L: LinkPort,
    {
        let now = board.now_ms();

        // 1. Inbound payloads, strictly before anything renders.
        link.poll(&mut self.inbox);
        while let Some(payload) = self.inbox.pop() {
            self.handle_payload(&payload, sink);
        }

        // 2. Inputs
        let mut touch_started = false;
        let mut touch_ended = false;
        for event in self.inputs.poll(board.levels(), now) {
            match event {
                InputEvent::ModePressed => self.on_mode_pressed(sink),
                InputEvent::MissYouPressed => self.on_miss_you(link, now, sink),
                InputEvent::TouchStarted => touch_started = true,
                InputEvent::TouchEnded => touch_ended = true,
            }
        }

        // 3. Mood
        let ack = touch_started && self.state.mode == DisplayMode::Message;
        let inputs = MoodInputs {
            now_ms: now,
            hour: board.hour_of_day(),
            touch_started,
            touch_ended,
            eyes_visible: self.state.mode == DisplayMode::Eyes,
        };
        let outcome = self.mood.evaluate(&mut self.state.mood, &inputs, board);
        if outcome.headpat {
            self.bump(Counter::Headpats);
            sink.emit(&AppEvent::Headpat {
                total: self.state.stats.headpats,
            });
        }
        if outcome.mood_swing {
            self.bump(Counter::MoodSwings);
        }
        if let Some((from, to)) = outcome.changed {
            sink.emit(&AppEvent::MoodChanged {
                from,
                to,
                swing: outcome.mood_swing,
            });
        }
        if outcome.happy_cue {
            board.play_cue(EyesCue::Happy);
        }

        // 4. Mode + render
        let tick = self.modes.tick(&mut self.state, ack, now, board);
        if let Some((from, to)) = tick.forced {
            sink.emit(&AppEvent::ModeChanged {
                from,
                to,
                forced: true,
            });
        }
        if tick.acknowledged {
            sink.emit(&AppEvent::MessageAcknowledged);
        }

        // 5. Link edge, then the offline queue
        self.check_link(&*link, sink);
        self.drain_offline(link, board, now, sink);
    }

    // ── Inbound ───────────────────────────────────────────────

    fn handle_payload(&mut self, payload: &str, sink: &mut impl EventSink) {
        let decoded = match codec::decode(payload) {
            Ok(d) => d,
            Err(e) => {
                warn!("Inbound: discarding payload: {}", e);
                sink.emit(&AppEvent::MessageRejected(e));
                return;
            }
        };
        let Some(msg) = decoded.apply(&mut self.state.style) else {
            debug!("Inbound: style update only ({:?})", self.state.style);
            return;
        };
        let len = msg.text.len();
        if let Err(e) = self.modes.on_message_arrived(
            &mut self.state,
            &mut self.store,
            msg,
            self.config.force_switch_on_message,
        ) {
            log_save_error("Inbound message", e);
        }
        sink.emit(&AppEvent::MessageReceived {
            len,
            total: self.state.stats.messages_received,
        });
    }

    // ── Inputs ────────────────────────────────────────────────

    fn on_mode_pressed(&mut self, sink: &mut impl EventSink) {
        if self.state.force.is_pending() {
            info!("Mode: press absorbed by pending {:?}", self.state.force);
            sink.emit(&AppEvent::PressAbsorbed);
            return;
        }
        let from = self.state.mode;
        let to = self.modes.advance_mode(&mut self.state);
        sink.emit(&AppEvent::ModeChanged {
            from,
            to,
            forced: false,
        });
    }

    /// Send a miss-you event, or queue it.
    ///
    /// While older events are still queued the press joins the queue, so
    /// it never overtakes them; the replay at the end of the tick sends it.
    fn on_miss_you(&mut self, link: &mut impl LinkPort, now: u64, sink: &mut impl EventSink) {
        self.bump(Counter::MissYouPresses);

        if link.is_connected() && self.state.offline_events == 0 {
            match codec::encode_event(OutboundEvent::MissYouButton) {
                Ok(payload) => match link.send(&payload) {
                    Ok(()) => {
                        sink.emit(&AppEvent::MissYouSent);
                        return;
                    }
                    Err(e) => {
                        warn!("MissYou: send failed ({}), queueing", e);
                        self.flush_retry_at = Some(now + u64::from(self.config.flush_retry_ms));
                    }
                },
                Err(e) => warn!("MissYou: {}", e),
            }
        }

        self.state.offline_events = self.state.offline_events.saturating_add(1);
        self.save_offline_count();
        self.status_changed();
        sink.emit(&AppEvent::MissYouQueued {
            pending: self.state.offline_events,
        });
    }

    // ── Link ──────────────────────────────────────────────────

    fn check_link(&mut self, link: &impl LinkPort, sink: &mut impl EventSink) {
        let connected = link.is_connected();
        if connected == self.state.link_connected {
            return;
        }
        self.state.link_connected = connected;
        self.status_changed();
        info!("Link: {}", if connected { "connected" } else { "disconnected" });
        sink.emit(&AppEvent::LinkChanged { connected });

        // A fresh connection replays at once.
        if connected {
            self.flush_retry_at = None;
        }
    }

    fn drain_offline(
        &mut self,
        link: &mut impl LinkPort,
        clock: &mut impl ClockPort,
        now: u64,
        sink: &mut impl EventSink,
    ) {
        if self.state.offline_events == 0 || !link.is_connected() {
            return;
        }
        if self.flush_retry_at.is_some_and(|at| now < at) {
            return;
        }
        self.flush_offline(link, clock, sink);
    }

    /// Replay queued miss-you events, one send each, paced.
    ///
    /// The persisted count drops after every confirmed send. A failed send
    /// stops the replay; the rest is retried after `flush_retry_ms`, or
    /// at once on the next reconnect.
    fn flush_offline(&mut self, link: &mut impl LinkPort, clock: &mut impl ClockPort, sink: &mut impl EventSink) {
        let payload = match codec::encode_event(OutboundEvent::MissYouButton) {
            Ok(p) => p,
            Err(e) => {
                warn!("Offline: {}", e);
                return;
            }
        };

        info!("Offline: replaying {} queued event(s)", self.state.offline_events);
        let mut sent = 0u32;
        while self.state.offline_events > 0 {
            if sent > 0 {
                clock.delay_ms(self.config.flush_pacing_ms);
            }
            if let Err(e) = link.send(&payload) {
                warn!(
                    "Offline: send failed ({}), {} left for retry",
                    e, self.state.offline_events
                );
                self.flush_retry_at = Some(clock.now_ms() + u64::from(self.config.flush_retry_ms));
                break;
            }
            sent += 1;
            self.state.offline_events -= 1;
            self.save_offline_count();
        }
        self.status_changed();
        sink.emit(&AppEvent::OfflineFlushed {
            sent,
            remaining: self.state.offline_events,
        });
    }

    // ── Persistence helpers ───────────────────────────────────

    fn bump(&mut self, counter: Counter) {
        self.state.stats.bump(counter);
        if let Err(e) = self.store.save_stats(&self.state.stats) {
            log_save_error("Stats", e);
        }
    }

    fn save_offline_count(&mut self) {
        if let Err(e) = self.store.save_offline_count(self.state.offline_events) {
            log_save_error("Offline queue", e);
        }
    }

    /// Status text changed; repaint if it is on screen.
    fn status_changed(&mut self) {
        if self.state.mode == DisplayMode::Debug {
            self.state.redraw = true;
        }
    }
}
