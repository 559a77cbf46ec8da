//! Integration tests for the AppService tick pipeline.
//!
//! Inputs, inbound payloads and time are driven through the mock board and
//! link; assertions are made on emitted events, recorded draw calls and the
//! persisted records.

use crate::mock_hw::{DrawCall, MockBoard, MockLink, MockStorage, RecordingSink};

use pixelpal::app::events::AppEvent;
use pixelpal::app::ports::EyesCue;
use pixelpal::app::service::AppService;
use pixelpal::codec::CodecError;
use pixelpal::config::DeviceConfig;
use pixelpal::mode::{DisplayMode, ForceOverride};
use pixelpal::mood::Mood;
use pixelpal::store::PersistentStore;

pub struct Rig {
    pub app: AppService<MockStorage>,
    pub board: MockBoard,
    pub link: MockLink,
    pub sink: RecordingSink,
    pub storage: MockStorage,
}

impl Rig {
    pub fn new(associated: bool) -> Self {
        Self::with_config(DeviceConfig::default(), associated)
    }

    pub fn with_config(config: DeviceConfig, associated: bool) -> Self {
        let storage = MockStorage::new();
        Self::boot(config, storage, associated, MockLink::new(associated))
    }

    pub fn boot(config: DeviceConfig, storage: MockStorage, associated: bool, link: MockLink) -> Self {
        let mut app = AppService::new(config, PersistentStore::new(storage.clone()));
        let mut sink = RecordingSink::new();
        app.start(associated, 0, &mut sink);
        Self {
            app,
            board: MockBoard::new(),
            link,
            sink,
            storage,
        }
    }

    pub fn tick(&mut self) {
        self.app.tick(&mut self.board, &mut self.link, &mut self.sink);
    }

    /// Advance `ms` and tick once.
    pub fn step(&mut self, ms: u64) {
        self.board.advance(ms);
        self.tick();
    }

    /// Full press/release of the mode button, clear of the debounce window.
    pub fn click_mode(&mut self) {
        self.board.press_mode(true);
        self.step(20);
        self.board.press_mode(false);
        self.step(20);
        self.board.advance(600);
    }

    pub fn click_miss_you(&mut self) {
        self.board.press_miss_you(true);
        self.step(20);
        self.board.press_miss_you(false);
        self.step(20);
        self.board.advance(600);
    }

    pub fn pat(&mut self) {
        self.board.touch(true);
        self.step(20);
        self.board.touch(false);
        self.step(20);
        self.board.advance(600);
    }

    pub fn mode(&self) -> DisplayMode {
        self.app.state().mode
    }
}

fn mode_changes(sink: &RecordingSink) -> Vec<(DisplayMode, DisplayMode, bool)> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ModeChanged { from, to, forced } => Some((*from, *to, *forced)),
            _ => None,
        })
        .collect()
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn associated_start_opens_on_eyes() {
    let mut rig = Rig::new(true);
    assert_eq!(
        rig.sink.events[0],
        AppEvent::Started {
            mode: DisplayMode::Eyes,
            associated: true
        }
    );

    rig.step(20);
    assert_eq!(rig.mode(), DisplayMode::Eyes);
    assert_eq!(rig.board.eyes_frames(), 1);
    assert!(mode_changes(&rig.sink).is_empty());
}

#[test]
fn unassociated_start_forces_debug_with_setup_hint() {
    let mut rig = Rig::new(false);
    rig.step(20);

    assert_eq!(rig.mode(), DisplayMode::Debug);
    assert_eq!(
        mode_changes(&rig.sink),
        [(DisplayMode::Eyes, DisplayMode::Debug, true)]
    );
    let text = rig.board.screen_text();
    assert!(text.contains(&"WiFi: offline".to_owned()), "{:?}", text);
    assert!(text.contains(&"Join Pixelpal-Setup".to_owned()), "{:?}", text);

    // The cycle continues from Debug.
    rig.click_mode();
    assert_eq!(rig.mode(), DisplayMode::Eyes);
}

// ── Mode cycle ────────────────────────────────────────────────

#[test]
fn mode_button_walks_the_full_cycle() {
    let mut rig = Rig::new(true);
    rig.step(20);

    let mut seen = Vec::new();
    for _ in 0..4 {
        rig.click_mode();
        seen.push(rig.mode());
    }
    assert_eq!(
        seen,
        [
            DisplayMode::Message,
            DisplayMode::Stats,
            DisplayMode::Debug,
            DisplayMode::Eyes
        ]
    );
    assert!(mode_changes(&rig.sink).iter().all(|(_, _, forced)| !forced));
}

#[test]
fn message_screen_without_message_shows_placeholder() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.click_mode();
    assert_eq!(rig.mode(), DisplayMode::Message);
    assert_eq!(rig.board.screen_text(), ["No messages yet"]);
}

#[test]
fn held_button_counts_once() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.board.press_mode(true);
    for _ in 0..100 {
        rig.step(20);
    }
    assert_eq!(rig.mode(), DisplayMode::Message);
    assert_eq!(mode_changes(&rig.sink).len(), 1);
}

#[test]
fn press_during_pending_override_is_absorbed() {
    let mut rig = Rig::new(false);
    rig.board.press_mode(true);
    rig.step(20);

    assert_eq!(rig.sink.count(|e| *e == AppEvent::PressAbsorbed), 1);
    assert_eq!(rig.mode(), DisplayMode::Debug);
    assert_eq!(rig.app.state().cycle, DisplayMode::Debug);
    assert_eq!(rig.app.state().force, ForceOverride::None);
}

#[test]
fn stats_screen_refreshes_on_interval() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.click_mode();
    rig.click_mode();
    assert_eq!(rig.mode(), DisplayMode::Stats);

    rig.step(20);
    rig.board.forget_draws();
    rig.step(100);
    assert_eq!(rig.board.presents(), 0, "refresh is not due yet");

    rig.step(400);
    assert_eq!(rig.board.presents(), 1);
    assert_eq!(rig.board.screen_text()[0], "Headpats: 0");
}

// ── Messages ──────────────────────────────────────────────────

#[test]
fn message_forces_message_mode_and_persists() {
    let mut rig = Rig::new(true);
    rig.step(20);

    rig.link.deliver(r#"{"size":2,"pos":[10,20],"text":"hi"}"#);
    rig.step(20);

    assert_eq!(rig.mode(), DisplayMode::Message);
    assert!(rig.app.state().unread);
    assert!(rig.sink.events.contains(&AppEvent::MessageReceived { len: 2, total: 1 }));
    assert_eq!(
        mode_changes(&rig.sink),
        [(DisplayMode::Eyes, DisplayMode::Message, true)]
    );
    // Unread glyph, not the text.
    assert!(rig
        .board
        .draws
        .iter()
        .any(|c| matches!(c, DrawCall::Bitmap { .. })));

    let reloaded = PersistentStore::new(rig.storage.clone());
    let msg = reloaded.load_last_message().unwrap();
    assert_eq!(msg.text.as_str(), "hi");
    assert_eq!(msg.size, 2);
    assert_eq!(reloaded.load_stats().messages_received, 1);
}

#[test]
fn touch_acknowledges_with_announcement_then_shows_text() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.link.deliver(r#"{"size":2,"pos":[10,20],"text":"hi"}"#);
    rig.step(20);
    rig.board.forget_draws();

    rig.board.touch(true);
    rig.step(20);

    assert!(!rig.app.state().unread);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::MessageAcknowledged), 1);
    assert_eq!(rig.board.delays, vec![120; 8]);
    assert_eq!(
        rig.board.draws.iter().rev().nth(1),
        Some(&DrawCall::Text {
            x: 10,
            y: 20,
            size: 2,
            text: "hi".into()
        })
    );
    // Touch on the Message screen is not a headpat.
    assert_eq!(rig.app.state().stats.headpats, 0);

    // A second touch on a read message does nothing.
    rig.board.touch(false);
    rig.step(600);
    rig.board.touch(true);
    rig.step(20);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::MessageAcknowledged), 1);
}

#[test]
fn ack_in_the_same_tick_as_an_override_is_lost() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.click_mode();
    rig.link.deliver(r#"{"text":"first"}"#);
    rig.step(20);
    rig.board.touch(true);
    rig.step(20);
    assert!(!rig.app.state().unread);

    // Second message arrives in the tick the touch starts.
    rig.board.touch(false);
    rig.step(600);
    rig.link.deliver(r#"{"text":"second"}"#);
    rig.board.touch(true);
    rig.step(20);

    assert!(rig.app.state().unread);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::MessageAcknowledged), 1);
}

#[test]
fn override_leaves_the_button_cycle_alone() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.click_mode();
    rig.click_mode();
    assert_eq!(rig.mode(), DisplayMode::Stats);

    rig.link.deliver(r#"{"text":"hello"}"#);
    rig.step(20);
    assert_eq!(rig.mode(), DisplayMode::Message);
    assert_eq!(rig.app.state().cycle, DisplayMode::Stats);

    rig.click_mode();
    assert_eq!(rig.mode(), DisplayMode::Debug);
}

#[test]
fn message_without_force_switch_waits_for_the_user() {
    let config = DeviceConfig {
        force_switch_on_message: false,
        ..DeviceConfig::default()
    };
    let mut rig = Rig::with_config(config, true);
    rig.step(20);
    rig.link.deliver(r#"{"text":"later"}"#);
    rig.step(20);

    assert_eq!(rig.mode(), DisplayMode::Eyes);
    assert!(rig.app.state().unread);

    rig.click_mode();
    assert_eq!(rig.mode(), DisplayMode::Message);
    assert!(rig.app.state().unread);
}

#[test]
fn style_only_payload_applies_to_the_next_message() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.link.deliver(r#"{"size":3,"pos":[4,8]}"#);
    rig.step(20);
    assert_eq!(rig.mode(), DisplayMode::Eyes);
    assert_eq!(rig.app.state().stats.messages_received, 0);

    rig.link.deliver(r#"{"text":"styled"}"#);
    rig.step(20);
    let msg = rig.app.state().message.clone().unwrap();
    assert_eq!(msg.size, 3);
    assert_eq!((msg.position.x, msg.position.y), (4, 8));
}

#[test]
fn malformed_payload_is_rejected_without_side_effects() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.link.deliver("not json");
    rig.link.deliver("[1,2,3]");
    rig.step(20);

    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::MessageRejected(CodecError::Malformed)),
        2
    );
    assert_eq!(rig.mode(), DisplayMode::Eyes);
    assert!(rig.app.state().message.is_none());
}

// ── Mood ──────────────────────────────────────────────────────

#[test]
fn headpat_makes_happy_and_counts() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.pat();
    rig.pat();

    assert_eq!(rig.app.state().stats.headpats, 2);
    assert_eq!(rig.app.state().mood.current, Mood::Happy);
    assert_eq!(rig.board.cues, [EyesCue::Happy, EyesCue::Happy]);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::MoodChanged { to: Mood::Happy, .. })),
        1
    );
    let reloaded = PersistentStore::new(rig.storage.clone());
    assert_eq!(reloaded.load_stats().headpats, 2);
}

#[test]
fn mood_swings_after_the_interval() {
    let mut rig = Rig::new(true);
    rig.board.rolls.push_back(1);
    rig.step(15_000);
    assert_eq!(rig.app.state().mood.current, Mood::Default);

    rig.step(1);
    assert_eq!(rig.app.state().mood.current, Mood::Angry);
    assert!(rig.sink.events.contains(&AppEvent::MoodChanged {
        from: Mood::Default,
        to: Mood::Angry,
        swing: true
    }));
    assert_eq!(rig.app.state().stats.mood_swings, 1);
}

#[test]
fn night_makes_tired_without_a_swing() {
    let mut rig = Rig::new(true);
    rig.board.hour = Some(23);
    rig.step(20_000);

    assert_eq!(rig.app.state().mood.current, Mood::Tired);
    assert_eq!(rig.app.state().stats.mood_swings, 0);
}

#[test]
fn mood_is_frozen_off_the_eyes_screen() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.click_mode();
    rig.board.rolls.push_back(1);
    rig.step(60_000);
    assert_eq!(rig.app.state().mood.current, Mood::Default);
    assert_eq!(rig.app.state().stats.mood_swings, 0);
}

// ── Miss-you ──────────────────────────────────────────────────

#[test]
fn miss_you_sends_immediately_when_connected() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.click_miss_you();

    assert_eq!(rig.link.sent, [r#"{"type":"miss_you_button"}"#]);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::MissYouSent), 1);
    assert_eq!(rig.app.state().stats.miss_you_presses, 1);
    assert_eq!(rig.app.state().offline_events, 0);
}

#[test]
fn debug_screen_repaints_when_the_link_comes_up() {
    let mut rig = Rig::new(false);
    rig.step(20);
    assert!(rig.board.screen_text().contains(&"Link: down".to_owned()));

    rig.link.connected = true;
    rig.step(20);
    assert!(rig.sink.events.contains(&AppEvent::LinkChanged { connected: true }));
    // The edge is seen after rendering; the repaint lands on the next tick.
    rig.step(20);
    assert!(rig.board.screen_text().contains(&"Link: up".to_owned()));
}

#[test]
fn debug_screen_uptime_advances() {
    let mut rig = Rig::new(false);
    rig.step(20);
    assert!(rig.board.screen_text().contains(&"Up: 0s".to_owned()));

    rig.board.forget_draws();
    rig.step(100);
    assert_eq!(rig.board.presents(), 0, "refresh is not due yet");

    for _ in 0..250 {
        rig.step(20);
    }
    assert!(rig.board.presents() >= 10, "{}", rig.board.presents());
    let text = rig.board.screen_text();
    assert!(text.contains(&"Up: 5s".to_owned()), "{:?}", text);
}

#[test]
fn debug_screen_shows_newly_queued_events() {
    let mut rig = Rig::new(false);
    rig.step(20);
    assert!(rig.board.screen_text().contains(&"Queued: 0".to_owned()));

    rig.click_miss_you();
    assert_eq!(rig.mode(), DisplayMode::Debug);
    let text = rig.board.screen_text();
    assert!(text.contains(&"Queued: 1".to_owned()), "{:?}", text);
}
