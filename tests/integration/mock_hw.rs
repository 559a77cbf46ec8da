//! Mock adapters for integration tests.
//!
//! `MockBoard` stands in for the whole device (inputs, panel, eyes,
//! clock, RNG) and records every display call, so tests can assert on what
//! was painted without an OLED. Time only moves when a test says so.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use pixelpal::animation::Bitmap;
use pixelpal::app::events::AppEvent;
use pixelpal::app::ports::{
    ClockPort, DisplayPort, EventSink, EyesCue, EyesPort, InputPort, LinkError, LinkPort,
    RandomPort, StorageError, StoragePort,
};
use pixelpal::interaction::InputLevels;
use pixelpal::link::InboundQueue;
use pixelpal::mood::Mood;

// ── Display call record ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    Text { x: u8, y: u8, size: u8, text: String },
    Bitmap { x: u8, y: u8, width: u8, height: u8 },
    Present,
    Eyes { mood: Mood },
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub levels: InputLevels,
    pub now_ms: u64,
    pub hour: Option<u8>,
    pub rolls: VecDeque<u32>,
    pub draws: Vec<DrawCall>,
    pub cues: Vec<EyesCue>,
    pub delays: Vec<u32>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            levels: InputLevels::IDLE,
            now_ms: 0,
            hour: None,
            rolls: VecDeque::new(),
            draws: Vec::new(),
            cues: Vec::new(),
            delays: Vec::new(),
        }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    pub fn press_mode(&mut self, down: bool) {
        self.levels.mode_button = !down;
    }

    pub fn press_miss_you(&mut self, down: bool) {
        self.levels.miss_you_button = !down;
    }

    pub fn touch(&mut self, down: bool) {
        self.levels.touch = down;
    }

    /// Text drawn since the last `Clear`, in draw order.
    pub fn screen_text(&self) -> Vec<String> {
        let start = self
            .draws
            .iter()
            .rposition(|c| *c == DrawCall::Clear)
            .map_or(0, |i| i + 1);
        self.draws[start..]
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn presents(&self) -> usize {
        self.draws.iter().filter(|c| **c == DrawCall::Present).count()
    }

    pub fn eyes_frames(&self) -> usize {
        self.draws
            .iter()
            .filter(|c| matches!(c, DrawCall::Eyes { .. }))
            .count()
    }

    pub fn forget_draws(&mut self) {
        self.draws.clear();
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPort for MockBoard {
    fn levels(&mut self) -> InputLevels {
        self.levels
    }
}

impl DisplayPort for MockBoard {
    fn clear(&mut self) {
        self.draws.push(DrawCall::Clear);
    }

    fn draw_text(&mut self, x: u8, y: u8, size: u8, text: &str) {
        self.draws.push(DrawCall::Text {
            x,
            y,
            size,
            text: text.to_owned(),
        });
    }

    fn draw_bitmap(&mut self, x: u8, y: u8, bitmap: &Bitmap) {
        self.draws.push(DrawCall::Bitmap {
            x,
            y,
            width: bitmap.width,
            height: bitmap.height,
        });
    }

    fn present(&mut self) {
        self.draws.push(DrawCall::Present);
    }
}

impl EyesPort for MockBoard {
    fn advance(&mut self, mood: Mood, _now_ms: u64) {
        self.draws.push(DrawCall::Eyes { mood });
    }

    fn play_cue(&mut self, cue: EyesCue) {
        self.cues.push(cue);
    }
}

impl ClockPort for MockBoard {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn hour_of_day(&self) -> Option<u8> {
        self.hour
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.now_ms += u64::from(ms);
    }
}

impl RandomPort for MockBoard {
    fn next_u32(&mut self) -> u32 {
        self.rolls.pop_front().unwrap_or(0)
    }
}

// ── MockLink ──────────────────────────────────────────────────

pub struct MockLink {
    pub connected: bool,
    pub inbound: VecDeque<String>,
    pub sent: Vec<String>,
    /// Number of upcoming sends that fail.
    pub fail_sends: usize,
    /// Drop the connection after this many more successful sends.
    pub drop_after: Option<usize>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new(connected: bool) -> Self {
        Self {
            connected,
            inbound: VecDeque::new(),
            sent: Vec::new(),
            fail_sends: 0,
            drop_after: None,
        }
    }

    pub fn deliver(&mut self, payload: &str) {
        self.inbound.push_back(payload.to_owned());
    }
}

impl LinkPort for MockLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn poll(&mut self, inbox: &mut InboundQueue) {
        while let Some(payload) = self.inbound.pop_front() {
            if inbox.push(&payload).is_err() {
                break;
            }
        }
    }

    fn send(&mut self, payload: &str) -> Result<(), LinkError> {
        if !self.connected {
            return Err(LinkError::Disconnected);
        }
        if self.fail_sends > 0 {
            self.fail_sends -= 1;
            return Err(LinkError::Io);
        }
        match self.drop_after {
            Some(0) => {
                self.connected = false;
                self.drop_after = None;
                return Err(LinkError::Disconnected);
            }
            Some(n) => self.drop_after = Some(n - 1),
            None => {}
        }
        self.sent.push(payload.to_owned());
        Ok(())
    }
}

// ── MockStorage ───────────────────────────────────────────────

/// In-memory blob store. Clones share the same records, so a test can
/// hand one to the service and keep another to inspect or "reboot" with.
#[derive(Clone, Default)]
pub struct MockStorage {
    records: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.records
            .borrow()
            .get(&Self::key(namespace, key))
            .map(|v| String::from_utf8_lossy(v).into_owned())
    }

    pub fn put(&self, namespace: &str, key: &str, value: &str) {
        self.records
            .borrow_mut()
            .insert(Self::key(namespace, key), value.as_bytes().to_vec());
    }

    fn key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }
}

impl StoragePort for MockStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.records.borrow().get(&Self::key(namespace, key)) {
            Some(v) if v.len() > buf.len() => Err(StorageError::Full),
            Some(v) => {
                buf[..v.len()].copy_from_slice(v);
                Ok(v.len())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.records
            .borrow_mut()
            .insert(Self::key(namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.records.borrow_mut().remove(&Self::key(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.records
            .borrow()
            .contains_key(&Self::key(namespace, key))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn take(&mut self) -> Vec<AppEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
