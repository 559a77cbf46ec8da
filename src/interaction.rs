//! Debounced edge detection for the three user inputs.
//!
//! ## Hardware
//!
//! | Input            | Idle level | Active level | Reports                     |
//! |------------------|------------|--------------|-----------------------------|
//! | Mode button      | high       | low          | `ModePressed`               |
//! | Miss-you button  | high       | low          | `MissYouPressed`            |
//! | Touch pad        | low        | high         | `TouchStarted`/`TouchEnded` |
//!
//! Each input debounces independently. An activation edge is reported only
//! when at least the debounce window has passed since that input's
//! previous *reported* activation. Deactivation edges are reported at once,
//! and only for activations that were themselves reported, so
//! `TouchStarted`/`TouchEnded` always pair up.

use heapless::Vec;

/// Raw electrical levels, `true` = high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLevels {
    pub mode_button: bool,
    pub miss_you_button: bool,
    pub touch: bool,
}

impl InputLevels {
    /// Every input at its idle level.
    pub const IDLE: Self = Self {
        mode_button: true,
        miss_you_button: true,
        touch: false,
    };
}

impl Default for InputLevels {
    fn default() -> Self {
        Self::IDLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    ModePressed,
    MissYouPressed,
    TouchStarted,
    TouchEnded,
}

/// Most events a single poll can produce (one per input).
pub const MAX_EVENTS_PER_POLL: usize = 4;

pub type InputEvents = Vec<InputEvent, MAX_EVENTS_PER_POLL>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    fn is_active(self, level: bool) -> bool {
        match self {
            Self::ActiveLow => !level,
            Self::ActiveHigh => level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Activated,
    Deactivated,
}

#[derive(Debug, Clone, Copy)]
struct DebouncedInput {
    polarity: Polarity,
    active: bool,
    /// Whether the current activation was reported.
    reported: bool,
    last_reported_ms: Option<u64>,
}

impl DebouncedInput {
    const fn new(polarity: Polarity) -> Self {
        Self {
            polarity,
            active: false,
            reported: false,
            last_reported_ms: None,
        }
    }

    fn sample(&mut self, level: bool, now_ms: u64, window_ms: u64) -> Option<Edge> {
        let active = self.polarity.is_active(level);
        match (self.active, active) {
            (false, true) => {
                self.active = true;
                let clear = self
                    .last_reported_ms
                    .is_none_or(|last| now_ms.saturating_sub(last) >= window_ms);
                self.reported = clear;
                if clear {
                    self.last_reported_ms = Some(now_ms);
                    Some(Edge::Activated)
                } else {
                    None
                }
            }
            (true, false) => {
                self.active = false;
                core::mem::take(&mut self.reported).then_some(Edge::Deactivated)
            }
            _ => None,
        }
    }
}

/// Debounces the mode button, miss-you button and touch pad.
pub struct InteractionMonitor {
    window_ms: u64,
    mode: DebouncedInput,
    miss_you: DebouncedInput,
    touch: DebouncedInput,
}

impl InteractionMonitor {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            window_ms: u64::from(debounce_ms),
            mode: DebouncedInput::new(Polarity::ActiveLow),
            miss_you: DebouncedInput::new(Polarity::ActiveLow),
            touch: DebouncedInput::new(Polarity::ActiveHigh),
        }
    }

    /// Sample all inputs once and return the debounced edges, in the order
    /// mode, miss-you, touch.
    pub fn poll(&mut self, levels: InputLevels, now_ms: u64) -> InputEvents {
        let mut events = InputEvents::new();
        let w = self.window_ms;

        if self.mode.sample(levels.mode_button, now_ms, w) == Some(Edge::Activated) {
            let _ = events.push(InputEvent::ModePressed);
        }
        if self.miss_you.sample(levels.miss_you_button, now_ms, w) == Some(Edge::Activated) {
            let _ = events.push(InputEvent::MissYouPressed);
        }
        match self.touch.sample(levels.touch, now_ms, w) {
            Some(Edge::Activated) => {
                let _ = events.push(InputEvent::TouchStarted);
            }
            Some(Edge::Deactivated) => {
                let _ = events.push(InputEvent::TouchEnded);
            }
            None => {}
        }
        events
    }
}
