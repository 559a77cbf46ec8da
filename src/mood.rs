//! Mood engine.
//!
//! The companion's mood evolves from touch, the time of day and a periodic
//! random swing. Rules are evaluated once per tick in priority order; the
//! first rule that applies ends the evaluation.
//!
//! 1. Touch started while not petted: petted, Happy for `happy_hold_ms`,
//!    one headpat, happy cue.
//! 2. Touch ended: no longer petted. Mood unchanged. Applies in every
//!    display mode.
//! 3. Petted or inside the happy hold: nothing changes.
//! 4. Night (wall clock known): Tired. The random swing is skipped.
//! 5. `mood_interval_ms` since the last change: random pick among
//!    Default/Tired/Angry, never the current mood. Counts a mood swing.
//!
//! Rules 1 and 3-5 only run while the eyes are on screen.

use crate::app::ports::RandomPort;
use crate::config::DeviceConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mood {
    #[default]
    Default,
    Happy,
    Tired,
    Angry,
}

impl Mood {
    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Happy => "happy",
            Self::Tired => "tired",
            Self::Angry => "angry",
        }
    }
}

/// Moods a random swing can land on.
const SWING_POOL: [Mood; 3] = [Mood::Default, Mood::Tired, Mood::Angry];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoodState {
    pub current: Mood,
    pub happy_until_ms: u64,
    pub last_change_ms: u64,
    pub is_being_petted: bool,
}

/// Per-tick inputs to [`MoodEngine::evaluate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MoodInputs {
    pub now_ms: u64,
    /// Local hour, `None` until the wall clock is known.
    pub hour: Option<u8>,
    pub touch_started: bool,
    pub touch_ended: bool,
    pub eyes_visible: bool,
}

/// What an evaluation did. The caller persists counters and plays the cue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoodOutcome {
    /// `(from, to)` when the mood value changed.
    pub changed: Option<(Mood, Mood)>,
    pub headpat: bool,
    pub mood_swing: bool,
    pub happy_cue: bool,
}

pub struct MoodEngine {
    config: DeviceConfig,
}

impl MoodEngine {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn evaluate(
        &self,
        state: &mut MoodState,
        inputs: &MoodInputs,
        rng: &mut impl RandomPort,
    ) -> MoodOutcome {
        let mut out = MoodOutcome::default();
        let now = inputs.now_ms;

        if inputs.touch_ended {
            state.is_being_petted = false;
        }
        if !inputs.eyes_visible {
            return out;
        }

        if inputs.touch_started && !state.is_being_petted {
            state.is_being_petted = true;
            state.happy_until_ms = now.saturating_add(u64::from(self.config.happy_hold_ms));
            out.changed = Self::apply(state, Mood::Happy, now);
            out.headpat = true;
            out.happy_cue = true;
            return out;
        }

        if state.is_being_petted || now < state.happy_until_ms {
            return out;
        }

        if inputs.hour.is_some_and(|h| self.config.is_night(h)) {
            if state.current != Mood::Tired {
                out.changed = Self::apply(state, Mood::Tired, now);
            }
            return out;
        }

        if now.saturating_sub(state.last_change_ms) > u64::from(self.config.mood_interval_ms) {
            let mut pool: heapless::Vec<Mood, 3> = heapless::Vec::new();
            for m in SWING_POOL.into_iter().filter(|m| *m != state.current) {
                let _ = pool.push(m);
            }
            let pick = pool[rng.next_u32() as usize % pool.len()];
            out.changed = Self::apply(state, pick, now);
            out.mood_swing = true;
        }

        out
    }

    /// Switch to `to`. Re-applying the current mood is a no-op and keeps
    /// the swing timer where it was.
    fn apply(state: &mut MoodState, to: Mood, now_ms: u64) -> Option<(Mood, Mood)> {
        let from = state.current;
        if from == to {
            return None;
        }
        state.current = to;
        state.last_change_ms = now_ms;
        Some((from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Seq(u32);

    impl RandomPort for Seq {
        fn next_u32(&mut self) -> u32 {
            self.0 = self.0.wrapping_add(1);
            self.0
        }
    }

    fn engine() -> MoodEngine {
        MoodEngine::from_config(&DeviceConfig::default())
    }

    fn eyes(now_ms: u64) -> MoodInputs {
        MoodInputs {
            now_ms,
            eyes_visible: true,
            ..Default::default()
        }
    }

    #[test]
    fn headpat_makes_happy_and_counts() {
        let mut s = MoodState::default();
        let out = engine().evaluate(
            &mut s,
            &MoodInputs {
                touch_started: true,
                ..eyes(1000)
            },
            &mut Seq(0),
        );
        assert_eq!(out.changed, Some((Mood::Default, Mood::Happy)));
        assert!(out.headpat && out.happy_cue);
        assert!(!out.mood_swing);
        assert!(s.is_being_petted);
        assert_eq!(s.happy_until_ms, 6000);
        assert_eq!(s.last_change_ms, 1000);
    }

    #[test]
    fn headpat_while_already_happy_keeps_the_swing_timer() {
        let mut s = MoodState {
            current: Mood::Happy,
            last_change_ms: 1000,
            happy_until_ms: 6000,
            ..Default::default()
        };
        let out = engine().evaluate(
            &mut s,
            &MoodInputs {
                touch_started: true,
                ..eyes(9000)
            },
            &mut Seq(0),
        );
        assert_eq!(out.changed, None);
        assert!(out.headpat);
        assert_eq!(s.last_change_ms, 1000);
        assert_eq!(s.happy_until_ms, 14_000);
    }

    #[test]
    fn second_touch_start_while_petted_is_ignored() {
        let mut s = MoodState {
            is_being_petted: true,
            current: Mood::Happy,
            ..Default::default()
        };
        let out = engine().evaluate(
            &mut s,
            &MoodInputs {
                touch_started: true,
                ..eyes(1000)
            },
            &mut Seq(0),
        );
        assert_eq!(out, MoodOutcome::default());
    }

    #[test]
    fn touch_end_clears_petting_in_any_mode() {
        let mut s = MoodState {
            is_being_petted: true,
            current: Mood::Happy,
            ..Default::default()
        };
        let out = engine().evaluate(
            &mut s,
            &MoodInputs {
                now_ms: 100_000,
                touch_ended: true,
                eyes_visible: false,
                ..Default::default()
            },
            &mut Seq(0),
        );
        assert!(!s.is_being_petted);
        assert_eq!(s.current, Mood::Happy);
        assert_eq!(out, MoodOutcome::default());
    }

    #[test]
    fn nothing_changes_outside_eyes_mode() {
        let mut s = MoodState::default();
        let inputs = MoodInputs {
            now_ms: 1_000_000,
            touch_started: true,
            hour: Some(23),
            eyes_visible: false,
            ..Default::default()
        };
        let out = engine().evaluate(&mut s, &inputs, &mut Seq(0));
        assert_eq!(out, MoodOutcome::default());
        assert_eq!(s, MoodState::default());
    }

    #[test]
    fn happy_hold_blocks_swings() {
        let mut s = MoodState {
            current: Mood::Happy,
            happy_until_ms: 50_000,
            ..Default::default()
        };
        let out = engine().evaluate(&mut s, &eyes(49_999), &mut Seq(0));
        assert_eq!(out.changed, None);
        assert_eq!(s.current, Mood::Happy);
    }

    #[test]
    fn night_forces_tired_without_counting_a_swing() {
        let mut s = MoodState::default();
        let inputs = MoodInputs {
            hour: Some(23),
            ..eyes(1000)
        };
        let out = engine().evaluate(&mut s, &inputs, &mut Seq(0));
        assert_eq!(out.changed, Some((Mood::Default, Mood::Tired)));
        assert!(!out.mood_swing);
        assert_eq!(s.last_change_ms, 1000);

        // Stays tired all night, even long past the interval.
        let inputs = MoodInputs {
            hour: Some(2),
            ..eyes(1_000_000)
        };
        assert_eq!(engine().evaluate(&mut s, &inputs, &mut Seq(0)), MoodOutcome::default());
        assert_eq!(s.current, Mood::Tired);
    }

    #[test]
    fn swing_waits_for_interval() {
        let mut s = MoodState::default();
        assert_eq!(engine().evaluate(&mut s, &eyes(15_000), &mut Seq(0)).changed, None);
        let out = engine().evaluate(&mut s, &eyes(15_001), &mut Seq(0));
        assert!(out.mood_swing);
        assert_ne!(s.current, Mood::Default);
        assert_eq!(s.last_change_ms, 15_001);
    }

    #[test]
    fn swing_after_happy_can_pick_any_pool_mood() {
        let mut s = MoodState {
            current: Mood::Happy,
            ..Default::default()
        };
        let out = engine().evaluate(&mut s, &eyes(20_000), &mut Seq(u32::MAX));
        // Seq yields 0 → first pool entry.
        assert_eq!(out.changed, Some((Mood::Happy, Mood::Default)));
    }

    #[test]
    fn unknown_hour_falls_through_to_timer() {
        let mut s = MoodState::default();
        let out = engine().evaluate(&mut s, &eyes(30_000), &mut Seq(0));
        assert!(out.mood_swing);
    }
}
