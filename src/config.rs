//! Device configuration parameters
//!
//! All tunable timings for the Pixelpal companion.
//! Values can be overridden via NVS (see [`NvsAdapter`](crate::adapters::nvs::NvsAdapter)).

use serde::{Deserialize, Serialize};

/// Core device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Inputs ---
    /// Per-input debounce window (milliseconds)
    pub debounce_ms: u32,

    // --- Mood ---
    /// Minimum time between random mood swings (milliseconds)
    pub mood_interval_ms: u32,
    /// How long a head-pat keeps the mood Happy after it starts (milliseconds)
    pub happy_hold_ms: u32,
    /// First hour (0-23) of the night window that forces the Tired mood
    pub night_start_hour: u8,
    /// First hour (0-23) after the night window
    pub night_end_hour: u8,

    // --- Display ---
    /// Stats screen refresh cadence (milliseconds)
    pub stats_refresh_ms: u32,
    /// Duration of one frame of the new-message announcement (milliseconds)
    pub announcement_frame_ms: u32,
    /// Switch to the Message screen as soon as a message arrives
    pub force_switch_on_message: bool,

    // --- Network ---
    /// WiFi association attempts at boot before falling back to provisioning
    pub wifi_max_attempts: u8,
    /// Pause between replayed offline events (milliseconds)
    pub flush_pacing_ms: u32,
    /// Wait before replaying again after a failed send on a live link (milliseconds)
    pub flush_retry_ms: u32,

    // --- Timing ---
    /// Main loop period (milliseconds)
    pub tick_interval_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            // Inputs
            debounce_ms: 500,

            // Mood
            mood_interval_ms: 15_000,
            happy_hold_ms: 5_000,
            night_start_hour: 22,
            night_end_hour: 6,

            // Display
            stats_refresh_ms: 500,
            announcement_frame_ms: 120,
            force_switch_on_message: true,

            // Network
            wifi_max_attempts: 20,
            flush_pacing_ms: 100,
            flush_retry_ms: 5_000,

            // Timing
            tick_interval_ms: 20, // 50 Hz
        }
    }
}

impl DeviceConfig {
    /// Whether `hour` falls inside the night window.
    ///
    /// The window may wrap midnight (22 → 6) or not (1 → 5).
    pub fn is_night(&self, hour: u8) -> bool {
        let (start, end) = (self.night_start_hour, self.night_end_hour);
        if start == end {
            return false;
        }
        if start > end {
            hour >= start || hour < end
        } else {
            hour >= start && hour < end
        }
    }
}
