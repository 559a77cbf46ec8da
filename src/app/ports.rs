//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (inputs, display, eyes engine, message link, storage,
//! clock) implement these traits. The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and tests can substitute instant, recording implementations.
//!
//! ## Durability notes
//!
//! - **StoragePort** writes MUST be atomic: a later read observes either the
//!   previous complete blob or the new complete blob, never a torn write.
//! - **ConfigPort** implementations MUST validate before persisting.

use crate::animation::Bitmap;
use crate::config::DeviceConfig;
use crate::interaction::InputLevels;
use crate::link::inbound::InboundQueue;
use crate::mood::Mood;

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: GPIO → domain)
// ───────────────────────────────────────────────────────────────

/// Raw electrical levels of the three user inputs.
pub trait InputPort {
    /// Sample every input once. Polarity is resolved by the
    /// [`InteractionMonitor`](crate::interaction::InteractionMonitor).
    fn levels(&mut self) -> InputLevels;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → OLED)
// ───────────────────────────────────────────────────────────────

/// Display primitive layer: draw into a back buffer, then present.
pub trait DisplayPort {
    /// Clear the back buffer.
    fn clear(&mut self);

    /// Draw `text` with its top-left corner at (`x`, `y`) using text scale
    /// `size` (1–4). Text wraps at the right edge.
    fn draw_text(&mut self, x: u8, y: u8, size: u8, text: &str);

    /// Blit a 1-bpp bitmap with its top-left corner at (`x`, `y`).
    fn draw_bitmap(&mut self, x: u8, y: u8, bitmap: &Bitmap);

    /// Push the back buffer to the panel.
    fn present(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Eyes engine port
// ───────────────────────────────────────────────────────────────

/// One-off reactions the eyes engine can play on top of the idle loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyesCue {
    /// Short positive reaction to a head-pat.
    Happy,
}

/// The animated-eyes renderer. Owns the display while the device is in
/// Eyes mode.
pub trait EyesPort {
    /// Advance the idle / blink / mood animation by one tick.
    fn advance(&mut self, mood: Mood, now_ms: u64);

    /// Queue a short reaction animation.
    fn play_cue(&mut self, cue: EyesCue);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time, wall-clock hour and blocking delay.
pub trait ClockPort {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;

    /// Local hour of day (0–23), `None` until the wall clock is synced.
    fn hour_of_day(&self) -> Option<u8>;

    /// Block the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Random port
// ───────────────────────────────────────────────────────────────

/// Entropy source for mood rolls. Not required to be cryptographic.
pub trait RandomPort {
    fn next_u32(&mut self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Message link port (driven adapter: network ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Inbound text messages and outbound event payloads.
///
/// Inbound payloads are never dispatched into domain logic from inside the
/// transport. [`poll`](LinkPort::poll) only copies complete payloads into the
/// caller's bounded [`InboundQueue`]; the tick loop drains it afterwards.
pub trait LinkPort {
    /// Whether outbound sends can currently succeed.
    fn is_connected(&self) -> bool;

    /// Move any complete inbound payloads into `inbox`.
    fn poll(&mut self, inbox: &mut InboundQueue);

    /// Send one outbound payload.
    fn send(&mut self, payload: &str) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (WiFi association)
// ───────────────────────────────────────────────────────────────

/// Network association. The only blocking call is the bounded startup
/// wait; everything else is a cheap poll.
pub trait ConnectivityPort {
    /// Try to associate up to `max_attempts` times. Blocks until associated
    /// or the budget is spent. Returns whether the station is associated.
    fn await_connectivity(&mut self, max_attempts: u8) -> bool;

    fn is_connected(&self) -> bool;

    /// Drive reconnection after a drop. Non-blocking.
    fn poll(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads and persists the device configuration.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`DeviceConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<DeviceConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DeviceConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash / files)
// ───────────────────────────────────────────────────────────────

/// Persistent named-blob storage.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic: no partial writes on power loss.
///   ESP-IDF NVS guarantees this per commit; the host file backend writes a
///   temporary file and renames it over the target.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
    /// No storage backend mounted; running without persistence.
    Unavailable,
}

/// Errors from [`LinkPort::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The peer is not reachable right now.
    Disconnected,
    /// The transport stopped accepting bytes partway through the line.
    ShortWrite,
    /// The payload does not fit in one line.
    TooLong,
    /// The transport failed mid-send and dropped the peer.
    Io,
}

/// Errors from the WiFi adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
            Self::Unavailable => write!(f, "storage unavailable"),
        }
    }
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "link disconnected"),
            Self::ShortWrite => write!(f, "short write"),
            Self::TooLong => write!(f, "payload exceeds line limit"),
            Self::Io => write!(f, "transport I/O error"),
        }
    }
}

impl core::fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}
