//! Persistent store: typed records on top of [`StoragePort`].
//!
//! Three records live in the `pixelpal` namespace, each read and written
//! whole as JSON:
//!
//! | key         | record                                   |
//! |-------------|------------------------------------------|
//! | `last_msg`  | last inbound message (`size/pos/text`)   |
//! | `stats`     | interaction counters                     |
//! | `offline_q` | undelivered miss-you events (integer)    |
//!
//! A missing or malformed record loads as its default. When no backend
//! could be mounted the store runs degraded: loads return defaults and
//! saves fail with [`StorageError::Unavailable`].

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{StorageError, StoragePort};
use crate::codec::{self, Message};
use crate::error::{Error, Result};

pub const NAMESPACE: &str = "pixelpal";
pub const KEY_LAST_MESSAGE: &str = "last_msg";
pub const KEY_STATS: &str = "stats";
pub const KEY_OFFLINE: &str = "offline_q";

const READ_BUF_LEN: usize = 512;

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Lifetime interaction counters. Never decrease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    pub headpats: u32,
    pub miss_you_presses: u32,
    pub mood_swings: u32,
    pub messages_received: u32,
}

/// Names one field of [`Statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Headpats,
    MissYouPresses,
    MoodSwings,
    MessagesReceived,
}

impl Statistics {
    /// Increment one counter, saturating at `u32::MAX`.
    pub fn bump(&mut self, counter: Counter) {
        let slot = match counter {
            Counter::Headpats => &mut self.headpats,
            Counter::MissYouPresses => &mut self.miss_you_presses,
            Counter::MoodSwings => &mut self.mood_swings,
            Counter::MessagesReceived => &mut self.messages_received,
        };
        *slot = slot.saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Log a failed write-through save.
///
/// A degraded store fails every save, so that case stays at debug level.
pub fn log_save_error(context: &str, err: Error) {
    if err.is_storage_unavailable() {
        debug!("{}: not persisted (no storage)", context);
    } else {
        warn!("{}: {}", context, err);
    }
}

pub struct PersistentStore<S: StoragePort> {
    backend: Option<S>,
}

impl<S: StoragePort> PersistentStore<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A store with no backend; nothing survives a restart.
    pub fn degraded() -> Self {
        Self { backend: None }
    }

    pub fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend(&self) -> Option<&S> {
        self.backend.as_ref()
    }

    // ── lastMessage ───────────────────────────────────────────

    pub fn load_last_message(&self) -> Option<Message> {
        let mut buf = [0u8; READ_BUF_LEN];
        let raw = self.read_record(KEY_LAST_MESSAGE, &mut buf)?;
        match codec::decode_stored_message(raw) {
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!("Store: discarding '{}' record: {}", KEY_LAST_MESSAGE, e);
                None
            }
        }
    }

    pub fn save_last_message(&mut self, msg: &Message) -> Result<()> {
        let json = codec::encode_message(msg)?;
        self.write_record(KEY_LAST_MESSAGE, json.as_bytes())
    }

    // ── stats ─────────────────────────────────────────────────

    pub fn load_stats(&self) -> Statistics {
        let mut buf = [0u8; READ_BUF_LEN];
        let Some(raw) = self.read_record(KEY_STATS, &mut buf) else {
            return Statistics::default();
        };
        serde_json::from_str(raw).unwrap_or_else(|_| {
            warn!("Store: discarding malformed '{}' record", KEY_STATS);
            Statistics::default()
        })
    }

    pub fn save_stats(&mut self, stats: &Statistics) -> Result<()> {
        let json = serde_json::to_string(stats).map_err(|_| codec::CodecError::Encode)?;
        self.write_record(KEY_STATS, json.as_bytes())
    }

    // ── offlineEventCount ─────────────────────────────────────

    pub fn load_offline_count(&self) -> u32 {
        let mut buf = [0u8; READ_BUF_LEN];
        let Some(raw) = self.read_record(KEY_OFFLINE, &mut buf) else {
            return 0;
        };
        serde_json::from_str(raw).unwrap_or_else(|_| {
            warn!("Store: discarding malformed '{}' record", KEY_OFFLINE);
            0
        })
    }

    pub fn save_offline_count(&mut self, count: u32) -> Result<()> {
        let json = serde_json::to_string(&count).map_err(|_| codec::CodecError::Encode)?;
        self.write_record(KEY_OFFLINE, json.as_bytes())
    }

    // ── helpers ───────────────────────────────────────────────

    /// Read a record as UTF-8. `None` when absent, unreadable or degraded.
    fn read_record<'b>(&self, key: &str, buf: &'b mut [u8]) -> Option<&'b str> {
        let backend = self.backend.as_ref()?;
        match backend.read(NAMESPACE, key, buf) {
            Ok(len) => match core::str::from_utf8(&buf[..len]) {
                Ok(s) => Some(s),
                Err(_) => {
                    warn!("Store: '{}' record is not UTF-8", key);
                    None
                }
            },
            Err(StorageError::NotFound) => {
                debug!("Store: no '{}' record, using default", key);
                None
            }
            Err(e) => {
                warn!("Store: read '{}' failed: {}", key, e);
                None
            }
        }
    }

    fn write_record(&mut self, key: &str, data: &[u8]) -> Result<()> {
        let backend = self
            .backend
            .as_mut()
            .ok_or(Error::Storage(StorageError::Unavailable))?;
        backend.write(NAMESPACE, key, data)?;
        Ok(())
    }
}
