//! Unified error types for the Pixelpal firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the tick
//! loop can log failures uniformly and keep running. All variants are
//! `Copy`; none of them carries heap data.

use core::fmt;

use crate::app::ports::{ConfigError, LinkError, StorageError};
use crate::codec::CodecError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A durable record could not be read or written.
    Storage(StorageError),
    /// A payload could not be decoded or encoded.
    Codec(CodecError),
    /// The network link rejected an outbound payload.
    Link(LinkError),
    /// Device configuration could not be loaded or failed validation.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl Error {
    /// True when the failure only means "running without persistence".
    ///
    /// The store returns this for every save in degraded mode; callers log
    /// it quietly instead of warning on each counter bump.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::Storage(StorageError::Unavailable))
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
