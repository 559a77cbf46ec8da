//! Bounded queue of raw inbound payloads.
//!
//! The link fills it while polling the transport; the tick loop drains it
//! before handling inputs, so every payload received up to the poll is
//! applied before that tick renders. When full, the newest payload is
//! rejected.

use core::fmt;

use heapless::{Deque, String};

use crate::codec::MAX_PAYLOAD_LEN;

pub const INBOUND_DEPTH: usize = 4;

pub type Payload = String<MAX_PAYLOAD_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundError {
    Full,
    TooLong,
}

impl fmt::Display for InboundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "inbound queue full"),
            Self::TooLong => write!(f, "payload exceeds {} bytes", MAX_PAYLOAD_LEN),
        }
    }
}

#[derive(Default)]
pub struct InboundQueue {
    queue: Deque<Payload, INBOUND_DEPTH>,
    rejected: u32,
}

impl InboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, payload: &str) -> Result<(), InboundError> {
        let result = Payload::try_from(payload)
            .map_err(|_| InboundError::TooLong)
            .and_then(|p| self.queue.push_back(p).map_err(|_| InboundError::Full));
        if result.is_err() {
            self.rejected = self.rejected.saturating_add(1);
        }
        result
    }

    pub fn pop(&mut self) -> Option<Payload> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Payloads turned away since boot.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}
