//! [`LinkPort`] over a byte [`Transport`].

use log::{debug, warn};

use super::inbound::InboundQueue;
use super::lines::{LineDecoder, MAX_LINE_LEN};
use super::transport::Transport;
use crate::app::ports::{LinkError, LinkPort};

/// Bytes pulled from the transport per read call.
const READ_CHUNK: usize = 128;
/// Upper bound on reads per poll so a chatty peer cannot stall the tick.
const MAX_READS_PER_POLL: usize = 8;

pub struct LinkAdapter<T: Transport> {
    transport: T,
    decoder: LineDecoder,
    was_connected: bool,
    /// A previous send stalled mid-line; the peer holds an unterminated
    /// fragment.
    broken_line: bool,
}

impl<T: Transport> LinkAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoder: LineDecoder::new(),
            was_connected: false,
            broken_line: false,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport> LinkPort for LinkAdapter<T> {
    fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    fn poll(&mut self, inbox: &mut InboundQueue) {
        self.transport.poll_connection();
        let connected = self.transport.is_connected();
        if connected != self.was_connected {
            // A new peer never continues the previous peer's line.
            self.decoder.reset();
            self.broken_line = false;
            self.was_connected = connected;
        }

        let mut chunk = [0u8; READ_CHUNK];
        for _ in 0..MAX_READS_PER_POLL {
            let n = match self.transport.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    debug!("Link: read failed: {:?}", e);
                    break;
                }
            };
            self.decoder.feed(&chunk[..n], |line| match core::str::from_utf8(line) {
                Ok(text) => {
                    if let Err(e) = inbox.push(text) {
                        warn!("Link: inbound payload rejected: {}", e);
                    }
                }
                Err(_) => warn!("Link: dropping non-UTF-8 line ({} bytes)", line.len()),
            });
        }
    }

    fn send(&mut self, payload: &str) -> Result<(), LinkError> {
        if !self.transport.is_connected() {
            return Err(LinkError::Disconnected);
        }

        // One buffer per line. A stalled fragment from an earlier send is
        // terminated first so the peer drops it instead of gluing it on.
        if payload.len() > MAX_LINE_LEN {
            return Err(LinkError::TooLong);
        }
        let mut line: heapless::Vec<u8, { MAX_LINE_LEN + 2 }> = heapless::Vec::new();
        if self.broken_line {
            let _ = line.push(b'\n');
        }
        line.extend_from_slice(payload.as_bytes())
            .and_then(|()| line.push(b'\n').map_err(|_| ()))
            .map_err(|()| LinkError::TooLong)?;

        let mut rest = line.as_slice();
        while !rest.is_empty() {
            let written = self.transport.write(rest).map_err(|e| {
                warn!("Link: write failed: {:?}", e);
                LinkError::Io
            })?;
            if written == 0 {
                self.broken_line = rest.len() < line.len();
                return Err(LinkError::ShortWrite);
            }
            rest = &rest[written.min(rest.len())..];
        }
        self.broken_line = false;
        self.transport.flush().map_err(|_| LinkError::Io)
    }
}
