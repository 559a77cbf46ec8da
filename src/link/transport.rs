//! Transport abstraction: any byte-oriented channel to the message peer.
//!
//! Concrete implementations:
//! - TCP, single peer ([`TcpTransport`](crate::adapters::tcp_link::TcpTransport))
//! - in-memory loopback for tests and the host simulation
//!
//! [`LinkAdapter`](super::LinkAdapter) is generic over `Transport`, so adding
//! a new channel requires zero changes to framing or the tick loop.

use std::collections::VecDeque;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Whether a peer is attached and writes can be delivered.
    fn is_connected(&self) -> bool {
        true
    }

    /// Accept or re-establish the peer connection. Non-blocking.
    fn poll_connection(&mut self) {}
}

/// A null transport that discards all writes and never reads.
/// Stands in for the link when the device has no network.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        false
    }
}

/// In-memory transport: bytes pushed with [`inject`](Self::inject) are
/// read back by the link; everything written is kept in [`sent`](Self::sent).
#[derive(Debug, Default)]
pub struct MemoryTransport {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    connected: bool,
    /// Accept at most this many bytes per write, to exercise short writes.
    write_limit: Option<usize>,
    /// Total bytes accepted before writes stall (return 0).
    write_budget: Option<usize>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    pub fn sent(&self) -> &[u8] {
        &self.tx
    }

    pub fn take_sent(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn set_write_limit(&mut self, limit: Option<usize>) {
        self.write_limit = limit;
    }

    pub fn set_write_budget(&mut self, budget: Option<usize>) {
        self.write_budget = budget;
    }
}

impl Transport for MemoryTransport {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        if !self.connected {
            return Err(());
        }
        let mut n = self.write_limit.map_or(data.len(), |l| l.min(data.len()));
        if let Some(budget) = self.write_budget.as_mut() {
            n = n.min(*budget);
            *budget -= n;
        }
        self.tx.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
