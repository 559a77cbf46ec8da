//! TCP transport for the message link.
//!
//! A non-blocking, single-peer TCP server over `std::net` (lwIP on the
//! ESP32, the OS stack on the host):
//!
//! 1. [`TcpTransport::bind`] listens on `0.0.0.0:<port>`.
//! 2. [`poll_connection`](Transport::poll_connection) accepts waiting
//!    peers. A newer peer replaces the current one, so a phone that
//!    reconnects after a silent drop is never locked out.
//! 3. Reads return `Ok(0)` when nothing is pending. EOF or a socket error
//!    drops the peer and the transport goes back to listening.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use core::fmt;
use log::{info, warn};

use crate::link::Transport;

/// Default listen port for the message link.
pub const DEFAULT_PORT: u16 = 7777;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpLinkError {
    /// Socket setup or I/O failure.
    Io,
    /// No peer is attached.
    NotConnected,
}

impl fmt::Display for TcpLinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "TCP socket I/O error"),
            Self::NotConnected => write!(f, "no peer connected"),
        }
    }
}

impl std::error::Error for TcpLinkError {}

pub struct TcpTransport {
    listener: TcpListener,
    peer: Option<(TcpStream, SocketAddr)>,
}

impl TcpTransport {
    /// Listen on `0.0.0.0:<port>`. Port `0` lets the OS pick.
    pub fn bind(port: u16) -> Result<Self, TcpLinkError> {
        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).map_err(|e| {
            warn!("TCP link: bind :{} failed: {}", port, e);
            TcpLinkError::Io
        })?;
        listener.set_nonblocking(true).map_err(|_| TcpLinkError::Io)?;
        info!("TCP link: listening on port {}", port);
        Ok(Self {
            listener,
            peer: None,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TcpLinkError> {
        self.listener.local_addr().map_err(|_| TcpLinkError::Io)
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer.as_ref().map(|(_, addr)| *addr)
    }

    pub fn disconnect(&mut self) {
        if let Some((_, addr)) = self.peer.take() {
            info!("TCP link: peer {} dropped", addr);
        }
    }

    fn stream(&mut self) -> Result<&mut TcpStream, TcpLinkError> {
        self.peer
            .as_mut()
            .map(|(s, _)| s)
            .ok_or(TcpLinkError::NotConnected)
    }
}

impl Transport for TcpTransport {
    type Error = TcpLinkError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TcpLinkError> {
        let result = self.stream()?.read(buf);
        match result {
            Ok(0) => {
                self.disconnect();
                Err(TcpLinkError::NotConnected)
            }
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(e) => {
                warn!("TCP link: read error: {}", e);
                self.disconnect();
                Err(TcpLinkError::Io)
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TcpLinkError> {
        let result = self.stream()?.write(data);
        match result {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => {
                warn!("TCP link: write error: {}", e);
                self.disconnect();
                Err(TcpLinkError::Io)
            }
        }
    }

    fn flush(&mut self) -> Result<(), TcpLinkError> {
        self.stream()?.flush().map_err(|_| TcpLinkError::Io)
    }

    fn is_connected(&self) -> bool {
        self.peer.is_some()
    }

    fn poll_connection(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nonblocking(true) {
                        warn!("TCP link: cannot make {} non-blocking: {}", addr, e);
                        continue;
                    }
                    let _ = stream.set_nodelay(true);
                    if let Some((_, old)) = self.peer.replace((stream, addr)) {
                        info!("TCP link: peer {} replaced by {}", old, addr);
                    } else {
                        info!("TCP link: peer {} connected", addr);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!("TCP link: accept error: {}", e);
                    break;
                }
            }
        }
    }
}
