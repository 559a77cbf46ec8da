//! Newline frame decoder.
//!
//! Wire format: one UTF-8 JSON payload per line, terminated by `\n`
//! (a trailing `\r` is stripped). The decoder accumulates incoming bytes
//! and yields complete lines, so a single `Transport::read` may carry part
//! of a line, one line, or several.
//!
//! A line longer than [`MAX_LINE_LEN`] is dropped whole: everything up to
//! the next `\n` is discarded.

use log::warn;

use crate::codec::MAX_PAYLOAD_LEN;

/// Longest line the decoder buffers.
pub const MAX_LINE_LEN: usize = MAX_PAYLOAD_LEN;

pub struct LineDecoder {
    buf: heapless::Vec<u8, MAX_LINE_LEN>,
    discarding: bool,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
            discarding: false,
        }
    }

    /// Feed bytes into the decoder, calling `on_line` for every complete,
    /// non-empty line. The slice passed to `on_line` excludes the newline.
    pub fn feed(&mut self, data: &[u8], mut on_line: impl FnMut(&[u8])) {
        for &byte in data {
            if byte == b'\n' {
                if self.discarding {
                    self.discarding = false;
                } else {
                    let line = self.buf.strip_suffix(b"\r").unwrap_or(&self.buf[..]);
                    if !line.is_empty() {
                        on_line(line);
                    }
                }
                self.buf.clear();
                continue;
            }
            if self.discarding {
                continue;
            }
            if self.buf.push(byte).is_err() {
                warn!("Link: dropping line longer than {} bytes", MAX_LINE_LEN);
                self.buf.clear();
                self.discarding = true;
            }
        }
    }

    /// Drop any partial line (e.g. after the peer reconnects).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}
