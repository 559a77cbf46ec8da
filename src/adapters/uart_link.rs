//! UART transport for the message link.
//!
//! Newline-delimited JSON over a serial port, used when the device has no
//! WiFi credentials. The port is always "connected"; there is no peer
//! handshake on a wire.

use esp_idf_hal::delay::{NON_BLOCK, TickType};
use esp_idf_hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;

use crate::link::Transport;

/// Upper bound on waiting for the TX FIFO to drain.
const FLUSH_TIMEOUT_MS: u64 = 50;

pub struct UartTransport {
    uart: UartDriver<'static>,
}

impl UartTransport {
    pub fn new(uart: UartDriver<'static>) -> Self {
        Self { uart }
    }
}

impl Transport for UartTransport {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        self.uart.read(buf, NON_BLOCK)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.uart.write(data)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        let timeout = TickType::new_millis(FLUSH_TIMEOUT_MS).ticks();
        self.uart.wait_tx_done(timeout)
    }
}
