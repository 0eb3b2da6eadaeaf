// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART abstraction layer for the debug/command link.
//!
//! TX carries the log output; RX carries command frames for [`crate::protocol::Parser`]. Reads never
//! block, so the control loop keeps its cadence when the host is silent.
//!
//! Note: When using `writeln!`, be sure to include `\r` (CR) in the format string to ensure correct
//! line endings on the terminal.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```

use core::fmt;
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Rx, Serial, Tx},
};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self { tx, rx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }

    /// Next received byte, if one is waiting. Overrun and framing errors drop the byte.
    #[inline]
    pub fn read_byte(&mut self) -> Option<u8> {
        self.rx.read().ok()
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}
