// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Message parser for the pan/tilt command protocol.
//!
//! Bytes are pushed one at a time as they arrive from the UART; a [`Command`] is returned once a
//! complete frame with a valid checksum has been seen. Unknown IDs and bad checksums silently drop
//! the frame and resynchronize on the next start byte.

use crate::protocol::messages::*;

enum State {
    WaitStart,
    WaitId,
    Payload { id: u8, len: usize },
    WaitChecksum { id: u8, len: usize },
}

pub struct Parser {
    state: State,
    checksum: u8,
    payload: [u8; MAX_PAYLOAD],
    received: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::WaitStart,
            checksum: 0,
            payload: [0; MAX_PAYLOAD],
            received: 0,
        }
    }

    /// Process a single incoming byte. Returns `Some(Command)` if a complete packet is received.
    pub fn push(&mut self, byte: u8) -> Option<Command> {
        match self.state {
            State::WaitStart => {
                if byte == START_BYTE {
                    self.state = State::WaitId;
                    self.checksum = 0;
                    self.received = 0;
                }
            }
            State::WaitId => {
                self.checksum = self.checksum.wrapping_add(byte);

                self.state = match payload_len(byte) {
                    Some(0) => State::WaitChecksum { id: byte, len: 0 },
                    Some(len) => State::Payload { id: byte, len },
                    // Unknown message ID, reset state
                    None => State::WaitStart,
                };
            }
            State::Payload { id, len } => {
                self.checksum = self.checksum.wrapping_add(byte);
                self.payload[self.received] = byte;
                self.received += 1;

                if self.received == len {
                    self.state = State::WaitChecksum { id, len };
                }
            }
            State::WaitChecksum { id, len } => {
                let valid = byte == self.checksum;
                self.state = State::WaitStart; // Reset for next message

                if valid {
                    return Command::decode(id, &self.payload[..len]);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::control::Point;
    use std::vec::Vec;

    fn frame(id: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(START_BYTE);
        out.push(id);
        out.extend_from_slice(payload);
        let sum = payload.iter().fold(id, |acc, b| acc.wrapping_add(*b));
        out.push(sum);
        out
    }

    fn fields(values: &[i16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn feed(parser: &mut Parser, bytes: &[u8]) -> Vec<Command> {
        bytes.iter().filter_map(|b| parser.push(*b)).collect()
    }

    #[test]
    fn parses_track_frame() {
        let mut parser = Parser::new();
        let bytes = frame(MSG_TRACK, &fields(&[812, 590, 800, 600]));

        assert_eq!(
            feed(&mut parser, &bytes),
            [Command::Track {
                observed: Point::new(812, 590),
                center: Point::new(800, 600),
            }]
        );
    }

    #[test]
    fn parses_negative_coordinates() {
        let mut parser = Parser::new();
        let bytes = frame(MSG_AIM, &fields(&[-40, 1300]));
        assert_eq!(
            feed(&mut parser, &bytes),
            [Command::Aim(Point::new(-40, 1300))]
        );
    }

    #[test]
    fn parses_payloadless_frames() {
        let mut parser = Parser::new();
        let mut bytes = frame(MSG_PARK, &[]);
        bytes.extend(frame(MSG_CENTER, &[]));
        assert_eq!(feed(&mut parser, &bytes), [Command::Park, Command::Center]);
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut parser = Parser::new();
        let mut bytes = frame(MSG_AIM, &fields(&[100, 200]));
        let last = bytes.len() - 1;
        bytes[last] = bytes[last].wrapping_add(1);
        assert!(feed(&mut parser, &bytes).is_empty());

        // The parser recovers on the next frame.
        let bytes = frame(MSG_PARK, &[]);
        assert_eq!(feed(&mut parser, &bytes), [Command::Park]);
    }

    #[test]
    fn skips_noise_and_unknown_ids() {
        let mut parser = Parser::new();
        let mut bytes = std::vec![0x00, 0xFF, 0x13];
        bytes.extend([START_BYTE, 0x99]);
        bytes.extend(frame(MSG_CENTER, &[]));
        assert_eq!(feed(&mut parser, &bytes), [Command::Center]);
    }

    #[test]
    fn start_byte_inside_payload_is_data() {
        let mut parser = Parser::new();
        // 0x00A5 little-endian puts the sync byte inside the payload.
        let bytes = frame(MSG_AIM, &fields(&[0xA5, 0]));
        assert_eq!(
            feed(&mut parser, &bytes),
            [Command::Aim(Point::new(0xA5, 0))]
        );
    }
}
