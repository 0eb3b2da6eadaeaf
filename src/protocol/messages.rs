// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Command message protocol used to drive the pan/tilt head over the serial link.
//!
//! Frame layout: `START_BYTE | id | payload | checksum`, where `checksum` is the wrapping sum of
//! `id` and every payload byte. Multi-byte fields are little-endian `i16`.

use crate::control::Point;

/// Sync byte for the protocol.
pub const START_BYTE: u8 = 0xA5;

// Message IDs
pub const MSG_TRACK: u8 = 0x40;
pub const MSG_AIM: u8 = 0x41;
pub const MSG_PARK: u8 = 0x42;
pub const MSG_CENTER: u8 = 0x43;

/// Longest payload of any message.
pub const MAX_PAYLOAD: usize = 8;

/// Payload length for a message ID, or `None` if the ID is unknown.
pub fn payload_len(id: u8) -> Option<usize> {
    match id {
        MSG_TRACK => Some(8),
        MSG_AIM => Some(4),
        MSG_PARK | MSG_CENTER => Some(0),
        _ => None,
    }
}

/// Commands accepted by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Object seen at `observed`; keep it at `center`.
    Track { observed: Point, center: Point },
    /// Aim at an absolute point in the coordinate space.
    Aim(Point),
    /// Move both axes to 0°.
    Park,
    /// Move both axes to neutral.
    Center,
}

impl Command {
    /// Decode a verified payload.
    pub(crate) fn decode(id: u8, payload: &[u8]) -> Option<Self> {
        let field = |i: usize| i16::from_le_bytes([payload[2 * i], payload[2 * i + 1]]) as i32;

        match id {
            MSG_TRACK => Some(Command::Track {
                observed: Point::new(field(0), field(1)),
                center: Point::new(field(2), field(3)),
            }),
            MSG_AIM => Some(Command::Aim(Point::new(field(0), field(1)))),
            MSG_PARK => Some(Command::Park),
            MSG_CENTER => Some(Command::Center),
            _ => None,
        }
    }
}
