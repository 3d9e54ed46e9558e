//! packet.rs
//! Fixed-layout telemetry packet exchanged between the remote and the driver.
//!
//! Wire image: eight little-endian `i32` in the order x, y, sw, btn1..btn5
//! (32 bytes, no padding). A datagram is accepted only when its length is
//! exactly `PACKET_SIZE`; anything else is a malformed packet, never a partial one.

use crate::error::{LinkError, Result};

pub const BUTTON_COUNT: usize = 5;
const FIELD_COUNT: usize = 3 + BUTTON_COUNT;
const FIELD_SIZE: usize = size_of::<i32>();

/// Serialized size of one telemetry packet in bytes.
pub const PACKET_SIZE: usize = FIELD_COUNT * FIELD_SIZE;

/// One joystick/button sample. Values are raw; range checks belong to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetryPacket {
    pub x: i32,
    pub y: i32,
    pub sw: i32,
    pub buttons: [i32; BUTTON_COUNT],
}

impl TelemetryPacket {
    pub fn new(x: i32, y: i32, sw: i32, buttons: [i32; BUTTON_COUNT]) -> Self {
        Self { x, y, sw, buttons }
    }

    /// Raw state of button `index` (1-based, 1..=5). Out-of-range indices read as 0.
    pub fn button(&self, index: usize) -> i32 {
        match index {
            1..=BUTTON_COUNT => self.buttons[index - 1],
            _ => 0,
        }
    }

    fn fields(&self) -> [i32; FIELD_COUNT] {
        let mut fields = [0i32; FIELD_COUNT];
        fields[0] = self.x;
        fields[1] = self.y;
        fields[2] = self.sw;
        fields[3..].copy_from_slice(&self.buttons);
        fields
    }

    /// Encode into the fixed wire image.
    pub fn serialize(&self) -> [u8; PACKET_SIZE] {
        let mut out = [0u8; PACKET_SIZE];
        for (chunk, value) in out.chunks_exact_mut(FIELD_SIZE).zip(self.fields()) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }

    /// Accept a received datagram iff its length is exactly `PACKET_SIZE`.
    pub fn validate(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PACKET_SIZE {
            return Err(LinkError::MalformedPacket {
                expected: PACKET_SIZE,
                actual: bytes.len(),
            });
        }

        let mut fields = [0i32; FIELD_COUNT];
        for (field, chunk) in fields.iter_mut().zip(bytes.chunks_exact(FIELD_SIZE)) {
            let mut raw = [0u8; FIELD_SIZE];
            raw.copy_from_slice(chunk);
            *field = i32::from_le_bytes(raw);
        }

        let mut buttons = [0i32; BUTTON_COUNT];
        buttons.copy_from_slice(&fields[3..]);
        Ok(Self {
            x: fields[0],
            y: fields[1],
            sw: fields[2],
            buttons,
        })
    }
}
