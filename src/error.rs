//! error.rs
//! Error kinds surfaced by the link: malformed datagrams, rejected volume
//! requests, and I/O failures from the transport or serial collaborators.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    /// Datagram length did not match the fixed packet size. Nothing was decoded.
    #[error("received data length mismatch: expected {expected} bytes, got {actual}")]
    MalformedPacket { expected: usize, actual: usize },

    /// Audio volume request above the module's ceiling.
    #[error("volume level must be between 0 and {max}, got {level}")]
    VolumeOutOfRange { level: u8, max: u8 },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, LinkError>;
