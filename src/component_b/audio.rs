//! audio.rs
//! Voice prompt module on a serial line: fixed 7-byte frames, start 0x7E, end 0xEF.

use std::io::Write;

use log::error;

use crate::error::{LinkError, Result};

pub const MAX_VOLUME: u8 = 30;

const FRAME_START: u8 = 0x7E;
const FRAME_END: u8 = 0xEF;
const CMD_PLAY_TRACK: u8 = 0x03;
const CMD_SET_VOLUME: u8 = 0x06;

pub type Frame = [u8; 7];

fn frame(command: u8, arg: u8) -> Frame {
    [FRAME_START, command, 0x00, 0x02, 0x00, arg, FRAME_END]
}

pub fn play_track_frame(track: u8) -> Frame {
    frame(CMD_PLAY_TRACK, track)
}

/// Volume frame, or `VolumeOutOfRange` above `MAX_VOLUME`.
pub fn set_volume_frame(level: u8) -> Result<Frame> {
    if level > MAX_VOLUME {
        return Err(LinkError::VolumeOutOfRange {
            level,
            max: MAX_VOLUME,
        });
    }
    Ok(frame(CMD_SET_VOLUME, level))
}

/// Writes prompt frames to a byte sink (the module's UART).
pub struct VoicePrompt<W: Write> {
    port: W,
}

impl<W: Write> VoicePrompt<W> {
    pub fn new(port: W) -> Self {
        Self { port }
    }

    pub fn play_track(&mut self, track: u8) -> Result<()> {
        self.port.write_all(&play_track_frame(track))?;
        Ok(())
    }

    pub fn set_volume(&mut self, level: u8) -> Result<()> {
        let frame = set_volume_frame(level).inspect_err(|e| error!("[Audio] {}", e))?;
        self.port.write_all(&frame)?;
        Ok(())
    }

    pub fn port(&self) -> &W {
        &self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_frame_layout() {
        assert_eq!(play_track_frame(3), [0x7E, 0x03, 0x00, 0x02, 0x00, 0x03, 0xEF]);
    }

    #[test]
    fn volume_ceiling_is_inclusive() {
        assert_eq!(set_volume_frame(30).unwrap(), [0x7E, 0x06, 0x00, 0x02, 0x00, 30, 0xEF]);
        assert!(matches!(
            set_volume_frame(31),
            Err(LinkError::VolumeOutOfRange { level: 31, max: 30 })
        ));
    }

    #[test]
    fn rejected_volume_writes_nothing() {
        let mut prompt = VoicePrompt::new(Vec::new());
        assert!(prompt.set_volume(99).is_err());
        assert!(prompt.port().is_empty());

        prompt.set_volume(20).unwrap();
        prompt.play_track(1).unwrap();
        assert_eq!(prompt.port().len(), 14);
        assert_eq!(prompt.port()[5], 20);
        assert_eq!(prompt.port()[12], 1);
    }
}
