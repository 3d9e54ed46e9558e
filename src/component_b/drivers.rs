//! drivers.rs
//! Actuator driver capability and a simulated hardware adapter.
//!
//! The mapper never touches hardware; it produces an `ActuatorCommand` which
//! `apply` pushes through an `ActuatorDriver`. The simulated driver keeps only
//! the last commanded values, shared behind a mutex so other threads can watch.

use std::{collections::VecDeque, io::Write, sync::Arc};

use log::{debug, info};
use parking_lot::Mutex;

use crate::component_b::actuation::{ActuatorCommand, MotorCommand, StatusColor};
use crate::component_b::audio::VoicePrompt;
use crate::error::Result;
use crate::utils::metrics::push_capped;

pub trait ActuatorDriver {
    fn set_drive_motors(&mut self, left: MotorCommand, right: MotorCommand);
    fn set_steering_angle(&mut self, degrees: u8);
    fn set_status_color(&mut self, color: StatusColor);
    fn play_audio_track(&mut self, track: u8) -> Result<()>;
    /// Rejects levels above the module ceiling without changing anything.
    fn set_audio_volume(&mut self, level: u8) -> Result<()>;
}

/// Push one command to the drivers: steering, status, drive, then audio in ascending order.
pub fn apply<D: ActuatorDriver + ?Sized>(command: &ActuatorCommand, driver: &mut D) -> Result<()> {
    driver.set_steering_angle(command.steering_degrees);
    driver.set_status_color(command.status);
    driver.set_drive_motors(command.drive.left, command.drive.right);
    for track in command.tracks.iter() {
        driver.play_audio_track(track)?;
    }
    Ok(())
}

/// Last commanded setpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorState {
    pub left: Option<MotorCommand>,
    pub right: Option<MotorCommand>,
    pub steering_degrees: u8,
    pub status: StatusColor,
    pub volume: Option<u8>,
    pub tracks_played: u64,
    pub recent_tracks: VecDeque<u8>,
}

impl Default for ActuatorState {
    fn default() -> Self {
        Self {
            left: None,
            right: None,
            steering_degrees: 90,
            status: StatusColor::OFF,
            volume: None,
            tracks_played: 0,
            recent_tracks: VecDeque::new(),
        }
    }
}

pub type SharedActuatorState = Arc<Mutex<ActuatorState>>;

/// Logs every write and records it in `ActuatorState`; audio frames go to `W`.
pub struct SimulatedDriver<W: Write> {
    state: SharedActuatorState,
    audio: VoicePrompt<W>,
}

impl<W: Write> SimulatedDriver<W> {
    pub fn new(audio_port: W) -> Self {
        Self {
            state: Arc::new(Mutex::new(ActuatorState::default())),
            audio: VoicePrompt::new(audio_port),
        }
    }

    pub fn state(&self) -> SharedActuatorState {
        self.state.clone()
    }

    pub fn snapshot(&self) -> ActuatorState {
        self.state.lock().clone()
    }

    pub fn audio(&self) -> &VoicePrompt<W> {
        &self.audio
    }
}

impl<W: Write> ActuatorDriver for SimulatedDriver<W> {
    fn set_drive_motors(&mut self, left: MotorCommand, right: MotorCommand) {
        let mut s = self.state.lock();
        if s.left != Some(left) || s.right != Some(right) {
            debug!("[Driver] motors L={:?} R={:?}", left, right);
        }
        s.left = Some(left);
        s.right = Some(right);
    }

    fn set_steering_angle(&mut self, degrees: u8) {
        self.state.lock().steering_degrees = degrees.min(180);
    }

    fn set_status_color(&mut self, color: StatusColor) {
        let mut s = self.state.lock();
        if s.status != color {
            debug!("[Driver] status LED {}", color.name());
        }
        s.status = color;
    }

    fn play_audio_track(&mut self, track: u8) -> Result<()> {
        self.audio.play_track(track)?;
        let mut s = self.state.lock();
        s.tracks_played += 1;
        push_capped(&mut s.recent_tracks, track);
        debug!("[Driver] play track {}", track);
        Ok(())
    }

    fn set_audio_volume(&mut self, level: u8) -> Result<()> {
        self.audio.set_volume(level)?;
        self.state.lock().volume = Some(level);
        info!("[Driver] audio volume {}", level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_b::actuation::DrivePair;
    use crate::component_b::decoder::ButtonTriggers;
    use crate::component_a::packet::TelemetryPacket;
    use crate::error::LinkError;

    fn command(buttons: [i32; 5]) -> ActuatorCommand {
        ActuatorCommand {
            steering_degrees: 45,
            drive: DrivePair {
                left: MotorCommand::ServoSpeed(100),
                right: MotorCommand::ServoSpeed(40),
            },
            status: StatusColor::GREEN,
            tracks: ButtonTriggers::from_packet(&TelemetryPacket::new(0, 0, 0, buttons)),
        }
    }

    #[test]
    fn apply_records_last_setpoints() {
        let mut driver = SimulatedDriver::new(Vec::new());
        apply(&command([0; 5]), &mut driver).unwrap();

        let s = driver.snapshot();
        assert_eq!(s.steering_degrees, 45);
        assert_eq!(s.status, StatusColor::GREEN);
        assert_eq!(s.left, Some(MotorCommand::ServoSpeed(100)));
        assert_eq!(s.right, Some(MotorCommand::ServoSpeed(40)));
        assert_eq!(s.tracks_played, 0);
        assert!(driver.audio().port().is_empty());
    }

    #[test]
    fn tracks_play_in_ascending_order() {
        let mut driver = SimulatedDriver::new(Vec::new());
        apply(&command([1, 0, 1, 0, 0]), &mut driver).unwrap();

        let s = driver.snapshot();
        assert_eq!(s.recent_tracks, VecDeque::from(vec![1, 3]));
        let port = driver.audio().port();
        assert_eq!(port.len(), 14);
        assert_eq!((port[5], port[12]), (1, 3));
    }

    #[test]
    fn held_button_retriggers_every_command() {
        let mut driver = SimulatedDriver::new(Vec::new());
        for _ in 0..3 {
            apply(&command([0, 0, 0, 0, 1]), &mut driver).unwrap();
        }
        assert_eq!(driver.snapshot().tracks_played, 3);
    }

    #[test]
    fn rejected_volume_keeps_previous_level() {
        let mut driver = SimulatedDriver::new(Vec::new());
        driver.set_audio_volume(20).unwrap();
        assert!(matches!(
            driver.set_audio_volume(31),
            Err(LinkError::VolumeOutOfRange { level: 31, .. })
        ));
        assert_eq!(driver.snapshot().volume, Some(20));
        assert_eq!(driver.audio().port().len(), 7);
    }

    #[test]
    fn shared_state_tracks_driver_from_another_thread() {
        let mut driver = SimulatedDriver::new(Vec::new());
        let watched = driver.state();

        std::thread::spawn(move || {
            apply(&command([0; 5]), &mut driver).unwrap();
        })
        .join()
        .unwrap();

        let s = watched.lock();
        assert_eq!(s.steering_degrees, 45);
        assert_eq!(s.status, StatusColor::GREEN);
    }
}
