//! receiver.rs
//! Driver-side message handler: validate → decode → map → apply, once per datagram.
//! - runs synchronously in the delivery context; returns before the next datagram is read
//! - no queue of its own: whatever the link buffers is what gets processed
//! - a malformed datagram is dropped with a diagnostic and leaves the actuators as they were
//! - no watchdog: if the remote goes quiet the last command stays in force

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use log::{debug, error, info, warn};

use crate::component_a::packet::TelemetryPacket;
use crate::component_b::{
    actuation::{ActuatorCommand, ActuatorProfile, NEUTRAL_STEERING_ANGLE, StatusColor, map},
    decoder::{Calibration, decode},
    drivers::{ActuatorDriver, apply},
};
use crate::config::{DriveVariant, STARTUP_VOLUME};
use crate::error::{LinkError, Result};
use crate::link::{DatagramSource, MAX_DATAGRAM_SIZE};
use crate::utils::metrics::{Event, EventRecorder, LinkStats};

pub struct Receiving<D: ActuatorDriver> {
    calibration: Calibration,
    profile: Box<dyn ActuatorProfile>,
    driver: D,
    stats: Arc<LinkStats>,
    event_recorder: Arc<EventRecorder>,
    last_command: Option<ActuatorCommand>,
}

impl<D: ActuatorDriver> Receiving<D> {
    pub fn new(
        calibration: Calibration,
        profile: Box<dyn ActuatorProfile>,
        driver: D,
        stats: Arc<LinkStats>,
        event_recorder: Arc<EventRecorder>,
    ) -> Self {
        Self {
            calibration,
            profile,
            driver,
            stats,
            event_recorder,
            last_command: None,
        }
    }

    pub fn for_variant(
        variant: DriveVariant,
        driver: D,
        stats: Arc<LinkStats>,
        event_recorder: Arc<EventRecorder>,
    ) -> Self {
        Self::new(variant.calibration(), variant.profile(), driver, stats, event_recorder)
    }

    /// Power-on state: steering centred, LED off, voice module at start-up volume.
    pub fn start(&mut self) -> Result<()> {
        self.driver
            .set_steering_angle(self.profile.steer(NEUTRAL_STEERING_ANGLE));
        self.driver.set_status_color(StatusColor::OFF);
        self.driver.set_audio_volume(STARTUP_VOLUME)?;
        info!("[Receiver] ready, profile={}", self.profile.name());
        Ok(())
    }

    /// Handle one datagram. On `MalformedPacket` nothing reaches the drivers.
    pub fn handle_datagram(&mut self, bytes: &[u8]) -> Result<ActuatorCommand> {
        let packet = match TelemetryPacket::validate(bytes) {
            Ok(p) => p,
            Err(e) => {
                self.stats.record_malformed();
                self.event_recorder.record(Event::Malformed {
                    ts_ns: self.event_recorder.now_ns(),
                    len: bytes.len(),
                });
                warn!("[Receiver] {}", e);
                return Err(e);
            }
        };
        self.stats.record_received();

        debug!(
            "[Receiver] X: {} | Y: {} | SW: {} | BTN: {:?}",
            packet.x, packet.y, packet.sw, packet.buttons
        );

        let intent = decode(&packet, &self.calibration);
        let command = map(&intent, self.profile.as_ref());

        // Setpoints written before a failing audio write stay in force, so
        // they are counted either way.
        let applied = apply(&command, &mut self.driver);
        self.last_command = Some(command);
        self.stats.record_applied(command.tracks.len());
        self.event_recorder.record(Event::Applied {
            ts_ns: self.event_recorder.now_ns(),
            command,
            motion: intent.motion,
            complete: applied.is_ok(),
        });
        if applied.is_err() {
            self.stats.record_apply_failure();
        }
        applied.map(|()| command)
    }

    /// Receive loop. Exits when `running` is cleared or the link closes.
    pub fn run<S: DatagramSource + ?Sized>(&mut self, source: &S, running: &AtomicBool) {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        while running.load(Ordering::Acquire) {
            match source.recv(&mut buf) {
                Ok(Some(n)) => match self.handle_datagram(&buf[..n]) {
                    Ok(_) | Err(LinkError::MalformedPacket { .. }) => {}
                    Err(e) => error!("[Receiver] failed to apply command: {}", e),
                },
                Ok(None) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    info!("[Receiver] link closed: {}", e);
                    break;
                }
                Err(e) => warn!("[Receiver] receive error: {}", e),
            }
        }

        info!("[Receiver] stopped, holding last command {:?}", self.last_command);
    }

    pub fn last_command(&self) -> Option<&ActuatorCommand> {
        self.last_command.as_ref()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}
