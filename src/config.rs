//! Node configuration.
//!
//! Nothing is persisted. Constants below, plus a `DriveVariant` chosen at
//! start-up that pairs a joystick calibration with an actuator profile.

use std::{fmt, str::FromStr};

use crate::component_b::actuation::{ActuatorProfile, DigitalDriveProfile, ServoDriveProfile};
use crate::component_b::decoder::Calibration;

/// Remote sampling period.
pub const SAMPLE_PERIOD_MS: u64 = 50;

/// Volume the driver sets on the voice module at start-up.
pub const STARTUP_VOLUME: u8 = 20;

/// Default UDP port the driver listens on.
pub const DEFAULT_DRIVER_PORT: u16 = 5005;

/// In-process link depth (~1 s of packets at the sampling rate).
pub const CHANNEL_LINK_CAPACITY: usize = 20;

/// Length of one interactive simulation run.
pub const SIMULATION_DURATION_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveVariant {
    /// 12-bit joystick, DC motors on an H-bridge.
    DigitalHBridge,
    /// 16-bit joystick, continuous-rotation servos.
    ContinuousServo,
}

impl DriveVariant {
    pub fn calibration(&self) -> Calibration {
        match self {
            DriveVariant::DigitalHBridge => Calibration::twelve_bit(),
            DriveVariant::ContinuousServo => Calibration::sixteen_bit(),
        }
    }

    pub fn profile(&self) -> Box<dyn ActuatorProfile> {
        match self {
            DriveVariant::DigitalHBridge => Box::new(DigitalDriveProfile),
            DriveVariant::ContinuousServo => Box::new(ServoDriveProfile::default()),
        }
    }

    /// Full-scale ADC reading of the joystick axes.
    pub fn axis_max(&self) -> i32 {
        match self {
            DriveVariant::DigitalHBridge => 3800,
            DriveVariant::ContinuousServo => 65535,
        }
    }
}

impl fmt::Display for DriveVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveVariant::DigitalHBridge => write!(f, "hbridge"),
            DriveVariant::ContinuousServo => write!(f, "servo"),
        }
    }
}

impl FromStr for DriveVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hbridge" | "h-bridge" | "digital" => Ok(DriveVariant::DigitalHBridge),
            "servo" | "continuous" | "continuous-servo" => Ok(DriveVariant::ContinuousServo),
            other => Err(format!("unknown drive variant '{}' (expected hbridge|servo)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parses_and_displays() {
        for v in [DriveVariant::DigitalHBridge, DriveVariant::ContinuousServo] {
            assert_eq!(v.to_string().parse::<DriveVariant>().unwrap(), v);
        }
        assert_eq!(" Servo ".parse::<DriveVariant>().unwrap(), DriveVariant::ContinuousServo);
        assert!("tank".parse::<DriveVariant>().is_err());
    }

    #[test]
    fn variants_pair_calibration_with_profile() {
        let v = DriveVariant::DigitalHBridge;
        assert_eq!(v.calibration().threshold, 300);
        assert_eq!(v.profile().name(), "digital-hbridge");

        let v = DriveVariant::ContinuousServo;
        assert_eq!(v.calibration().x_center, 32767);
        assert_eq!(v.profile().name(), "continuous-servo");
    }
}
