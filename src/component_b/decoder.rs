//! decoder.rs
//! Turns a validated telemetry packet into an actuation intent.
//!
//! - `sw == 0` selects steering: x is rescaled to a servo angle through a
//!   configurable linear transform.
//! - any other `sw` selects drive: a dead-zone cross around the calibrated
//!   centre, Y checked before X, first match wins.
//! - pressed buttons (`btnN == 1`) become audio triggers.
//!
//! Pure function of (packet, calibration). Never fails.

use crate::component_a::packet::{BUTTON_COUNT, TelemetryPacket};

/// Linear rescale `offset + ((x - pivot) * scale_num) / scale_den`, optionally clamped.
///
/// Integer arithmetic is done in `i64` and truncates toward zero, so every
/// `i32` input yields a defined angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearMap {
    pub pivot: i32,
    pub scale_num: i32,
    pub scale_den: i32,
    pub offset: i32,
    pub clamp: Option<(i32, i32)>,
}

impl LinearMap {
    /// Map `[in_min, in_max]` onto `[out_min, out_max]`, clamped to the output range.
    pub const fn rescale_clamped(in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> Self {
        Self {
            pivot: in_min,
            scale_num: out_max - out_min,
            scale_den: in_max - in_min,
            offset: out_min,
            clamp: Some((out_min, out_max)),
        }
    }

    /// `60 + ((center - x) * 60) / center`, unclamped. Full left gives 120, full right ~0.
    pub const fn centered_sweep(center: i32) -> Self {
        Self {
            pivot: center,
            scale_num: -60,
            scale_den: center,
            offset: 60,
            clamp: None,
        }
    }

    pub fn apply(&self, x: i32) -> i32 {
        let scaled = if self.scale_den == 0 {
            0
        } else {
            (x as i64 - self.pivot as i64) * self.scale_num as i64 / self.scale_den as i64
        };
        let mut angle = self.offset as i64 + scaled;
        if let Some((lo, hi)) = self.clamp {
            angle = angle.clamp(lo as i64, hi as i64);
        }
        angle.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

/// How steering mode turns `x` into an angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleMapping {
    /// Fixed transform over the joystick's input domain.
    Linear(LinearMap),
    /// `LinearMap::centered_sweep` around the calibration's `x_center`.
    CenteredSweep,
}

impl AngleMapping {
    pub const fn resolve(&self, x_center: i32) -> LinearMap {
        match *self {
            AngleMapping::Linear(map) => map,
            AngleMapping::CenteredSweep => LinearMap::centered_sweep(x_center),
        }
    }
}

/// Joystick rest position and dead-zone half width, plus the steering transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub x_center: i32,
    pub y_center: i32,
    pub threshold: i32,
    pub angle: AngleMapping,
}

impl Calibration {
    /// 12-bit joystick on the H-bridge driver (X spans 0..=3800).
    pub const fn twelve_bit() -> Self {
        Self {
            x_center: 2433,
            y_center: 2480,
            threshold: 300,
            angle: AngleMapping::Linear(LinearMap::rescale_clamped(0, 3800, 0, 180)),
        }
    }

    /// 16-bit joystick resting at mid-scale, continuous-servo drive.
    pub const fn sixteen_bit() -> Self {
        Self {
            x_center: 32767,
            y_center: 32767,
            threshold: 3000,
            angle: AngleMapping::CenteredSweep,
        }
    }

    pub fn steering_angle(&self, x: i32) -> i32 {
        self.angle.resolve(self.x_center).apply(x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Steering servo follows x; `right_of_center` is `x > x_center`.
    Steering { angle: i32, right_of_center: bool },
    Drive { direction: Direction },
}

/// Set of pressed button indices (1..=5), iterated in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonTriggers(u8);

impl ButtonTriggers {
    pub fn from_packet(packet: &TelemetryPacket) -> Self {
        let bits = packet
            .buttons
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == 1)
            .fold(0u8, |acc, (i, _)| acc | (1 << i));
        Self(bits)
    }

    pub fn contains(&self, index: u8) -> bool {
        (1..=BUTTON_COUNT as u8).contains(&index) && self.0 & (1 << (index - 1)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=BUTTON_COUNT as u8).filter(|i| self.contains(*i))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationIntent {
    pub motion: Motion,
    pub triggers: ButtonTriggers,
}

pub fn decode(packet: &TelemetryPacket, calibration: &Calibration) -> ActuationIntent {
    let motion = if packet.sw == 0 {
        Motion::Steering {
            angle: calibration.steering_angle(packet.x),
            right_of_center: packet.x > calibration.x_center,
        }
    } else {
        Motion::Drive {
            direction: drive_direction(packet.x, packet.y, calibration),
        }
    };

    ActuationIntent {
        motion,
        triggers: ButtonTriggers::from_packet(packet),
    }
}

/// Dead-zone cross: Y deflection wins over X. Bounds are strict.
fn drive_direction(x: i32, y: i32, cal: &Calibration) -> Direction {
    let (x, y) = (x as i64, y as i64);
    let (xc, yc, t) = (cal.x_center as i64, cal.y_center as i64, cal.threshold as i64);

    if y < yc - t {
        Direction::Forward
    } else if y > yc + t {
        Direction::Backward
    } else if x < xc - t {
        Direction::TurnLeft
    } else if x > xc + t {
        Direction::TurnRight
    } else {
        Direction::Stop
    }
}
