//! actuation.rs
//! Maps a decoded intent to concrete actuator commands.
//!
//! The decision table (status colour, which wheel goes which way, servo
//! neutral in drive mode) lives here once. How a wheel direction becomes
//! pin levels or servo speed ticks is the `ActuatorProfile`'s business.

use crate::component_b::decoder::{ActuationIntent, ButtonTriggers, Direction, Motion};

/// Steering servo position while driving.
pub const NEUTRAL_STEERING_ANGLE: i32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelIntent {
    Forward,
    Reverse,
    Stop,
}

/// Per-motor setpoint in the encoding of one hardware variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    /// H-bridge inputs: (HIGH, LOW) forward, (LOW, HIGH) reverse, (LOW, LOW) stop.
    Digital { in1: bool, in2: bool },
    /// Continuous-rotation servo duty tick.
    ServoSpeed(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrivePair {
    pub left: MotorCommand,
    pub right: MotorCommand,
}

/// Three independent LED channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusColor {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl StatusColor {
    pub const OFF: Self = Self::rgb(false, false, false);
    pub const RED: Self = Self::rgb(true, false, false);
    pub const GREEN: Self = Self::rgb(false, true, false);
    pub const YELLOW: Self = Self::rgb(true, true, false);
    pub const MAGENTA: Self = Self::rgb(true, false, true);
    pub const CYAN: Self = Self::rgb(false, true, true);
    pub const WHITE: Self = Self::rgb(true, true, true);

    pub const fn rgb(red: bool, green: bool, blue: bool) -> Self {
        Self { red, green, blue }
    }

    pub fn name(&self) -> &'static str {
        match (self.red, self.green, self.blue) {
            (false, false, false) => "off",
            (true, false, false) => "red",
            (false, true, false) => "green",
            (false, false, true) => "blue",
            (true, true, false) => "yellow",
            (true, false, true) => "magenta",
            (false, true, true) => "cyan",
            (true, true, true) => "white",
        }
    }
}

/// Hardware encoding of drive and steering setpoints.
pub trait ActuatorProfile: Send + Sync {
    fn name(&self) -> &'static str;
    fn drive(&self, left: WheelIntent, right: WheelIntent) -> DrivePair;
    /// Servo degrees for a decoded angle. Clamps to the servo's travel.
    fn steer(&self, angle: i32) -> u8;
}

/// DC motors behind an H-bridge, one direction pin pair per motor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitalDriveProfile;

impl DigitalDriveProfile {
    fn motor(intent: WheelIntent) -> MotorCommand {
        match intent {
            WheelIntent::Forward => MotorCommand::Digital { in1: true, in2: false },
            WheelIntent::Reverse => MotorCommand::Digital { in1: false, in2: true },
            WheelIntent::Stop => MotorCommand::Digital { in1: false, in2: false },
        }
    }
}

impl ActuatorProfile for DigitalDriveProfile {
    fn name(&self) -> &'static str {
        "digital-hbridge"
    }

    fn drive(&self, left: WheelIntent, right: WheelIntent) -> DrivePair {
        DrivePair {
            left: Self::motor(left),
            right: Self::motor(right),
        }
    }

    fn steer(&self, angle: i32) -> u8 {
        angle.clamp(0, 180) as u8
    }
}

/// Continuous-rotation servos. The right servo is mounted mirrored, so its
/// forward and reverse ticks are swapped relative to the left one.
#[derive(Debug, Clone, Copy)]
pub struct ServoDriveProfile {
    pub left_forward: u16,
    pub left_reverse: u16,
    pub right_forward: u16,
    pub right_reverse: u16,
    pub neutral: u16,
}

impl Default for ServoDriveProfile {
    fn default() -> Self {
        Self {
            left_forward: 100,
            left_reverse: 40,
            right_forward: 40,
            right_reverse: 100,
            neutral: 0,
        }
    }
}

impl ServoDriveProfile {
    fn tick(intent: WheelIntent, forward: u16, reverse: u16, neutral: u16) -> MotorCommand {
        MotorCommand::ServoSpeed(match intent {
            WheelIntent::Forward => forward,
            WheelIntent::Reverse => reverse,
            WheelIntent::Stop => neutral,
        })
    }
}

impl ActuatorProfile for ServoDriveProfile {
    fn name(&self) -> &'static str {
        "continuous-servo"
    }

    fn drive(&self, left: WheelIntent, right: WheelIntent) -> DrivePair {
        DrivePair {
            left: Self::tick(left, self.left_forward, self.left_reverse, self.neutral),
            right: Self::tick(right, self.right_forward, self.right_reverse, self.neutral),
        }
    }

    fn steer(&self, angle: i32) -> u8 {
        angle.clamp(0, 180) as u8
    }
}

/// Everything the drivers need for one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommand {
    pub steering_degrees: u8,
    pub drive: DrivePair,
    pub status: StatusColor,
    /// Audio tracks to play, ascending.
    pub tracks: ButtonTriggers,
}

fn wheels(direction: Direction) -> (WheelIntent, WheelIntent, StatusColor) {
    use WheelIntent::*;
    match direction {
        Direction::Forward => (Forward, Forward, StatusColor::GREEN),
        Direction::Backward => (Reverse, Reverse, StatusColor::RED),
        Direction::TurnLeft => (Reverse, Forward, StatusColor::MAGENTA),
        Direction::TurnRight => (Forward, Reverse, StatusColor::CYAN),
        Direction::Stop => (Stop, Stop, StatusColor::OFF),
    }
}

pub fn map<P: ActuatorProfile + ?Sized>(intent: &ActuationIntent, profile: &P) -> ActuatorCommand {
    let (steering_degrees, drive, status) = match intent.motion {
        Motion::Steering { angle, right_of_center } => {
            let status = if right_of_center {
                StatusColor::WHITE
            } else {
                StatusColor::YELLOW
            };
            (
                profile.steer(angle),
                profile.drive(WheelIntent::Stop, WheelIntent::Stop),
                status,
            )
        }
        Motion::Drive { direction } => {
            let (left, right, status) = wheels(direction);
            (
                profile.steer(NEUTRAL_STEERING_ANGLE),
                profile.drive(left, right),
                status,
            )
        }
    };

    ActuatorCommand {
        steering_degrees,
        drive,
        status,
        tracks: intent.triggers,
    }
}
