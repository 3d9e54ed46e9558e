//! Two-node wireless remote control for a small robot.
//!
//! Remote (component A) samples a joystick and five buttons and sends a
//! fixed 32-byte telemetry packet every 50 ms. Driver (component B) validates
//! each datagram, decodes it against a joystick calibration into a steering
//! or drive intent, and maps that to motor, servo, status LED and audio
//! commands through a hardware profile.

pub mod component_a;
pub mod component_b;
pub mod config;
pub mod error;
pub mod link;
pub mod utils;
