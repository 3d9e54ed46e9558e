//! sampler.rs
//! Remote-side input sampling: joystick axes, mode switch and five buttons.
//! - fresh packet every cycle, no history kept
//! - periodic release at `SAMPLE_PERIOD_MS` via SpinSleeper
//! - a simulated joystick stands in for the ADC/GPIO reads on a host

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use log::{debug, info};
use rand::{random_bool, random_range};
use spin_sleep::{SpinSleeper, SpinStrategy};

use crate::component_a::{
    packet::{BUTTON_COUNT, TelemetryPacket},
    transmitter::Transmitter,
};
use crate::config::DriveVariant;
use crate::link::DatagramSink;
use crate::utils::metrics::{Event, EventRecorder};

/// Raw reads from the remote's pins. Axis values are in the native ADC range.
pub trait InputSource {
    fn read_axis_x(&mut self) -> i32;
    fn read_axis_y(&mut self) -> i32;
    /// Joystick push switch, 0 when pressed.
    fn read_switch(&mut self) -> i32;
    /// Button `index` in 1..=5, 1 when pressed.
    fn read_button(&mut self, index: usize) -> i32;
    /// Called once after every sample.
    fn end_cycle(&mut self) {}
}

pub fn sample<I: InputSource + ?Sized>(input: &mut I) -> TelemetryPacket {
    let x = input.read_axis_x();
    let y = input.read_axis_y();
    let sw = input.read_switch();
    let mut buttons = [0i32; BUTTON_COUNT];
    for (i, b) in buttons.iter_mut().enumerate() {
        *b = input.read_button(i + 1);
    }
    TelemetryPacket::new(x, y, sw, buttons)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Rest,
    Forward,
    Backward,
    Left,
    Right,
    /// Switch held, x swept across its range.
    Steer,
}

const GESTURES: [Gesture; 6] = [
    Gesture::Rest,
    Gesture::Forward,
    Gesture::Left,
    Gesture::Steer,
    Gesture::Right,
    Gesture::Backward,
];

/// Scripted joystick with noise: cycles through `GESTURES`, holding each for
/// `hold_ticks` samples. Buttons fire at random with probability `button_rate`.
pub struct SimulatedJoystick {
    rest_x: i32,
    rest_y: i32,
    axis_max: i32,
    noise: i32,
    hold_ticks: u32,
    button_rate: f64,
    tick: u32,
}

impl SimulatedJoystick {
    pub fn new(variant: DriveVariant) -> Self {
        let cal = variant.calibration();
        Self {
            rest_x: cal.x_center,
            rest_y: cal.y_center,
            axis_max: variant.axis_max(),
            noise: (cal.threshold / 4).max(1),
            hold_ticks: 20,
            button_rate: 0.02,
            tick: 0,
        }
    }

    pub fn with_hold_ticks(mut self, hold_ticks: u32) -> Self {
        self.hold_ticks = hold_ticks.max(1);
        self
    }

    pub fn with_button_rate(mut self, rate: f64) -> Self {
        self.button_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn gesture(&self) -> Gesture {
        GESTURES[(self.tick / self.hold_ticks) as usize % GESTURES.len()]
    }

    /// Advance to the next sample.
    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    fn jitter(&self, v: i32) -> i32 {
        (v + random_range(-self.noise..=self.noise)).clamp(0, self.axis_max)
    }
}

impl InputSource for SimulatedJoystick {
    fn read_axis_x(&mut self) -> i32 {
        let x = match self.gesture() {
            Gesture::Left => 0,
            Gesture::Right => self.axis_max,
            Gesture::Steer => {
                let phase = self.tick % self.hold_ticks;
                (self.axis_max as i64 * phase as i64 / self.hold_ticks as i64) as i32
            }
            _ => self.rest_x,
        };
        self.jitter(x)
    }

    fn read_axis_y(&mut self) -> i32 {
        let y = match self.gesture() {
            Gesture::Forward => 0,
            Gesture::Backward => self.axis_max,
            _ => self.rest_y,
        };
        self.jitter(y)
    }

    fn read_switch(&mut self) -> i32 {
        if self.gesture() == Gesture::Steer { 0 } else { 1 }
    }

    fn read_button(&mut self, _index: usize) -> i32 {
        random_bool(self.button_rate) as i32
    }

    fn end_cycle(&mut self) {
        self.advance();
    }
}

/// Periodic sampling loop: read inputs, encode, send, sleep.
pub struct Sampler<S: DatagramSink> {
    pub name: String,
    pub period_ms: u64,
    pub transmitter: Transmitter<S>,
    pub running: Arc<AtomicBool>,
    pub event_recorder: Arc<EventRecorder>,
}

impl<S: DatagramSink> Sampler<S> {
    pub fn new(
        name: &str,
        period_ms: u64,
        transmitter: Transmitter<S>,
        running: Arc<AtomicBool>,
        event_recorder: Arc<EventRecorder>,
    ) -> Self {
        Self {
            name: name.to_string(),
            period_ms,
            transmitter,
            running,
            event_recorder,
        }
    }

    /// Runs until `running` is cleared. Late wake-ups are not made up for.
    pub fn run<I: InputSource + ?Sized>(&self, input: &mut I) {
        let period = Duration::from_millis(self.period_ms);
        let sleeper = SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread);
        let mut next_release = Instant::now() + period;

        info!("[{}] sampling every {} ms", self.name, self.period_ms);

        while self.running.load(Ordering::Acquire) {
            let now = Instant::now();
            if now < next_release {
                sleeper.sleep(next_release - now);
            } else {
                debug!("[{}] late by {:?}", self.name, now - next_release);
                next_release = now;
            }

            let packet = sample(input);
            input.end_cycle();
            let sent = self.transmitter.transmit(&packet);

            self.event_recorder.record(Event::Sampled {
                ts_ns: self.event_recorder.now_ns(),
                x: packet.x,
                y: packet.y,
                sw: packet.sw,
                sent,
            });

            next_release += period;
        }

        debug!("[{}] stopped.", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(TelemetryPacket);

    impl InputSource for Fixed {
        fn read_axis_x(&mut self) -> i32 {
            self.0.x
        }
        fn read_axis_y(&mut self) -> i32 {
            self.0.y
        }
        fn read_switch(&mut self) -> i32 {
            self.0.sw
        }
        fn read_button(&mut self, index: usize) -> i32 {
            self.0.button(index)
        }
    }

    #[test]
    fn sample_copies_every_input() {
        let p = TelemetryPacket::new(12, 34, 1, [0, 1, 0, 1, 1]);
        assert_eq!(sample(&mut Fixed(p)), p);
    }

    #[test]
    fn joystick_walks_gesture_script() {
        let mut js = SimulatedJoystick::new(DriveVariant::DigitalHBridge)
            .with_hold_ticks(2)
            .with_button_rate(0.0);
        let mut seen = Vec::new();
        for _ in 0..(2 * GESTURES.len()) {
            seen.push(js.gesture());
            js.advance();
        }
        seen.dedup();
        assert_eq!(seen, GESTURES.to_vec());
    }

    #[test]
    fn joystick_readings_stay_in_adc_range() {
        let mut js = SimulatedJoystick::new(DriveVariant::ContinuousServo).with_hold_ticks(3);
        for _ in 0..60 {
            let p = sample(&mut js);
            assert!((0..=65535).contains(&p.x));
            assert!((0..=65535).contains(&p.y));
            assert!(p.sw == 0 || p.sw == 1);
            assert!(p.buttons.iter().all(|b| *b == 0 || *b == 1));
            js.advance();
        }
    }

    #[test]
    fn steer_gesture_holds_switch() {
        let mut js = SimulatedJoystick::new(DriveVariant::DigitalHBridge).with_hold_ticks(1);
        while js.gesture() != Gesture::Steer {
            js.advance();
        }
        assert_eq!(js.read_switch(), 0);
        js.advance();
        assert_eq!(js.read_switch(), 1);
    }
}
