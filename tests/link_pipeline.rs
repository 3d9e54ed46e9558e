//! Remote → channel link → driver, both nodes on their own threads.

use std::{
    io::sink,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use rc_link::{
    component_a::{
        packet::TelemetryPacket,
        sampler::{InputSource, Sampler, SimulatedJoystick},
        transmitter::Transmitter,
    },
    component_b::{actuation::StatusColor, drivers::SimulatedDriver, receiver::Receiving},
    config::DriveVariant,
    link::{DatagramSink, channel},
    utils::metrics::{EventRecorder, LinkStats},
};

/// Joystick pushed fully forward with button 2 held.
struct HeldForward;

impl InputSource for HeldForward {
    fn read_axis_x(&mut self) -> i32 {
        2433
    }
    fn read_axis_y(&mut self) -> i32 {
        0
    }
    fn read_switch(&mut self) -> i32 {
        1
    }
    fn read_button(&mut self, index: usize) -> i32 {
        (index == 2) as i32
    }
}

#[test]
fn held_forward_drives_and_retriggers_audio() {
    let stats = Arc::new(LinkStats::new());
    let recorder = Arc::new(EventRecorder::new());
    let running = Arc::new(AtomicBool::new(true));
    let (tx, rx) = channel::link(64);

    let driver = {
        let (stats, recorder, running) = (stats.clone(), recorder.clone(), running.clone());
        thread::spawn(move || {
            let mut r = Receiving::for_variant(
                DriveVariant::DigitalHBridge,
                SimulatedDriver::new(sink()),
                stats,
                recorder,
            );
            r.start().unwrap();
            r.run(&rx, &running);
            r.driver().snapshot()
        })
    };

    let remote = {
        let sampler = Sampler::new("test-remote", 5, Transmitter::new(tx, stats.clone()), running.clone(), recorder);
        thread::spawn(move || sampler.run(&mut HeldForward))
    };

    thread::sleep(Duration::from_millis(100));
    running.store(false, Ordering::Release);
    remote.join().unwrap();
    let state = driver.join().unwrap();

    let s = stats.snapshot();
    assert!(s.packets_sent >= 2, "sent {}", s.packets_sent);
    assert_eq!(s.malformed, 0);
    assert_eq!(s.tracks_requested, s.commands_applied);
    assert_eq!(state.status, StatusColor::GREEN);
    assert_eq!(state.steering_degrees, 90);
    assert!(state.recent_tracks.iter().all(|t| *t == 2));
    assert_eq!(state.tracks_played, s.commands_applied);
}

#[test]
fn garbage_between_packets_is_skipped() {
    let stats = Arc::new(LinkStats::new());
    let (tx, rx) = channel::link(8);
    let mut r = Receiving::for_variant(
        DriveVariant::ContinuousServo,
        SimulatedDriver::new(Vec::new()),
        stats.clone(),
        Arc::new(EventRecorder::new()),
    );

    let backward = TelemetryPacket::new(32767, 65535, 1, [0; 5]).serialize();
    tx.send(&backward).unwrap();
    tx.send(b"12000,30000,1,0,0,0,0").unwrap();
    tx.send(&backward[..16]).unwrap();
    drop(tx);

    r.run(&rx, &AtomicBool::new(true));

    let s = stats.snapshot();
    assert_eq!((s.packets_received, s.malformed), (1, 2));
    assert_eq!(r.driver().snapshot().status, StatusColor::RED);
}

#[test]
fn scripted_joystick_produces_only_valid_traffic() {
    let stats = Arc::new(LinkStats::new());
    let (tx, rx) = channel::link(256);
    let transmitter = Transmitter::new(tx, stats.clone());
    let mut joystick = SimulatedJoystick::new(DriveVariant::ContinuousServo).with_hold_ticks(4);

    for _ in 0..48 {
        let p = rc_link::component_a::sampler::sample(&mut joystick);
        joystick.end_cycle();
        assert!(transmitter.transmit(&p));
    }
    drop(transmitter);

    let mut r = Receiving::for_variant(
        DriveVariant::ContinuousServo,
        SimulatedDriver::new(sink()),
        stats.clone(),
        Arc::new(EventRecorder::new()),
    );
    r.run(&rx, &AtomicBool::new(true));

    let s = stats.snapshot();
    assert_eq!(s.packets_sent, 48);
    assert_eq!(s.packets_received, 48);
    assert_eq!(s.malformed, 0);
}
