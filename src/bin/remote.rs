//! Remote node over UDP.
//!
//! Usage: `remote [driver_addr] [hbridge|servo]`
//! Samples the scripted joystick every 50 ms and sends each packet to the driver.
//! Runs until interrupted; events stream to `data/logs/remote_events_<variant>.csv`.

use std::{
    env,
    net::SocketAddr,
    process::ExitCode,
    fs::create_dir_all,
    path::PathBuf,
    sync::{Arc, atomic::AtomicBool},
};

use log::{error, info};

use rc_link::{
    component_a::{
        sampler::{Sampler, SimulatedJoystick},
        transmitter::Transmitter,
    },
    config::{DEFAULT_DRIVER_PORT, DriveVariant, SAMPLE_PERIOD_MS},
    link::udp::UdpSink,
    utils::metrics::{EventRecorder, LinkStats},
};

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args().skip(1);
    let peer: SocketAddr = match args
        .next()
        .unwrap_or_else(|| format!("127.0.0.1:{}", DEFAULT_DRIVER_PORT))
        .parse()
    {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid driver address: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let variant = match args.next().map(|s| s.parse::<DriveVariant>()).transpose() {
        Ok(v) => v.unwrap_or(DriveVariant::DigitalHBridge),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let local: SocketAddr = if peer.is_ipv4() {
        SocketAddr::from(([0, 0, 0, 0], 0))
    } else {
        SocketAddr::from(([0u16; 8], 0))
    };
    let sink = match UdpSink::new(local, peer) {
        Ok(s) => s,
        Err(e) => {
            error!("Error initializing link: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Remote ready, variant={}, sending to {}", variant, peer);

    let stats = Arc::new(LinkStats::new());
    let running = Arc::new(AtomicBool::new(true));
    let event_recorder = Arc::new(EventRecorder::new());

    let log_dir = PathBuf::from("data/logs");
    match create_dir_all(&log_dir) {
        Ok(()) => {
            let csv_path = log_dir.join(format!("remote_events_{}.csv", variant));
            event_recorder.start_live_exporter(csv_path, running.clone());
        }
        Err(e) => error!("Failed to create log directory {:?}: {}", log_dir, e),
    }

    let sampler = Sampler::new(
        "Remote",
        SAMPLE_PERIOD_MS,
        Transmitter::new(sink, stats),
        running,
        event_recorder,
    );
    let mut joystick = SimulatedJoystick::new(variant);
    sampler.run(&mut joystick);

    ExitCode::SUCCESS
}
