//! Driver node over UDP.
//!
//! Usage: `driver [bind_addr] [hbridge|servo]`
//! Listens for telemetry datagrams and drives the simulated actuators.
//! Runs until interrupted; events stream to `data/logs/driver_events_<variant>.csv`.

use std::{
    env,
    io::sink,
    net::SocketAddr,
    process::ExitCode,
    fs::create_dir_all,
    path::PathBuf,
    sync::{Arc, atomic::AtomicBool},
};

use log::{error, info};

use rc_link::{
    component_b::{drivers::SimulatedDriver, receiver::Receiving},
    config::{DEFAULT_DRIVER_PORT, DriveVariant},
    link::udp::UdpSource,
    utils::metrics::{EventRecorder, LinkStats},
};

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args().skip(1);
    let bind: SocketAddr = match args
        .next()
        .unwrap_or_else(|| format!("0.0.0.0:{}", DEFAULT_DRIVER_PORT))
        .parse()
    {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid bind address: {}", e);
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

    let source = match UdpSource::bind(bind) {
        Ok(s) => s,
        Err(e) => {
            error!("Error initializing link: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let event_recorder = Arc::new(EventRecorder::new());

    let log_dir = PathBuf::from("data/logs");
    match create_dir_all(&log_dir) {
        Ok(()) => {
            let csv_path = log_dir.join(format!("driver_events_{}.csv", variant));
            event_recorder.start_live_exporter(csv_path, running.clone());
        }
        Err(e) => error!("Failed to create log directory {:?}: {}", log_dir, e),
    }

    let mut receiver = Receiving::for_variant(
        variant,
        SimulatedDriver::new(sink()),
        Arc::new(LinkStats::new()),
        event_recorder,
    );
    if let Err(e) = receiver.start() {
        error!("Start-up failed: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Driver listening on {} (variant={})", bind, variant);
    receiver.run(&source, &running);

    ExitCode::SUCCESS
}
