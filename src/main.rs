//! # Remote-control link simulation
//!
//! Runs both nodes in one process: the remote samples a scripted joystick
//! every 50 ms and sends packets over an in-process datagram link; the driver
//! decodes them and drives simulated actuators.
//!
//! ## Outputs
//! - `data/logs/link_events_<variant>.csv`: sampled/applied/malformed events.
//! - Link counters and last actuator state printed at the end of each run.

use std::{
    fs::create_dir_all,
    io::{Write, sink, stdin, stdout},
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use log::{error, info};
use thread_priority::{ThreadBuilderExt, ThreadPriority};

use rc_link::{
    component_a::{
        sampler::{Sampler, SimulatedJoystick},
        transmitter::Transmitter,
    },
    component_b::{drivers::SimulatedDriver, receiver::Receiving},
    config::{CHANNEL_LINK_CAPACITY, DriveVariant, SAMPLE_PERIOD_MS, SIMULATION_DURATION_SECS},
    link::channel,
    utils::metrics::{EventRecorder, LinkStats},
};

fn main() {
    env_logger::init();
    info!("=== RC LINK SIMULATION START ===");

    loop {
        let choice = prompt_menu();
        match choice.as_str() {
            "1" | "" => run_simulation(DriveVariant::DigitalHBridge),
            "2" => run_simulation(DriveVariant::ContinuousServo),
            "3" => {
                println!("Exiting. Goodbye!");
                info!("=== RC LINK SIMULATION FINISHED ===");
                return;
            }
            other => {
                println!("Unrecognized option '{}', please try again.", other);
            }
        }
    }
}

fn prompt_menu() -> String {
    println!("\n┌─────────────────────────────────────────────┐");
    println!("│     SELECT DRIVE VARIANT                    │");
    println!("├─────────────────────────────────────────────┤");
    println!("│  1) H-bridge DC motors, 12-bit joystick     │");
    println!("│  2) Continuous servos, 16-bit joystick      │");
    println!("│  3) Exit                                    │");
    println!("└─────────────────────────────────────────────┘");
    print!("Select [1/2/3] (default: 1): ");
    let _ = stdout().flush();

    let mut input = String::new();
    let _ = stdin().read_line(&mut input);
    input.trim().to_string()
}

fn run_simulation(variant: DriveVariant) {
    info!("[Simulation] Starting: variant={}", variant);

    let stats = Arc::new(LinkStats::new());
    let event_recorder = Arc::new(EventRecorder::new());
    let running = Arc::new(AtomicBool::new(true));

    let (link_tx, link_rx) = channel::link(CHANNEL_LINK_CAPACITY);

    let driver = SimulatedDriver::new(sink());
    let actuators = driver.state();

    let receiver_handle = {
        let stats = stats.clone();
        let recorder = event_recorder.clone();
        let running = running.clone();

        thread::Builder::new()
            .name("driver".to_string())
            .spawn_with_priority(ThreadPriority::Max, move |prio| {
                if let Err(e) = prio {
                    info!("[Driver] running at default priority: {:?}", e);
                }
                let mut receiver = Receiving::for_variant(variant, driver, stats, recorder);
                if let Err(e) = receiver.start() {
                    error!("[Driver] start-up failed: {}", e);
                }
                receiver.run(&link_rx, &running);
            })
    };
    let receiver_handle = match receiver_handle {
        Ok(h) => h,
        Err(e) => {
            error!("Failed to spawn driver thread: {}", e);
            return;
        }
    };

    let sampler_handle = {
        let transmitter = Transmitter::new(link_tx, stats.clone());
        let sampler = Sampler::new("Remote", SAMPLE_PERIOD_MS, transmitter, running.clone(), event_recorder.clone());
        thread::spawn(move || {
            let mut joystick = SimulatedJoystick::new(variant);
            sampler.run(&mut joystick);
        })
    };

    info!("[Simulation] Running for {} seconds...", SIMULATION_DURATION_SECS);
    for second in 1..=SIMULATION_DURATION_SECS {
        thread::sleep(Duration::from_secs(1));
        let s = actuators.lock();
        info!(
            "[Simulation] t={}s steer={} led={} L={:?} R={:?}",
            second,
            s.steering_degrees,
            s.status.name(),
            s.left,
            s.right
        );
    }
    running.store(false, Ordering::Release);

    // Sampler owns the sink; once it exits the driver sees the link close.
    let _ = sampler_handle.join();
    if receiver_handle.join().is_err() {
        error!("Driver thread panicked");
    }

    let log_dir = PathBuf::from("data/logs");
    match create_dir_all(&log_dir) {
        Ok(()) => {
            let csv_path = log_dir.join(format!("link_events_{}.csv", variant));
            let _ = event_recorder.start_exporter(csv_path).join();
        }
        Err(e) => error!("Failed to create log directory {:?}: {}", log_dir, e),
    }

    let s = stats.snapshot();
    println!("\n── {} ──", variant);
    println!("packets sent      : {}", s.packets_sent);
    println!("send failures     : {}", s.send_failures);
    println!("packets received  : {}", s.packets_received);
    println!("malformed         : {}", s.malformed);
    println!("commands applied  : {}", s.commands_applied);
    println!("tracks requested  : {}", s.tracks_requested);
    println!("apply failures    : {}", s.apply_failures);
    let state = actuators.lock();
    println!(
        "last command      : steer={} led={} L={:?} R={:?}",
        state.steering_degrees,
        state.status.name(),
        state.left,
        state.right
    );

    info!("[Simulation] Completed: variant={}", variant);
}
