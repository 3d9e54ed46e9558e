//! Link counters and event recording.
//!
//! Two independent paths:
//! - **LinkStats:** atomic counters shared by both nodes (no locks on the packet path).
//! - **EventRecorder:** lock-free queue (4K capacity) → background CSV export.

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crossbeam_queue::ArrayQueue;
use log::{error, info};
use serde::Serialize;

use crate::component_b::actuation::ActuatorCommand;
use crate::component_b::decoder::{Direction, Motion};

pub const MAX_POINTS: usize = 1_000;
const EVENT_QUEUE_CAPACITY: usize = 4_096;
const EXPORT_POLL_MS: u64 = 10;

/// Appends value to a bounded history; drops the oldest when full.
#[inline]
pub fn push_capped<T>(buf: &mut VecDeque<T>, val: T) {
    if buf.len() >= MAX_POINTS {
        buf.pop_front();
    }
    buf.push_back(val);
}

/// Packet path counters. All increments are `Relaxed`; readers only want totals.
#[derive(Debug, Default)]
pub struct LinkStats {
    packets_sent: AtomicU64,
    send_failures: AtomicU64,
    packets_received: AtomicU64,
    malformed: AtomicU64,
    commands_applied: AtomicU64,
    tracks_requested: AtomicU64,
    apply_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStatsSnapshot {
    pub packets_sent: u64,
    pub send_failures: u64,
    pub packets_received: u64,
    pub malformed: u64,
    pub commands_applied: u64,
    pub tracks_requested: u64,
    pub apply_failures: u64,
}

impl LinkStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sent(&self) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_received(&self) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_applied(&self, tracks: usize) {
        self.commands_applied.fetch_add(1, Ordering::Relaxed);
        self.tracks_requested.fetch_add(tracks as u64, Ordering::Relaxed);
    }

    /// A driver write failed after some setpoints of the command were applied.
    pub fn record_apply_failure(&self) {
        self.apply_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LinkStatsSnapshot {
        LinkStatsSnapshot {
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            packets_received: self.packets_received.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            commands_applied: self.commands_applied.load(Ordering::Relaxed),
            tracks_requested: self.tracks_requested.load(Ordering::Relaxed),
            apply_failures: self.apply_failures.load(Ordering::Relaxed),
        }
    }
}

/// Packet lifecycle on both nodes.
#[derive(Debug, Clone)]
pub enum Event {
    /// Remote sampled its inputs and handed the packet to the link.
    Sampled { ts_ns: u64, x: i32, y: i32, sw: i32, sent: bool },
    /// Driver rejected a datagram by length.
    Malformed { ts_ns: u64, len: usize },
    /// Driver applied a command.
    Applied { ts_ns: u64, command: ActuatorCommand, motion: Motion, complete: bool },
}

#[derive(Debug, Serialize)]
struct CsvRow {
    ts_ns: u64,
    node: &'static str,
    event: &'static str,
    detail: String,
}

impl Event {
    fn to_row(&self) -> CsvRow {
        match self {
            Event::Sampled { ts_ns, x, y, sw, sent } => CsvRow {
                ts_ns: *ts_ns,
                node: "remote",
                event: "Sampled",
                detail: format!("x={} y={} sw={} sent={}", x, y, sw, sent),
            },
            Event::Malformed { ts_ns, len } => CsvRow {
                ts_ns: *ts_ns,
                node: "driver",
                event: "Malformed",
                detail: format!("len={}", len),
            },
            Event::Applied { ts_ns, command, motion, complete } => CsvRow {
                ts_ns: *ts_ns,
                node: "driver",
                event: if *complete { "Applied" } else { "PartiallyApplied" },
                detail: format!(
                    "{} steer={} color={} tracks={:?}",
                    motion_label(motion),
                    command.steering_degrees,
                    command.status.name(),
                    command.tracks.iter().collect::<Vec<_>>(),
                ),
            },
        }
    }
}

fn motion_label(motion: &Motion) -> String {
    match motion {
        Motion::Steering { angle, .. } => format!("steer({})", angle),
        Motion::Drive { direction } => match direction {
            Direction::Forward => "forward".into(),
            Direction::Backward => "backward".into(),
            Direction::TurnLeft => "left".into(),
            Direction::TurnRight => "right".into(),
            Direction::Stop => "stop".into(),
        },
    }
}

/// Non-blocking event recorder with background CSV export.
///
/// `record()` never blocks; events are dropped when the queue is full.
pub struct EventRecorder {
    queue: Arc<ArrayQueue<Event>>,
    run_start: Instant,
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRecorder {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(ArrayQueue::new(EVENT_QUEUE_CAPACITY)),
            run_start: Instant::now(),
        }
    }

    #[inline]
    pub fn record(&self, event: Event) {
        let _ = self.queue.push(event);
    }

    /// Nanoseconds since the recorder was created.
    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.run_start.elapsed().as_nanos() as u64
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drain the queue into a CSV file on a background thread.
    /// The thread exits once the queue stays empty for one poll interval.
    pub fn start_exporter(&self, output_csv: PathBuf) -> thread::JoinHandle<()> {
        self.spawn_exporter(output_csv, None)
    }

    /// Like `start_exporter`, but keeps draining while `running` is set and
    /// flushes whenever the queue runs dry. For nodes that run until killed.
    pub fn start_live_exporter(
        &self,
        output_csv: PathBuf,
        running: Arc<AtomicBool>,
    ) -> thread::JoinHandle<()> {
        self.spawn_exporter(output_csv, Some(running))
    }

    fn spawn_exporter(
        &self,
        output_csv: PathBuf,
        running: Option<Arc<AtomicBool>>,
    ) -> thread::JoinHandle<()> {
        let queue = self.queue.clone();

        thread::spawn(move || {
            let mut writer = match csv::Writer::from_path(&output_csv) {
                Ok(w) => w,
                Err(e) => {
                    error!("Failed to create event CSV {:?}: {}", output_csv, e);
                    return;
                }
            };

            loop {
                match queue.pop() {
                    Some(event) => {
                        if let Err(e) = writer.serialize(event.to_row()) {
                            error!("Failed to write event row: {}", e);
                        }
                    }
                    None => {
                        if let Err(e) = writer.flush() {
                            error!("Failed to flush event CSV: {}", e);
                        }
                        thread::sleep(Duration::from_millis(EXPORT_POLL_MS));
                        let live = running.as_ref().is_some_and(|r| r.load(Ordering::Acquire));
                        if !live && queue.is_empty() {
                            break;
                        }
                    }
                }
            }

            if let Err(e) = writer.flush() {
                error!("Failed to flush event CSV: {}", e);
            }
            info!("Events exported to {:?}", output_csv);
        })
    }
}

impl Clone for EventRecorder {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            run_start: self.run_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_capped_keeps_latest() {
        let mut buf = VecDeque::new();
        for i in 0..(MAX_POINTS + 5) {
            push_capped(&mut buf, i);
        }
        assert_eq!(buf.len(), MAX_POINTS);
        assert_eq!(buf.front(), Some(&5));
        assert_eq!(buf.back(), Some(&(MAX_POINTS + 4)));
    }

    #[test]
    fn stats_accumulate() {
        let stats = LinkStats::new();
        stats.record_sent();
        stats.record_sent();
        stats.record_malformed();
        stats.record_applied(2);
        let s = stats.snapshot();
        assert_eq!(s.packets_sent, 2);
        assert_eq!(s.malformed, 1);
        assert_eq!(s.commands_applied, 1);
        assert_eq!(s.tracks_requested, 2);
    }

    #[test]
    fn recorder_clones_share_queue() {
        let recorder = EventRecorder::new();
        let clone = recorder.clone();
        clone.record(Event::Malformed { ts_ns: 1, len: 3 });
        assert_eq!(recorder.pending(), 1);
    }

    #[test]
    fn live_exporter_drains_until_stopped() {
        let recorder = EventRecorder::new();
        let running = Arc::new(AtomicBool::new(true));
        let path = std::env::temp_dir().join(format!("rc_link_events_{}.csv", std::process::id()));

        let handle = recorder.start_live_exporter(path.clone(), running.clone());
        recorder.record(Event::Malformed { ts_ns: 1, len: 3 });
        thread::sleep(Duration::from_millis(5 * EXPORT_POLL_MS));
        recorder.record(Event::Malformed { ts_ns: 2, len: 4 });
        running.store(false, Ordering::Release);
        handle.join().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("len=4"));
        assert_eq!(recorder.pending(), 0);
    }

    #[test]
    fn malformed_row_format() {
        let row = Event::Malformed { ts_ns: 7, len: 31 }.to_row();
        assert_eq!(row.node, "driver");
        assert_eq!(row.detail, "len=31");
    }
}
