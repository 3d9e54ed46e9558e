//! transmitter.rs
//! Encodes telemetry packets and hands them to the link.
//! - fire-and-forget: no ack, no retry, no sequence numbers
//! - a failed send is counted and logged, the next cycle is independent

use std::sync::Arc;

use log::{debug, warn};

use crate::component_a::packet::TelemetryPacket;
use crate::link::DatagramSink;
use crate::utils::metrics::LinkStats;

pub struct Transmitter<S: DatagramSink> {
    sink: S,
    stats: Arc<LinkStats>,
}

impl<S: DatagramSink> Transmitter<S> {
    pub fn new(sink: S, stats: Arc<LinkStats>) -> Self {
        Self { sink, stats }
    }

    /// Send one packet. Returns whether the link accepted it.
    pub fn transmit(&self, packet: &TelemetryPacket) -> bool {
        debug!(
            "[Transmitter] X: {} | Y: {} | SW: {} | BTN: {:?}",
            packet.x, packet.y, packet.sw, packet.buttons
        );

        match self.sink.send(&packet.serialize()) {
            Ok(()) => {
                self.stats.record_sent();
                true
            }
            Err(err) => {
                self.stats.record_send_failure();
                warn!("[Transmitter] error sending data: {}", err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_a::packet::PACKET_SIZE;
    use crate::link::{DatagramSource, channel};

    #[test]
    fn sends_fixed_size_image() {
        let (sink, source) = channel::link(2);
        let stats = Arc::new(LinkStats::new());
        let tx = Transmitter::new(sink, stats.clone());

        let p = TelemetryPacket::new(2433, 1000, 1, [0, 0, 1, 0, 0]);
        assert!(tx.transmit(&p));

        let mut buf = [0u8; 64];
        let n = source.recv(&mut buf).unwrap().unwrap();
        assert_eq!(n, PACKET_SIZE);
        assert_eq!(TelemetryPacket::validate(&buf[..n]).unwrap(), p);
        assert_eq!(stats.snapshot().packets_sent, 1);
    }

    #[test]
    fn failed_send_is_counted() {
        let (sink, source) = channel::link(1);
        drop(source);
        let stats = Arc::new(LinkStats::new());
        let tx = Transmitter::new(sink, stats.clone());

        assert!(!tx.transmit(&TelemetryPacket::default()));
        let s = stats.snapshot();
        assert_eq!((s.packets_sent, s.send_failures), (0, 1));
    }
}
