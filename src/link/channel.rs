//! In-process link over a bounded crossbeam channel.
//! Sends never block: a full channel drops the datagram, like a busy radio.

use std::io;

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};

use super::{DatagramSink, DatagramSource, RECV_POLL};

pub fn link(capacity: usize) -> (ChannelSink, ChannelSource) {
    let (tx, rx) = bounded(capacity);
    (ChannelSink { tx }, ChannelSource { rx })
}

#[derive(Clone)]
pub struct ChannelSink {
    tx: Sender<Vec<u8>>,
}

impl DatagramSink for ChannelSink {
    fn send(&self, datagram: &[u8]) -> io::Result<()> {
        match self.tx.try_send(datagram.to_vec()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(io::Error::new(io::ErrorKind::WouldBlock, "link queue full")),
            Err(TrySendError::Disconnected(_)) => {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "receiver gone"))
            }
        }
    }
}

pub struct ChannelSource {
    rx: Receiver<Vec<u8>>,
}

impl DatagramSource for ChannelSource {
    fn recv(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.rx.recv_timeout(RECV_POLL) {
            Ok(datagram) => {
                let n = datagram.len().min(buf.len());
                buf[..n].copy_from_slice(&datagram[..n]);
                Ok(Some(n))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "sender gone"))
            }
        }
    }
}
