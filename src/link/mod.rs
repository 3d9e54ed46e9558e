//! Datagram transport between the remote and the driver.
//!
//! Unacknowledged, unordered, possibly lossy. The core only needs "send these
//! bytes" and "a datagram arrived"; pairing, retries and channel selection
//! are the transport's own business.

use std::{io, time::Duration};

pub mod channel;
pub mod udp;

/// Largest datagram the short-range radio carries. Bigger ones are truncated on receive.
pub const MAX_DATAGRAM_SIZE: usize = 250;

/// How long a receive call waits before returning `None` so loops can check their stop flag.
pub const RECV_POLL: Duration = Duration::from_millis(100);

pub trait DatagramSink: Send + Sync {
    fn send(&self, datagram: &[u8]) -> io::Result<()>;
}

pub trait DatagramSource: Send {
    /// Wait up to `RECV_POLL` for one datagram. `Ok(None)` on timeout.
    fn recv(&self, buf: &mut [u8]) -> io::Result<Option<usize>>;
}
