//! UDP link for running the two nodes as separate processes.
//! Socket setup goes through socket2 so address reuse can be set before bind.

use std::{
    io,
    net::{SocketAddr, UdpSocket},
};

use log::info;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use super::{DatagramSink, DatagramSource, RECV_POLL};

fn bind_socket(local: SocketAddr) -> io::Result<UdpSocket> {
    let domain = if local.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&SockAddr::from(local))?;
    let socket: UdpSocket = socket.into();
    socket.set_read_timeout(Some(RECV_POLL))?;
    Ok(socket)
}

/// Remote side: fire-and-forget datagrams to one known peer.
pub struct UdpSink {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpSink {
    pub fn new(local: SocketAddr, peer: SocketAddr) -> io::Result<Self> {
        let socket = bind_socket(local)?;
        info!("UDP sink {} -> {}", socket.local_addr()?, peer);
        Ok(Self { socket, peer })
    }
}

impl DatagramSink for UdpSink {
    fn send(&self, datagram: &[u8]) -> io::Result<()> {
        self.socket.send_to(datagram, self.peer).map(|_| ())
    }
}

/// Driver side: accepts datagrams from anyone.
pub struct UdpSource {
    socket: UdpSocket,
}

impl UdpSource {
    pub fn bind(local: SocketAddr) -> io::Result<Self> {
        let socket = bind_socket(local)?;
        info!("UDP source listening on {}", socket.local_addr()?);
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl DatagramSource for UdpSource {
    fn recv(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.socket.recv_from(buf) {
            Ok((n, _)) => Ok(Some(n)),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
