//! Non-blocking datagram ingress.
//!
//! The scheduler drains every pending datagram at the start of each
//! tick, so sources must never block: [`DatagramSource::poll`] returns
//! immediately with a packet or with `None`.

use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

use anyhow::{Context, Result};
use tracing::info;

/// Largest datagram the device accepts. Anything bigger is truncated
/// by the read and will fail decode harmlessly.
pub const MAX_DATAGRAM: usize = 2048;

/// A non-blocking supplier of raw datagrams.
pub trait DatagramSource {
    /// Poll for one pending datagram.
    ///
    /// Returns `Ok(Some(len))` with the payload in `buf[..len]`,
    /// `Ok(None)` when nothing is pending, or an I/O error. Must not
    /// block.
    fn poll(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>>;
}

/// UDP socket source bound to one port on all interfaces, so both
/// broadcast and unicast senders reach it.
#[derive(Debug)]
pub struct UdpDatagramSource {
    socket: UdpSocket,
    port: u16,
}

impl UdpDatagramSource {
    /// Bind a non-blocking socket on `port`.
    pub fn bind(port: u16) -> Result<Self> {
        let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
        let socket = UdpSocket::bind(addr)
            .with_context(|| format!("failed to bind telemetry UDP port {port}"))?;
        socket
            .set_nonblocking(true)
            .context("failed to set telemetry socket non-blocking")?;
        info!(port, "telemetry UDP source bound");
        Ok(Self { socket, port })
    }

    /// The bound port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl DatagramSource for UdpDatagramSource {
    fn poll(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.socket.recv_from(buf) {
            Ok((len, _peer)) => Ok(Some(len)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}
