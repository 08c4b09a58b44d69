//! Unreliable datagrams over UDP.
//!
//! Outbound: [`send_datagram`] binds a transient socket per call, so no
//! per-peer state is kept anywhere. Inbound: [`DatagramReceiver`] owns a
//! bound socket and a fixed-size receive buffer.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::TransportError;

/// Sends `data` to `to` as a single unacknowledged datagram.
///
/// A new socket is bound for every call (unspecified address of the same
/// family as `to`, ephemeral port) and dropped right after the send.
pub async fn send_datagram(to: SocketAddr, data: &[u8]) -> Result<(), TransportError> {
    let socket = UdpSocket::bind(unspecified_for(&to))
        .await
        .map_err(TransportError::BindFailed)?;
    socket
        .send_to(data, to)
        .await
        .map_err(TransportError::SendFailed)?;
    Ok(())
}

/// Picks the wildcard bind address matching the family of `peer`.
fn unspecified_for(peer: &SocketAddr) -> SocketAddr {
    match peer {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    }
}

/// A bound UDP socket that yields one datagram per [`recv`](Self::recv).
pub struct DatagramReceiver {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl DatagramReceiver {
    /// Binds to `addr`. Datagrams longer than `max_len` are truncated.
    pub async fn bind(addr: &str, max_len: usize) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::debug!(addr, "datagram receiver bound");
        Ok(Self {
            socket,
            buf: vec![0u8; max_len.max(1)],
        })
    }

    /// Returns the local address the socket is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Waits for the next datagram and returns its payload and origin.
    ///
    /// Cancel-safe: dropping the future loses no datagram.
    pub async fn recv(&mut self) -> Result<(Vec<u8>, SocketAddr), TransportError> {
        let (n, from) = self
            .socket
            .recv_from(&mut self.buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        Ok((self.buf[..n].to_vec(), from))
    }
}
