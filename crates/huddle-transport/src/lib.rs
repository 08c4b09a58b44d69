//! Transport layer for Huddle.
//!
//! Two channels, two modules:
//!
//! - [`stream`]: the reliable control plane. One TCP connection per
//!   request: connect, write, a single bounded read, close.
//! - [`datagram`]: the unreliable data plane. Every outbound datagram
//!   goes out on a fresh transient UDP socket; inbound datagrams are
//!   read through a [`DatagramReceiver`].
//!
//! Nothing here knows about JSON or rooms. Callers hand in bytes and
//! get bytes back.

pub mod datagram;
mod error;
pub mod stream;

pub use datagram::{DatagramReceiver, send_datagram};
pub use error::TransportError;

use std::net::SocketAddr;

/// Resolves `host:port` to the first address the resolver returns.
///
/// # Errors
/// [`TransportError::AddrNotFound`] if resolution fails or yields nothing.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    let target = format!("{host}:{port}");
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| TransportError::AddrNotFound(format!("{target} ({e})")))?;
    addrs.next().ok_or(TransportError::AddrNotFound(target))
}
