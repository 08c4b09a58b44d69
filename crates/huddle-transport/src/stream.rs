//! Reliable request/response over TCP.
//!
//! The control plane never multiplexes: a connection carries exactly one
//! request and one response. The client side is [`exchange`]; the broker
//! side is [`read_request`] followed by [`write_response`].

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::TransportError;

/// Opens a fresh connection to `addr`, writes `request`, performs one
/// read of at most `max_response` bytes, and closes the connection.
///
/// There is no timeout: a peer that never answers blocks the caller.
///
/// # Errors
/// - [`TransportError::ConnectFailed`] if the connection can't be opened
/// - [`TransportError::SendFailed`] / [`TransportError::ReceiveFailed`]
///   on I/O failure
/// - [`TransportError::ConnectionClosed`] if the peer closes without
///   answering
pub async fn exchange(
    addr: SocketAddr,
    request: &[u8],
    max_response: usize,
) -> Result<Vec<u8>, TransportError> {
    let mut conn = TcpStream::connect(addr)
        .await
        .map_err(TransportError::ConnectFailed)?;
    conn.write_all(request)
        .await
        .map_err(TransportError::SendFailed)?;

    let response = read_request(&mut conn, max_response).await?;

    // Best effort: the response is already in hand.
    let _ = conn.shutdown().await;
    tracing::trace!(%addr, bytes = response.len(), "control exchange complete");
    Ok(response)
}

/// Performs a single bounded read on `conn`.
///
/// Used by both sides: the broker reads the request with it, the client
/// reads the response with it.
///
/// # Errors
/// [`TransportError::ConnectionClosed`] on EOF before any byte arrived,
/// [`TransportError::ReceiveFailed`] on I/O failure.
pub async fn read_request<R>(conn: &mut R, max_len: usize) -> Result<Vec<u8>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; max_len.max(1)];
    let n = conn
        .read(&mut buf)
        .await
        .map_err(TransportError::ReceiveFailed)?;
    if n == 0 {
        return Err(TransportError::ConnectionClosed(
            "peer closed before sending data".into(),
        ));
    }
    buf.truncate(n);
    Ok(buf)
}

/// Writes one encoded response onto `conn` and flushes it.
///
/// Does not close the connection; that is the caller's decision.
pub async fn write_response<W>(conn: &mut W, response: &[u8]) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    conn.write_all(response)
        .await
        .map_err(TransportError::SendFailed)?;
    conn.flush().await.map_err(TransportError::SendFailed)
}
