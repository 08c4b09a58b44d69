//! Error types for the client SDK.

use huddle_protocol::ProtocolError;
use huddle_transport::TransportError;

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The control connection or the listener socket failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A request couldn't be encoded or a response couldn't be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The broker answered with `success = false`. Only the text survives.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The call needs a current room and the client has none.
    #[error("client is not in a room")]
    NoRoom,
}
