//! Unified error type for Huddle.

use huddle_client::ClientError;
use huddle_protocol::ProtocolError;
use huddle_registry::RegistryError;
use huddle_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum HuddleError {
    /// Connection, bind, send, or receive failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encode or decode failure, or a payload of the wrong shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registry operation failed on the broker side.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A client call failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}
