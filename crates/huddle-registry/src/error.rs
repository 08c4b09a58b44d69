//! Error types for the registry layer.

use huddle_protocol::{PlayerId, ProtocolError, RoomId};
use huddle_transport::TransportError;

/// Errors that can occur during registry operations.
///
/// The `Display` text of the first four variants is what a client sees
/// in a failed control response.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The identifier was never registered (or was unregistered).
    #[error("client {0} is not registered")]
    ClientNotRegistered(PlayerId),

    /// The room does not exist.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The room is at capacity.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player is not a member of this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The registry actor has stopped.
    #[error("registry is unavailable")]
    Unavailable,

    /// A control response could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A control response could not be written.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
