//! Error types for the protocol layer.
//!
//! Each crate in Huddle defines its own error enum. When you see a
//! `ProtocolError`, the problem is in the shape of the bytes, not in
//! networking or room bookkeeping.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, a missing `success`/`message`
    /// field, or a truncated response.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but its content is not what the caller
    /// expected: e.g., a room id where a room list was expected.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
