//! Codec trait and the JSON implementation.
//!
//! Envelopes become bytes here and bytes become envelopes. Both planes
//! speak JSON today, but the registry and the client only depend on the
//! [`Codec`] trait, so a binary format can be slotted in without
//! touching them.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns envelopes into wire bytes and back.
///
/// `Send + Sync + 'static` because codecs live inside long-running
/// tokio tasks (the registry actor, the inbound listener).
pub trait Codec: Send + Sync + 'static {
    /// Encodes `value` for the wire.
    ///
    /// # Errors
    /// `ProtocolError::Encode` if `value` has no wire representation.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Decodes one complete message from `data`.
    ///
    /// # Errors
    /// `ProtocolError::Decode` when `data` is not a whole message of
    /// type `T` (a single bounded read can cut a response short).
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// The JSON wire format both planes use.
///
/// # Example
///
/// ```rust
/// use huddle_protocol::{Codec, ControlResponse, JsonCodec};
///
/// let bytes = JsonCodec.encode(&ControlResponse::ok("abc")).unwrap();
/// let decoded: ControlResponse = JsonCodec.decode(&bytes).unwrap();
/// assert!(decoded.success);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControlResponse;

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<ControlResponse, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_truncated_response_returns_decode_error() {
        let result: Result<ControlResponse, _> = JsonCodec.decode(br#"{"success": true, "mess"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_produces_utf8_json() {
        let bytes = JsonCodec.encode(&ControlResponse::err("nope")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"nope\""));
    }
}
