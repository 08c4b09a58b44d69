//! Core protocol types for Huddle's wire format.
//!
//! Every type here is serialized to JSON and sent over either the
//! control plane (TCP, one request and one response per connection) or
//! the data plane (UDP, fire-and-forget).

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Unexpected};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque, unique identifier of a registered player.
///
/// Generated by the registry on first registration and immutable for the
/// player's lifetime. `#[serde(transparent)]` keeps it a plain JSON
/// string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps an existing token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Opaque, unique identifier of a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps an existing token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

// ---------------------------------------------------------------------------
// Control plane
// ---------------------------------------------------------------------------

/// A control-plane request. One per reliable connection.
///
/// `#[serde(tag = "action")]` produces internally tagged JSON, e.g.
/// `{"action": "join", "payload": "<room id>", "identifier": "<player id>"}`.
/// Field names follow the deployed wire format: `join` and `create`
/// carry their argument in `payload`, `leave` uses `room_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ControlRequest {
    /// Register (or re-register) the caller. `payload` is the port the
    /// caller receives data-plane deliveries on.
    Register { payload: u16 },

    /// Create a room. `payload` is the optional display name.
    Create {
        #[serde(default)]
        payload: Option<String>,
        #[serde(default)]
        identifier: Option<PlayerId>,
    },

    /// Join a specific room.
    Join { payload: RoomId, identifier: PlayerId },

    /// Join the first room with a free slot, creating one if needed.
    Autojoin { identifier: PlayerId },

    /// Leave a room.
    Leave { room_id: RoomId, identifier: PlayerId },

    /// List every room.
    GetRooms {
        #[serde(default)]
        identifier: Option<PlayerId>,
    },
}

impl ControlRequest {
    /// The wire name of this request's action, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Create { .. } => "create",
            Self::Join { .. } => "join",
            Self::Autojoin { .. } => "autojoin",
            Self::Leave { .. } => "leave",
            Self::GetRooms { .. } => "get_rooms",
        }
    }
}

/// The single response to a [`ControlRequest`].
///
/// `message` carries the result on success and a human-readable error
/// description on failure. The error's kind does not survive the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlResponse {
    #[serde(deserialize_with = "deserialize_flag")]
    pub success: bool,
    pub message: Value,
}

impl ControlResponse {
    /// A successful response carrying `message`.
    pub fn ok(message: impl Into<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failed response carrying an error description.
    pub fn err(text: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Value::String(text.into()),
        }
    }

    /// Splits the envelope into the payload or the error text.
    pub fn into_result(self) -> Result<Value, String> {
        if self.success {
            return Ok(self.message);
        }
        Err(match self.message {
            Value::String(text) => text,
            other => other.to_string(),
        })
    }
}

/// Accepts a JSON boolean or the string literals `"True"`/`"False"`
/// that older brokers emit.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(flag) => Ok(flag),
        Flag::Text(text) if text.eq_ignore_ascii_case("true") => Ok(true),
        Flag::Text(text) if text.eq_ignore_ascii_case("false") => Ok(false),
        Flag::Text(text) => Err(de::Error::invalid_value(
            Unexpected::Str(&text),
            &"a boolean or \"True\"/\"False\"",
        )),
    }
}

/// One entry of a `get_rooms` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub nb_players: usize,
    pub capacity: usize,
}

// ---------------------------------------------------------------------------
// Data plane
// ---------------------------------------------------------------------------

/// Recipients of a `sendto`: a single identifier or a list of them.
///
/// `#[serde(untagged)]` lets both `"abc"` and `["abc", "def"]` decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(PlayerId),
    Many(Vec<PlayerId>),
}

impl Recipients {
    /// Returns `true` if `player_id` is one of the recipients.
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        match self {
            Self::One(only) => only == player_id,
            Self::Many(list) => list.contains(player_id),
        }
    }
}

impl From<PlayerId> for Recipients {
    fn from(player_id: PlayerId) -> Self {
        Self::One(player_id)
    }
}

impl From<Vec<PlayerId>> for Recipients {
    fn from(list: Vec<PlayerId>) -> Self {
        Self::Many(list)
    }
}

/// Payload of a room-wide `send`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendPayload {
    pub message: Value,
}

/// Payload of a targeted `sendto`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendtoPayload {
    pub recipients: Recipients,
    pub message: Value,
}

/// A data-plane datagram sent by a client to the broker's data endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DataRequest {
    /// Deliver to every other member of the room.
    Send {
        payload: SendPayload,
        room_id: RoomId,
        identifier: PlayerId,
    },

    /// Deliver only to the listed members of the room.
    Sendto {
        payload: SendtoPayload,
        room_id: RoomId,
        identifier: PlayerId,
    },
}

impl DataRequest {
    /// The room the datagram is addressed to.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::Send { room_id, .. } | Self::Sendto { room_id, .. } => room_id,
        }
    }

    /// The sending player.
    pub fn identifier(&self) -> &PlayerId {
        match self {
            Self::Send { identifier, .. } | Self::Sendto { identifier, .. } => identifier,
        }
    }
}

/// A fan-out datagram as received by a room member.
///
/// On the wire this is a single-entry object mapping the sender's
/// identifier to the message: `{"<sender id>": <message>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub sender: PlayerId,
    pub message: Value,
}

impl Serialize for Delivery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.sender, &self.message)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Delivery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<PlayerId, Value>::deserialize(deserializer)?;
        let len = entries.len();
        let mut iter = entries.into_iter();
        match (iter.next(), iter.next()) {
            (Some((sender, message)), None) => Ok(Self { sender, message }),
            _ => Err(de::Error::invalid_length(len, &"exactly one sender entry")),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
