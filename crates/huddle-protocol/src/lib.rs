//! Wire protocol for Huddle.
//!
//! This crate defines what travels between a client and the broker:
//!
//! - **Types** ([`ControlRequest`], [`ControlResponse`], [`DataRequest`],
//!   [`Delivery`], etc.): the JSON objects on both planes.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): the byte format.
//! - **Errors** ([`ProtocolError`]): encode and decode failures.
//!
//! # Two planes
//!
//! ```text
//! control plane (reliable):   ControlRequest  → broker → ControlResponse
//! data plane (unreliable):    DataRequest     → broker → Delivery (one per recipient)
//! ```
//!
//! No I/O happens here. Sockets live in `huddle-transport`.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ControlRequest, ControlResponse, DataRequest, Delivery, PlayerId, Recipients, RoomId,
    RoomSummary, SendPayload, SendtoPayload,
};
