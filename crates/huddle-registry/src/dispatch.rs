//! The call contract between a dispatcher and the registry.
//!
//! A dispatcher owns the listening sockets. For each control connection
//! it reads one request, calls [`handle_control_bytes`], and writes the
//! result back with [`write_control_response`]. For each data-plane
//! datagram it calls [`handle_datagram`]. Registry errors never escape:
//! they become `success = false` responses carrying the error text.

use std::net::SocketAddr;

use huddle_protocol::{Codec, ControlRequest, ControlResponse, DataRequest, JsonCodec};
use serde_json::Value;
use tokio::io::AsyncWrite;

use crate::{RegistryError, RegistryHandle};

/// Runs one control request against the registry.
///
/// `peer` is the control endpoint the request arrived from; it is what
/// `register` keys players on.
pub async fn handle_control(
    registry: &RegistryHandle,
    peer: SocketAddr,
    request: ControlRequest,
) -> ControlResponse {
    let action = request.action();
    let result = run_control(registry, peer, request).await;
    match result {
        Ok(message) => ControlResponse::ok(message),
        Err(e) => {
            tracing::debug!(%peer, action, error = %e, "control request failed");
            ControlResponse::err(e.to_string())
        }
    }
}

/// Decodes `data` as a [`ControlRequest`] and runs it.
///
/// Undecodable requests produce a failed response instead of an error.
pub async fn handle_control_bytes(
    registry: &RegistryHandle,
    peer: SocketAddr,
    data: &[u8],
) -> ControlResponse {
    match JsonCodec.decode::<ControlRequest>(data) {
        Ok(request) => handle_control(registry, peer, request).await,
        Err(e) => {
            tracing::debug!(%peer, error = %e, "undecodable control request");
            ControlResponse::err(format!("invalid request: {e}"))
        }
    }
}

async fn run_control(
    registry: &RegistryHandle,
    peer: SocketAddr,
    request: ControlRequest,
) -> Result<Value, RegistryError> {
    let message = match request {
        ControlRequest::Register { payload } => {
            let player = registry.register(peer, payload).await?;
            Value::String(player.id().to_string())
        }
        ControlRequest::Create { payload, .. } => {
            let room_id = registry.create(payload).await?;
            Value::String(room_id.to_string())
        }
        ControlRequest::Join {
            payload,
            identifier,
        } => {
            let room_id = registry.join(identifier, Some(payload)).await?;
            Value::String(room_id.to_string())
        }
        ControlRequest::Autojoin { identifier } => {
            let room_id = registry.join(identifier, None).await?;
            Value::String(room_id.to_string())
        }
        ControlRequest::Leave {
            room_id,
            identifier,
        } => {
            registry.leave(identifier, room_id).await?;
            Value::Null
        }
        ControlRequest::GetRooms { .. } => {
            let rooms = registry.list_rooms().await?;
            serde_json::to_value(rooms)
                .map_err(|e| RegistryError::Protocol(huddle_protocol::ProtocolError::Encode(e)))?
        }
    };
    Ok(message)
}

/// Decodes a data-plane datagram and fans it out.
///
/// Best effort: anything that goes wrong is logged and the datagram is
/// dropped. Returns the number of deliveries attempted.
pub async fn handle_datagram(registry: &RegistryHandle, data: &[u8]) -> usize {
    let request: DataRequest = match JsonCodec.decode(data) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "dropping undecodable datagram");
            return 0;
        }
    };

    let sender = request.identifier().clone();
    let room_id = request.room_id().clone();
    let result = match request {
        DataRequest::Send {
            payload,
            room_id,
            identifier,
        } => registry.send(identifier, room_id, &payload.message).await,
        DataRequest::Sendto {
            payload,
            room_id,
            identifier,
        } => {
            registry
                .sendto(identifier, room_id, payload.recipients, &payload.message)
                .await
        }
    };

    match result {
        Ok(count) => count,
        Err(e) => {
            tracing::debug!(%sender, %room_id, error = %e, "dropping datagram");
            0
        }
    }
}

/// Encodes `response` and writes it onto `conn` without closing it.
pub async fn write_control_response<W>(
    conn: &mut W,
    response: &ControlResponse,
) -> Result<(), RegistryError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = JsonCodec.encode(response)?;
    huddle_transport::stream::write_response(conn, &bytes).await?;
    Ok(())
}
