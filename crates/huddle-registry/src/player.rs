//! A registered participant and its two endpoints.

use std::net::SocketAddr;

use huddle_protocol::{Codec, ControlResponse, Delivery, JsonCodec, PlayerId};
use serde_json::Value;
use tokio::io::AsyncWrite;

use crate::RegistryError;
use crate::dispatch::write_control_response;

/// A registered player.
///
/// `control_addr` is how a re-registration from the same origin is
/// recognized. `data_addr` is where fan-out datagrams are delivered; it
/// shares the control host and takes the port the player announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    control_addr: SocketAddr,
    data_addr: SocketAddr,
}

impl Player {
    pub(crate) fn new(id: PlayerId, control_addr: SocketAddr, data_port: u16) -> Self {
        Self {
            id,
            control_addr,
            data_addr: SocketAddr::new(control_addr.ip(), data_port),
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn control_addr(&self) -> SocketAddr {
        self.control_addr
    }

    pub fn data_addr(&self) -> SocketAddr {
        self.data_addr
    }

    /// Points the data endpoint at `data_port` on the control host.
    pub(crate) fn set_data_port(&mut self, data_port: u16) {
        self.data_addr = SocketAddr::new(self.control_addr.ip(), data_port);
    }

    /// Delivers `message` from `sender` to this player's data endpoint.
    ///
    /// One datagram on a transient socket. Failures are logged and
    /// dropped: the data plane makes no delivery promise.
    pub async fn send_data(&self, sender: &PlayerId, message: &Value) {
        let delivery = Delivery {
            sender: sender.clone(),
            message: message.clone(),
        };
        let bytes = match JsonCodec.encode(&delivery) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(player_id = %self.id, error = %e, "failed to encode delivery");
                return;
            }
        };
        if let Err(e) = huddle_transport::send_datagram(self.data_addr, &bytes).await {
            tracing::debug!(
                player_id = %self.id,
                addr = %self.data_addr,
                error = %e,
                "delivery dropped"
            );
        }
    }

    /// Writes one `{success, message}` response onto `conn`.
    ///
    /// The connection stays open; closing it is the caller's business.
    pub async fn send_control_response<W>(
        &self,
        success: bool,
        payload: Value,
        conn: &mut W,
    ) -> Result<(), RegistryError>
    where
        W: AsyncWrite + Unpin,
    {
        let response = ControlResponse {
            success,
            message: payload,
        };
        write_control_response(conn, &response).await
    }
}
