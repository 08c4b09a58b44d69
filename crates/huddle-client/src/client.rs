//! The client SDK: control calls, data-plane sends, and the mailbox.

use std::collections::HashSet;
use std::net::SocketAddr;

use huddle_protocol::{
    Codec, ControlRequest, ControlResponse, DataRequest, Delivery, JsonCodec, PlayerId,
    ProtocolError, Recipients, RoomId, RoomSummary, SendPayload, SendtoPayload,
};
use huddle_transport::{resolve, send_datagram, stream};
use serde::Serialize;
use serde_json::Value;

use crate::{ClientConfig, ClientError, InboundListener, Mailbox};

/// A connected Huddle client.
///
/// Control calls (`register`, `create_room`, `join_room`, `autojoin`,
/// `leave_room`, `get_rooms`) each open one TCP connection, send one
/// request, read one response, and close. There is no timeout and no
/// retry. Data-plane sends (`send`, `sendto`) are fire-and-forget.
///
/// # Example
///
/// ```rust,ignore
/// let mut client = Client::connect(ClientConfig::new("127.0.0.1")).await?;
/// client.autojoin().await?;
/// client.send(&serde_json::json!({"name": "A", "message": "hi"})).await?;
/// for delivery in client.deliveries().await {
///     println!("{} says {}", delivery.sender, delivery.message);
/// }
/// client.stop().await;
/// ```
pub struct Client {
    config: ClientConfig,
    control_addr: SocketAddr,
    data_addr: SocketAddr,
    identifier: PlayerId,
    room_id: Option<RoomId>,
    mailbox: Mailbox,
    listener: InboundListener,
}

impl Client {
    /// Starts the inbound listener and registers with the broker.
    ///
    /// The registered data port is the one the listener actually bound,
    /// so `listen_addr` may use port 0.
    ///
    /// # Errors
    /// Resolution, bind, and control-call failures, plus
    /// [`ClientError::Rejected`] if the broker refuses the registration.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let control_addr = resolve(&config.server_host, config.control_port).await?;
        let data_addr = resolve(&config.server_host, config.data_port).await?;

        let mailbox = Mailbox::new();
        let listener = InboundListener::spawn(
            &config.listen_addr,
            config.max_response_bytes,
            mailbox.clone(),
        )
        .await?;

        let request = ControlRequest::Register {
            payload: listener.local_addr().port(),
        };
        let message = call(control_addr, config.max_response_bytes, &request).await?;
        let identifier = PlayerId::new(expect_string(message, request.action())?);
        tracing::info!(player_id = %identifier, %control_addr, "client registered");

        Ok(Self {
            config,
            control_addr,
            data_addr,
            identifier,
            room_id: None,
            mailbox,
            listener,
        })
    }

    /// Registers again with the current data port.
    ///
    /// The broker keys players on the control endpoint a request comes
    /// from, and every control call here uses a fresh connection with a
    /// new source port. In practice this yields a new identity. When the
    /// identifier changes, the current room is cleared: the new player is
    /// not a member of anything and has to join again.
    pub async fn register(&mut self) -> Result<&PlayerId, ClientError> {
        let request = ControlRequest::Register {
            payload: self.listener.local_addr().port(),
        };
        let message = self.call(&request).await?;
        let identifier = PlayerId::new(expect_string(message, request.action())?);
        if identifier != self.identifier {
            tracing::info!(
                old = %self.identifier,
                new = %identifier,
                "re-registered under a new identity, leaving room behind"
            );
            self.room_id = None;
            self.identifier = identifier;
        }
        Ok(&self.identifier)
    }

    /// Creates a room and returns its id. Does not join it.
    pub async fn create_room(&self, name: Option<&str>) -> Result<RoomId, ClientError> {
        let request = ControlRequest::Create {
            payload: name.map(str::to_string),
            identifier: Some(self.identifier.clone()),
        };
        let message = self.call(&request).await?;
        Ok(RoomId::new(expect_string(message, request.action())?))
    }

    /// Joins `room_id` and makes it the current room.
    pub async fn join_room(&mut self, room_id: &RoomId) -> Result<&RoomId, ClientError> {
        let request = ControlRequest::Join {
            payload: room_id.clone(),
            identifier: self.identifier.clone(),
        };
        let message = self.call(&request).await?;
        let joined = RoomId::new(expect_string(message, request.action())?);
        Ok(&*self.room_id.insert(joined))
    }

    /// Joins the first room with a free slot (the broker creates one if
    /// needed) and makes it the current room.
    pub async fn autojoin(&mut self) -> Result<&RoomId, ClientError> {
        let request = ControlRequest::Autojoin {
            identifier: self.identifier.clone(),
        };
        let message = self.call(&request).await?;
        let joined = RoomId::new(expect_string(message, request.action())?);
        Ok(&*self.room_id.insert(joined))
    }

    /// Leaves the current room. On success the client has no room.
    pub async fn leave_room(&mut self) -> Result<(), ClientError> {
        let room_id = self.room_id.clone().ok_or(ClientError::NoRoom)?;
        let request = ControlRequest::Leave {
            room_id,
            identifier: self.identifier.clone(),
        };
        self.call(&request).await?;
        self.room_id = None;
        Ok(())
    }

    /// Lists every room on the broker, in creation order.
    pub async fn get_rooms(&self) -> Result<Vec<RoomSummary>, ClientError> {
        let request = ControlRequest::GetRooms {
            identifier: Some(self.identifier.clone()),
        };
        let message = self.call(&request).await?;
        serde_json::from_value(message).map_err(|e| {
            ProtocolError::InvalidMessage(format!("get_rooms payload: {e}")).into()
        })
    }

    /// Sends `message` to every other member of the current room.
    ///
    /// Transmission failures are logged and otherwise ignored.
    ///
    /// # Errors
    /// [`ClientError::NoRoom`] without a current room, or
    /// [`ClientError::Protocol`] if `message` can't be serialized.
    pub async fn send<T: Serialize>(&self, message: &T) -> Result<(), ClientError> {
        let room_id = self.room_id.clone().ok_or(ClientError::NoRoom)?;
        let request = DataRequest::Send {
            payload: SendPayload {
                message: to_value(message)?,
            },
            room_id,
            identifier: self.identifier.clone(),
        };
        self.transmit(&request).await
    }

    /// Sends `message` to the listed members of the current room only.
    pub async fn sendto<T: Serialize>(
        &self,
        recipients: impl Into<Recipients>,
        message: &T,
    ) -> Result<(), ClientError> {
        let room_id = self.room_id.clone().ok_or(ClientError::NoRoom)?;
        let request = DataRequest::Sendto {
            payload: SendtoPayload {
                recipients: recipients.into(),
                message: to_value(message)?,
            },
            room_id,
            identifier: self.identifier.clone(),
        };
        self.transmit(&request).await
    }

    /// Drains the mailbox: distinct raw payloads since the last drain.
    pub async fn get_messages(&self) -> HashSet<Vec<u8>> {
        self.mailbox.drain().await
    }

    /// Drains the mailbox and decodes each payload as a [`Delivery`].
    ///
    /// Payloads that aren't deliveries are dropped with a warning.
    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.get_messages()
            .await
            .into_iter()
            .filter_map(|payload| match JsonCodec.decode::<Delivery>(&payload) {
                Ok(delivery) => Some(delivery),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed delivery");
                    None
                }
            })
            .collect()
    }

    pub fn identifier(&self) -> &PlayerId {
        &self.identifier
    }

    /// The room the client last joined, if it hasn't left it.
    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    /// The local address inbound datagrams arrive on.
    pub fn local_data_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Stops the inbound listener and waits for it to finish.
    pub async fn stop(self) {
        self.listener.stop().await;
        tracing::info!(player_id = %self.identifier, "client stopped");
    }

    async fn call(&self, request: &ControlRequest) -> Result<Value, ClientError> {
        call(self.control_addr, self.config.max_response_bytes, request).await
    }

    async fn transmit(&self, request: &DataRequest) -> Result<(), ClientError> {
        let bytes = JsonCodec.encode(request)?;
        if let Err(e) = send_datagram(self.data_addr, &bytes).await {
            tracing::debug!(error = %e, room_id = %request.room_id(), "datagram send failed");
        }
        Ok(())
    }
}

/// One control-plane round trip.
async fn call(
    addr: SocketAddr,
    max_response: usize,
    request: &ControlRequest,
) -> Result<Value, ClientError> {
    let bytes = JsonCodec.encode(request)?;
    let raw = stream::exchange(addr, &bytes, max_response).await?;
    let response: ControlResponse = JsonCodec.decode(&raw)?;
    tracing::debug!(action = request.action(), success = response.success, "control call");
    response.into_result().map_err(ClientError::Rejected)
}

fn expect_string(message: Value, action: &str) -> Result<String, ClientError> {
    match message {
        Value::String(text) => Ok(text),
        other => Err(ProtocolError::InvalidMessage(format!(
            "{action} expected a string, got {other}"
        ))
        .into()),
    }
}

fn to_value<T: Serialize>(message: &T) -> Result<Value, ClientError> {
    serde_json::to_value(message).map_err(|e| ProtocolError::Encode(e).into())
}
