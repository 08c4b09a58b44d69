//! Registry actor: a single Tokio task that owns the [`RoomRegistry`].
//!
//! Every dispatcher connection talks to the registry through a
//! [`RegistryHandle`]. Commands are processed one at a time, so
//! membership lists and endpoint fields never race. Fan-out I/O is done
//! by the caller after the actor has resolved the recipients, so a slow
//! send never holds up registrations.

use std::net::SocketAddr;

use huddle_protocol::{PlayerId, Recipients, RoomId, RoomSummary};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::registry::deliver;
use crate::{Player, RegistryConfig, RegistryError, RoomRegistry};

type Reply<T> = oneshot::Sender<T>;

/// Commands sent to the registry actor through its channel.
enum RegistryCommand {
    Register {
        control_addr: SocketAddr,
        data_port: u16,
        reply: Reply<Player>,
    },
    Unregister {
        player_id: PlayerId,
        reply: Reply<Result<Player, RegistryError>>,
    },
    Join {
        player_id: PlayerId,
        room_id: Option<RoomId>,
        reply: Reply<Result<RoomId, RegistryError>>,
    },
    Leave {
        player_id: PlayerId,
        room_id: RoomId,
        reply: Reply<Result<(), RegistryError>>,
    },
    Create {
        name: Option<String>,
        reply: Reply<RoomId>,
    },
    RemoveEmpty {
        reply: Reply<Vec<RoomId>>,
    },
    ListRooms {
        reply: Reply<Vec<RoomSummary>>,
    },
    Recipients {
        sender: PlayerId,
        room_id: RoomId,
        filter: Option<Recipients>,
        reply: Reply<Result<Vec<Player>, RegistryError>>,
    },
    Shutdown,
}

/// Handle to a running registry actor.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper. Exposes the
/// same operations as [`RoomRegistry`], made safe for concurrent callers.
#[derive(Clone)]
pub struct RegistryHandle {
    sender: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Spawns a registry actor with an empty registry.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(config: RegistryConfig) -> Self {
        Self::spawn_with(RoomRegistry::new(config))
    }

    /// Spawns a registry actor that owns `registry`.
    pub fn spawn_with(registry: RoomRegistry) -> Self {
        let (tx, rx) = mpsc::channel(registry.config().command_buffer);
        let actor = RegistryActor {
            registry,
            receiver: rx,
        };
        tokio::spawn(actor.run());
        Self { sender: tx }
    }

    /// Sends a command and waits for its reply.
    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> RegistryCommand,
    ) -> Result<T, RegistryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| RegistryError::Unavailable)?;
        reply_rx.await.map_err(|_| RegistryError::Unavailable)
    }

    /// Registers the caller at `control_addr` (see [`RoomRegistry::register`]).
    pub async fn register(
        &self,
        control_addr: SocketAddr,
        data_port: u16,
    ) -> Result<Player, RegistryError> {
        self.request(|reply| RegistryCommand::Register {
            control_addr,
            data_port,
            reply,
        })
        .await
    }

    /// Removes a player from the directory and from every room.
    pub async fn unregister(&self, player_id: PlayerId) -> Result<Player, RegistryError> {
        self.request(|reply| RegistryCommand::Unregister { player_id, reply })
            .await?
    }

    /// Joins `room_id`, or autojoins when it is `None`.
    ///
    /// Returns the id of the room actually joined.
    pub async fn join(
        &self,
        player_id: PlayerId,
        room_id: Option<RoomId>,
    ) -> Result<RoomId, RegistryError> {
        self.request(|reply| RegistryCommand::Join {
            player_id,
            room_id,
            reply,
        })
        .await?
    }

    /// Removes a player from a room. The room stays until swept.
    pub async fn leave(&self, player_id: PlayerId, room_id: RoomId) -> Result<(), RegistryError> {
        self.request(|reply| RegistryCommand::Leave {
            player_id,
            room_id,
            reply,
        })
        .await?
    }

    /// Creates an empty room, optionally named.
    pub async fn create(&self, name: Option<String>) -> Result<RoomId, RegistryError> {
        self.request(|reply| RegistryCommand::Create { name, reply })
            .await
    }

    /// Deletes every empty room and returns their ids.
    pub async fn remove_empty(&self) -> Result<Vec<RoomId>, RegistryError> {
        self.request(|reply| RegistryCommand::RemoveEmpty { reply })
            .await
    }

    /// Summaries of every room, in creation order.
    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, RegistryError> {
        self.request(|reply| RegistryCommand::ListRooms { reply })
            .await
    }

    /// Fans `message` out to every other member of the room.
    pub async fn send(
        &self,
        sender: PlayerId,
        room_id: RoomId,
        message: &Value,
    ) -> Result<usize, RegistryError> {
        let targets = self.recipients(sender.clone(), room_id, None).await?;
        Ok(deliver(&sender, &targets, message).await)
    }

    /// Sends `message` to the listed members of the room only.
    pub async fn sendto(
        &self,
        sender: PlayerId,
        room_id: RoomId,
        recipients: Recipients,
        message: &Value,
    ) -> Result<usize, RegistryError> {
        let targets = self
            .recipients(sender.clone(), room_id, Some(recipients))
            .await?;
        Ok(deliver(&sender, &targets, message).await)
    }

    /// Asks the actor who should receive a message. No I/O happens here.
    async fn recipients(
        &self,
        sender: PlayerId,
        room_id: RoomId,
        filter: Option<Recipients>,
    ) -> Result<Vec<Player>, RegistryError> {
        self.request(|reply| RegistryCommand::Recipients {
            sender,
            room_id,
            filter,
            reply,
        })
        .await?
    }

    /// Tells the actor to stop. Later calls fail with `Unavailable`.
    pub async fn shutdown(&self) -> Result<(), RegistryError> {
        self.sender
            .send(RegistryCommand::Shutdown)
            .await
            .map_err(|_| RegistryError::Unavailable)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RegistryActor {
    registry: RoomRegistry,
    receiver: mpsc::Receiver<RegistryCommand>,
}

impl RegistryActor {
    /// Processes commands until shutdown or until every handle is gone.
    async fn run(mut self) {
        tracing::info!("registry actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RegistryCommand::Register {
                    control_addr,
                    data_port,
                    reply,
                } => {
                    let player = self.registry.register(control_addr, data_port).clone();
                    let _ = reply.send(player);
                }
                RegistryCommand::Unregister { player_id, reply } => {
                    let _ = reply.send(self.registry.unregister(&player_id));
                }
                RegistryCommand::Join {
                    player_id,
                    room_id,
                    reply,
                } => {
                    let _ = reply.send(self.registry.join(&player_id, room_id.as_ref()));
                }
                RegistryCommand::Leave {
                    player_id,
                    room_id,
                    reply,
                } => {
                    let _ = reply.send(self.registry.leave(&player_id, &room_id));
                }
                RegistryCommand::Create { name, reply } => {
                    let _ = reply.send(self.registry.create(name));
                }
                RegistryCommand::RemoveEmpty { reply } => {
                    let _ = reply.send(self.registry.remove_empty());
                }
                RegistryCommand::ListRooms { reply } => {
                    let _ = reply.send(self.registry.list_rooms());
                }
                RegistryCommand::Recipients {
                    sender,
                    room_id,
                    filter,
                    reply,
                } => {
                    let targets = self.registry.recipients(&sender, &room_id, filter.as_ref());
                    let _ = reply.send(targets);
                }
                RegistryCommand::Shutdown => {
                    tracing::info!("registry shutting down");
                    break;
                }
            }
        }

        tracing::info!("registry actor stopped");
    }
}
