//! The room registry: owns every room and every player.
//!
//! This is the matchmaking state machine. It is responsible for:
//! - Handing out player identifiers on registration
//! - Creating rooms, explicitly or when autojoin finds none open
//! - Keeping membership within each room's capacity
//! - Resolving who a data-plane message goes to
//!
//! Empty rooms are not removed when the last member leaves; a later
//! [`RoomRegistry::remove_empty`] call (see [`spawn_sweeper`](crate::spawn_sweeper))
//! deletes them.
//!
//! # Concurrency note
//!
//! `RoomRegistry` does no locking of its own. Share it through a
//! [`RegistryHandle`](crate::RegistryHandle), which serializes every call
//! through a single actor task.

use std::collections::HashMap;
use std::net::SocketAddr;

use huddle_protocol::{PlayerId, Recipients, RoomId, RoomSummary};
use indexmap::IndexMap;
use rand::Rng;
use serde_json::Value;

use crate::{Player, RegistryConfig, RegistryError, Room};

/// Authoritative in-memory mapping of rooms and players.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ join() ──→ leave() ──→ remove_empty()
///                  │                        │
///                  ▼                        ▼
///        [member, receives send()]   [room deleted once empty]
/// ```
pub struct RoomRegistry {
    /// Every room, in creation order.
    ///
    /// Autojoin picks the first room with a free slot, so the order is
    /// part of the contract; `IndexMap` keeps it through removals.
    rooms: IndexMap<RoomId, Room>,

    /// Player directory. Rooms hold ids only and look endpoints up here.
    players: HashMap<PlayerId, Player>,

    /// Index from control endpoint to player, kept in sync with `players`.
    by_control: HashMap<SocketAddr, PlayerId>,
    config: RegistryConfig,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            rooms: IndexMap::new(),
            players: HashMap::new(),
            by_control: HashMap::new(),
            config: config.validated(),
        }
    }

    /// The validated configuration this registry runs with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers the caller at `control_addr`.
    ///
    /// A second registration from the same control endpoint returns the
    /// existing player with its data endpoint moved to `data_port`.
    pub fn register(&mut self, control_addr: SocketAddr, data_port: u16) -> &Player {
        if let Some(existing) = self.by_control.get(&control_addr).cloned() {
            if let Some(player) = self.players.get_mut(&existing) {
                player.set_data_port(data_port);
                tracing::debug!(player_id = %existing, data_port, "player re-registered");
            }
        } else {
            let player_id = PlayerId::new(generate_token());
            let player = Player::new(player_id.clone(), control_addr, data_port);
            self.by_control.insert(control_addr, player_id.clone());
            self.players.insert(player_id.clone(), player);
            tracing::info!(%player_id, %control_addr, data_port, "player registered");
        }

        let player_id = &self.by_control[&control_addr];
        &self.players[player_id]
    }

    /// Removes a player from the directory and from every room.
    ///
    /// # Errors
    /// [`RegistryError::ClientNotRegistered`] if the player is unknown.
    pub fn unregister(&mut self, player_id: &PlayerId) -> Result<Player, RegistryError> {
        let player = self
            .players
            .remove(player_id)
            .ok_or_else(|| RegistryError::ClientNotRegistered(player_id.clone()))?;
        self.by_control.remove(&player.control_addr());
        for room in self.rooms.values_mut() {
            let _ = room.leave(player_id);
        }
        tracing::info!(%player_id, "player unregistered");
        Ok(player)
    }

    /// Places a player in a room.
    ///
    /// With `room_id`, joins that room. Without it, joins the first room
    /// (in creation order) with a free slot, creating a room when every
    /// existing one is full.
    ///
    /// # Errors
    /// - [`RegistryError::ClientNotRegistered`]: unknown player
    /// - [`RegistryError::RoomNotFound`]: `room_id` doesn't exist
    /// - [`RegistryError::RoomFull`]: `room_id` is at capacity
    pub fn join(
        &mut self,
        player_id: &PlayerId,
        room_id: Option<&RoomId>,
    ) -> Result<RoomId, RegistryError> {
        self.require_registered(player_id)?;

        let room_id = match room_id {
            Some(room_id) => room_id.clone(),
            None => {
                let open = self
                    .rooms
                    .values()
                    .find(|room| !room.is_full())
                    .map(|room| room.id().clone());
                match open {
                    Some(open) => open,
                    None => self.create(None),
                }
            }
        };

        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))?;
        room.join(player_id.clone())?;

        tracing::debug!(%player_id, %room_id, players = room.len(), "player joined");
        Ok(room_id)
    }

    /// Removes a player from a room.
    ///
    /// The room stays even when it becomes empty; see [`Self::remove_empty`].
    ///
    /// # Errors
    /// `ClientNotRegistered`, `RoomNotFound`, or `NotInRoom`.
    pub fn leave(&mut self, player_id: &PlayerId, room_id: &RoomId) -> Result<(), RegistryError> {
        self.require_registered(player_id)?;
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))?;
        room.leave(player_id)?;
        tracing::debug!(%player_id, %room_id, players = room.len(), "player left");
        Ok(())
    }

    /// Creates an empty room with the configured capacity.
    pub fn create(&mut self, name: Option<String>) -> RoomId {
        let room_id = RoomId::new(generate_token());
        let room = Room::new(room_id.clone(), self.config.room_capacity, name);
        tracing::info!(%room_id, name = room.name(), "room created");
        self.rooms.insert(room_id.clone(), room);
        room_id
    }

    /// Deletes every room that currently has no members.
    ///
    /// Returns the ids of the removed rooms. Remaining rooms keep their
    /// relative order.
    pub fn remove_empty(&mut self) -> Vec<RoomId> {
        let mut removed = Vec::new();
        self.rooms.retain(|room_id, room| {
            if room.is_empty() {
                removed.push(room_id.clone());
                false
            } else {
                true
            }
        });
        for room_id in &removed {
            tracing::info!(%room_id, "empty room removed");
        }
        removed
    }

    /// Resolves who receives a datagram from `sender` in `room_id`.
    ///
    /// Without a filter, every member except the sender. With a filter,
    /// only members named in it; names that aren't members are skipped.
    ///
    /// # Errors
    /// `RoomNotFound`, or `NotInRoom` if `sender` isn't a member.
    pub fn recipients(
        &self,
        sender: &PlayerId,
        room_id: &RoomId,
        filter: Option<&Recipients>,
    ) -> Result<Vec<Player>, RegistryError> {
        let room = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))?;
        if !room.is_member(sender) {
            return Err(RegistryError::NotInRoom(sender.clone(), room_id.clone()));
        }

        let targets = room
            .members()
            .iter()
            .filter(|member| match filter {
                None => *member != sender,
                Some(recipients) => recipients.contains(member),
            })
            .filter_map(|member| self.players.get(member).cloned())
            .collect();
        Ok(targets)
    }

    /// Fans `message` out to every other member of the room.
    ///
    /// Returns how many deliveries were attempted.
    pub async fn send(
        &self,
        sender: &PlayerId,
        room_id: &RoomId,
        message: &Value,
    ) -> Result<usize, RegistryError> {
        let targets = self.recipients(sender, room_id, None)?;
        Ok(deliver(sender, &targets, message).await)
    }

    /// Sends `message` only to the listed members of the room.
    ///
    /// Names that aren't members are skipped without error. The sender
    /// receives its own message if it lists itself.
    pub async fn sendto(
        &self,
        sender: &PlayerId,
        room_id: &RoomId,
        recipients: &Recipients,
        message: &Value,
    ) -> Result<usize, RegistryError> {
        let targets = self.recipients(sender, room_id, Some(recipients))?;
        Ok(deliver(sender, &targets, message).await)
    }

    /// Summaries of every room, in creation order.
    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.rooms.values().map(Room::summary).collect()
    }

    /// Looks up a room by id.
    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Looks up a registered player by id.
    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.get(player_id)
    }

    /// Number of rooms, empty ones included.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of registered players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    fn require_registered(&self, player_id: &PlayerId) -> Result<(), RegistryError> {
        if self.players.contains_key(player_id) {
            Ok(())
        } else {
            Err(RegistryError::ClientNotRegistered(player_id.clone()))
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

/// Sends one delivery per target, each on its own transient socket.
pub(crate) async fn deliver(sender: &PlayerId, targets: &[Player], message: &Value) -> usize {
    for target in targets {
        target.send_data(sender, message).await;
    }
    targets.len()
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
