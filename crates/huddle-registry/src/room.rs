//! A bounded-capacity, ordered group of players.

use huddle_protocol::{PlayerId, RoomId, RoomSummary};

use crate::RegistryError;

/// A room: members in join order, never more than `capacity` of them.
///
/// Rooms hold player identifiers only; endpoints live in the registry's
/// player directory so a re-registration is seen by every room at once.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    name: String,
    capacity: usize,
    members: Vec<PlayerId>,
}

impl Room {
    /// Creates an empty room. Without a name, the id doubles as the name.
    pub(crate) fn new(id: RoomId, capacity: usize, name: Option<String>) -> Self {
        let name = name.unwrap_or_else(|| id.to_string());
        Self {
            id,
            name,
            capacity,
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Members in join order.
    pub fn members(&self) -> &[PlayerId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn is_member(&self, player_id: &PlayerId) -> bool {
        self.members.contains(player_id)
    }

    /// Appends `player_id` to the room.
    ///
    /// A room at capacity refuses every join, members included. A member
    /// joining a room that still has free slots changes nothing.
    ///
    /// # Errors
    /// [`RegistryError::RoomFull`] if the room is at capacity.
    pub(crate) fn join(&mut self, player_id: PlayerId) -> Result<(), RegistryError> {
        if self.is_full() {
            return Err(RegistryError::RoomFull(self.id.clone()));
        }
        if self.is_member(&player_id) {
            return Ok(());
        }
        self.members.push(player_id);
        Ok(())
    }

    /// Removes `player_id` from the room.
    ///
    /// # Errors
    /// [`RegistryError::NotInRoom`] if the player isn't a member.
    pub(crate) fn leave(&mut self, player_id: &PlayerId) -> Result<(), RegistryError> {
        let pos = self
            .members
            .iter()
            .position(|member| member == player_id)
            .ok_or_else(|| RegistryError::NotInRoom(player_id.clone(), self.id.clone()))?;
        self.members.remove(pos);
        Ok(())
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            nb_players: self.members.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(token: &str) -> PlayerId {
        PlayerId::new(token)
    }

    fn room(capacity: usize) -> Room {
        Room::new(RoomId::new("r1"), capacity, None)
    }

    #[test]
    fn test_new_room_without_name_uses_id() {
        assert_eq!(room(2).name(), "r1");
    }

    #[test]
    fn test_new_room_with_name() {
        let room = Room::new(RoomId::new("r1"), 2, Some("Test room".into()));
        assert_eq!(room.name(), "Test room");
    }

    #[test]
    fn test_join_until_full_then_room_full() {
        let mut room = room(2);
        room.join(pid("a")).unwrap();
        assert!(!room.is_full());
        room.join(pid("b")).unwrap();
        assert!(room.is_full());

        let result = room.join(pid("c"));
        assert!(matches!(result, Err(RegistryError::RoomFull(_))));
        assert_eq!(room.len(), 2);
    }

    #[test]
    fn test_join_twice_is_idempotent() {
        let mut room = room(2);
        room.join(pid("a")).unwrap();
        room.join(pid("a")).unwrap();
        assert_eq!(room.members(), &[pid("a")]);
    }

    #[test]
    fn test_join_member_into_full_room_returns_room_full() {
        let mut room = room(2);
        room.join(pid("a")).unwrap();
        room.join(pid("b")).unwrap();

        let result = room.join(pid("a"));
        assert!(matches!(result, Err(RegistryError::RoomFull(_))));
        assert_eq!(room.members(), &[pid("a"), pid("b")]);
    }

    #[test]
    fn test_members_keep_join_order() {
        let mut room = room(3);
        for token in ["c", "a", "b"] {
            room.join(pid(token)).unwrap();
        }
        assert_eq!(room.members(), &[pid("c"), pid("a"), pid("b")]);

        room.leave(&pid("a")).unwrap();
        assert_eq!(room.members(), &[pid("c"), pid("b")]);
    }

    #[test]
    fn test_leave_non_member_returns_not_in_room() {
        let mut room = room(2);
        let result = room.leave(&pid("ghost"));
        assert!(matches!(result, Err(RegistryError::NotInRoom(p, _)) if p == pid("ghost")));
    }

    #[test]
    fn test_is_empty_after_last_leave() {
        let mut room = room(2);
        room.join(pid("a")).unwrap();
        assert!(!room.is_empty());
        room.leave(&pid("a")).unwrap();
        assert!(room.is_empty());
    }

    #[test]
    fn test_summary_reports_counts() {
        let mut room = room(4);
        room.join(pid("a")).unwrap();
        let summary = room.summary();
        assert_eq!(summary.nb_players, 1);
        assert_eq!(summary.capacity, 4);
        assert_eq!(summary.name, "r1");
    }
}
