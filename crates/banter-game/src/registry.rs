//! The concurrent room registry: code → room, plus a membership index.
//!
//! Lookups and mutations on different codes never block each other; the
//! sharded map only serializes access to the entry itself. Mutating a
//! single room's fields serializes on that room's own mutex, which a
//! coordinator holds for the duration of exactly one command.

use std::sync::Arc;

use dashmap::{DashMap, Entry};
use tokio::sync::Mutex;

use banter_protocol::{Room, RoomCode, UserId};

use crate::GameError;

/// Shared handle to one room's serialized state.
pub type RoomHandle = Arc<Mutex<Room>>;

/// Tracks every live room and which room each player is in.
///
/// A player is in at most ONE room at a time (key invariant); the
/// coordinators keep the membership index in sync as players move.
#[derive(Default)]
pub struct RoomRegistry {
    /// Live rooms, keyed by room code.
    rooms: DashMap<RoomCode, RoomHandle>,

    /// Maps each player to the room they're currently in.
    memberships: DashMap<UserId, RoomCode>,
}

impl RoomRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a room handle by code.
    ///
    /// # Errors
    /// Returns [`GameError::RoomNotFound`] for an unknown code.
    pub fn get(&self, code: &RoomCode) -> Result<RoomHandle, GameError> {
        self.rooms
            .get(code)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| GameError::RoomNotFound(code.clone()))
    }

    /// Returns `true` if a live room has this code.
    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// Stores a room under its code, unless a live room already holds it.
    ///
    /// Check and insert are one atomic entry operation; this is what
    /// keeps codes unique among live rooms under concurrent creates.
    /// Returns `false` (storing nothing) on a taken code.
    pub fn insert_if_absent(&self, code: RoomCode, room: Room) -> bool {
        match self.rooms.entry(code) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(room)));
                true
            }
        }
    }

    /// Removes a room and every membership entry pointing at it.
    pub fn remove(&self, code: &RoomCode) -> Option<RoomHandle> {
        let removed = self.rooms.remove(code).map(|(_, handle)| handle);
        if removed.is_some() {
            self.memberships.retain(|_, c| c != code);
        }
        removed
    }

    /// Returns the number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no rooms are live.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Snapshots the handles of all live rooms.
    ///
    /// Collected eagerly so callers never hold shard locks across an
    /// `await` while they lock individual rooms.
    pub fn handles(&self) -> Vec<RoomHandle> {
        self.rooms
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Snapshots every public room still open in the lobby.
    pub async fn public_open(&self) -> Vec<Room> {
        let mut open = Vec::new();
        for handle in self.handles() {
            let room = handle.lock().await;
            if room.is_listed() {
                open.push(room.clone());
            }
        }
        open
    }

    /// Returns the code of the room a player is currently in, if any.
    pub fn room_of(&self, user_id: UserId) -> Option<RoomCode> {
        self.memberships
            .get(&user_id)
            .map(|entry| entry.value().clone())
    }

    /// Records that a player is now in the given room.
    pub fn track(&self, user_id: UserId, code: RoomCode) {
        self.memberships.insert(user_id, code);
    }

    /// Clears a player's membership entry.
    pub fn untrack(&self, user_id: UserId) {
        self.memberships.remove(&user_id);
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use banter_protocol::{ConnectionId, Player, RoomPhase};

    use super::*;

    fn code(s: &str) -> RoomCode {
        RoomCode::from(s)
    }

    fn room(c: &str, owner: u64) -> Room {
        Room::new(
            code(c),
            Player::new(UserId(owner), ConnectionId::from("conn"), "p"),
        )
    }

    #[test]
    fn test_get_unknown_code_returns_not_found() {
        let registry = RoomRegistry::new();
        let result = registry.get(&code("Apple1"));
        assert!(matches!(result, Err(GameError::RoomNotFound(_))));
    }

    #[test]
    fn test_insert_then_get_returns_same_room() {
        let registry = RoomRegistry::new();
        assert!(registry.insert_if_absent(code("Apple1"), room("Apple1", 1)));

        let handle = registry.get(&code("Apple1")).unwrap();
        assert_eq!(handle.blocking_lock().code, code("Apple1"));
        assert!(registry.contains(&code("Apple1")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_if_absent_rejects_live_code() {
        let registry = RoomRegistry::new();
        assert!(registry.insert_if_absent(code("Apple1"), room("Apple1", 1)));

        // The second claim stores nothing: the first owner's room
        // survives untouched instead of being silently replaced.
        assert!(!registry.insert_if_absent(code("Apple1"), room("Apple1", 2)));

        assert_eq!(registry.len(), 1);
        let handle = registry.get(&code("Apple1")).unwrap();
        assert_eq!(handle.blocking_lock().owner, UserId(1));
    }

    #[test]
    fn test_remove_clears_memberships_of_that_room_only() {
        let registry = RoomRegistry::new();
        registry.insert_if_absent(code("Apple1"), room("Apple1", 1));
        registry.insert_if_absent(code("Mango2"), room("Mango2", 2));
        registry.track(UserId(1), code("Apple1"));
        registry.track(UserId(2), code("Mango2"));

        registry.remove(&code("Apple1"));

        assert_eq!(registry.room_of(UserId(1)), None);
        assert_eq!(registry.room_of(UserId(2)), Some(code("Mango2")));
        assert!(!registry.contains(&code("Apple1")));
    }

    #[test]
    fn test_track_overwrites_previous_membership() {
        let registry = RoomRegistry::new();
        registry.track(UserId(1), code("Apple1"));
        registry.track(UserId(1), code("Mango2"));

        assert_eq!(registry.room_of(UserId(1)), Some(code("Mango2")));
    }

    #[tokio::test]
    async fn test_public_open_filters_private_and_started_rooms() {
        let registry = RoomRegistry::new();

        let mut public_lobby = room("Apple1", 1);
        public_lobby.is_public = true;
        registry.insert_if_absent(code("Apple1"), public_lobby);

        // Private lobby: not listed.
        registry.insert_if_absent(code("Mango2"), room("Mango2", 2));

        // Public but already playing: not listed.
        let mut started = room("Otter3", 3);
        started.is_public = true;
        started.phase = RoomPhase::Answering;
        registry.insert_if_absent(code("Otter3"), started);

        let open = registry.public_open().await;

        assert_eq!(open.len(), 1);
        assert_eq!(open[0].code, code("Apple1"));
    }
}
