//! Room registry: manages all rooms and memberships.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

use super::membership::MembershipTracker;

/// Registry of all non-empty rooms.
///
/// A room exists while it has at least one member.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → member connections.
    rooms: DashMap<String, HashSet<ConnectionId>>,
    /// Reverse index.
    memberships: MembershipTracker,
}

impl RoomRegistry {
    /// Creates a new room registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room, creating the room if needed.
    pub fn join(&self, room_name: &str, conn_id: ConnectionId) {
        self.rooms
            .entry(room_name.to_string())
            .or_default()
            .insert(conn_id);
        self.memberships.add(conn_id, room_name.to_string());
    }

    /// Removes a connection from a room. No-op if it was not a member.
    pub fn leave(&self, room_name: &str, conn_id: ConnectionId) {
        self.evict(room_name, conn_id);
        self.memberships.remove(conn_id, room_name);
    }

    /// Removes a connection from every room, returning the rooms it left.
    pub fn leave_all(&self, conn_id: ConnectionId) -> HashSet<String> {
        let rooms = self.memberships.remove_all(conn_id);
        for room_name in &rooms {
            self.evict(room_name, conn_id);
        }
        rooms
    }

    fn evict(&self, room_name: &str, conn_id: ConnectionId) {
        let emptied = match self.rooms.get_mut(room_name) {
            Some(mut members) => {
                members.remove(&conn_id);
                members.is_empty()
            }
            None => false,
        };
        if emptied {
            self.rooms.remove_if(room_name, |_, members| members.is_empty());
        }
    }

    /// Returns all member connection IDs of a room.
    pub fn get_members(&self, room_name: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room_name)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the rooms a connection is in.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.memberships.get_rooms(conn_id)
    }

    /// Returns whether a room currently exists.
    pub fn exists(&self, room_name: &str) -> bool {
        self.rooms.contains_key(room_name)
    }

    /// Returns member count of a room.
    pub fn member_count(&self, room_name: &str) -> usize {
        self.rooms.get(room_name).map(|members| members.len()).unwrap_or(0)
    }

    /// Returns total number of rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
