//! In-process transport over the connection pool and room registry.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::message::types::{Frame, OutboundMessage};
use crate::room::RoomRegistry;

use super::Transport;

/// Connection pool plus room registry.
#[derive(Debug)]
pub struct RoomHub {
    pool: ConnectionPool,
    rooms: RoomRegistry,
    buffer_size: usize,
}

impl RoomHub {
    /// Creates an empty hub whose connections buffer `buffer_size` frames.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            pool: ConnectionPool::new(),
            rooms: RoomRegistry::new(),
            buffer_size,
        }
    }

    /// Opens a connection.
    ///
    /// Returns the handle and the receiver the connection's writer drains.
    pub fn open(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        self.open_with(Uuid::new_v4())
    }

    /// Opens a connection under a known id, such as a handshake session id.
    pub fn open_with(
        &self,
        conn_id: ConnectionId,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (handle, rx) = ConnectionHandle::with_id(conn_id, self.buffer_size);
        let handle = Arc::new(handle);
        self.pool.add(handle.clone());
        debug!(conn_id = %handle.id, "Connection opened");
        (handle, rx)
    }

    /// Looks up a live connection.
    pub fn connection(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.pool.get(conn_id)
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.room_count()
    }

    /// Members of a room.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms.get_members(room)
    }

    /// Closes every connection.
    pub fn close_all(&self) -> usize {
        let ids = self.pool.ids();
        let closed = ids.into_iter().filter(|id| self.disconnect(*id)).count();
        info!(closed, "All connections closed");
        closed
    }
}

impl Transport for RoomHub {
    fn send(&self, conn_id: ConnectionId, frame: Frame) -> bool {
        match self.pool.get(&conn_id) {
            Some(handle) => handle.send(frame),
            None => false,
        }
    }

    fn join(&self, conn_id: ConnectionId, room: &str) {
        if self.pool.get(&conn_id).is_none() {
            return;
        }
        self.rooms.join(room, conn_id);
        // A disconnect may have swept this connection's rooms between the
        // liveness check and the insert.
        if self.pool.get(&conn_id).is_none() {
            self.rooms.leave(room, conn_id);
            return;
        }
        debug!(conn_id = %conn_id, room = %room, "Joined room");
    }

    fn leave(&self, conn_id: ConnectionId, room: &str) {
        self.rooms.leave(room, conn_id);
        debug!(conn_id = %conn_id, room = %room, "Left room");
    }

    fn rooms(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.rooms.rooms_of(conn_id)
    }

    fn room_exists(&self, room: &str) -> bool {
        self.rooms.exists(room)
    }

    fn broadcast(&self, room: &str, frame: &Frame) -> usize {
        self.rooms
            .get_members(room)
            .into_iter()
            .filter_map(|conn_id| self.pool.get(&conn_id))
            .filter(|handle| handle.send(frame.clone()))
            .count()
    }

    fn disconnect(&self, conn_id: ConnectionId) -> bool {
        let Some(handle) = self.pool.remove(&conn_id) else {
            return false;
        };
        handle.close();
        let left = self.rooms.leave_all(conn_id);
        debug!(conn_id = %conn_id, rooms = left.len(), "Connection closed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_broadcast_reaches_members_only() {
        let hub = RoomHub::new(8);
        let (a, mut rx_a) = hub.open();
        let (b, mut rx_b) = hub.open();
        let (_c, mut rx_c) = hub.open();

        hub.join(a.id, "orders");
        hub.join(b.id, "orders");

        let delivered = hub.broadcast("orders", &Frame::new("message", json!("hi")));
        assert_eq!(delivered, 2);
        assert!(matches!(rx_a.recv().await, Some(OutboundMessage::Frame(_))));
        assert!(matches!(rx_b.recv().await, Some(OutboundMessage::Frame(_))));
        assert!(rx_c.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_to_missing_room() {
        let hub = RoomHub::new(8);
        assert_eq!(hub.broadcast("nowhere", &Frame::new("message", json!(1))), 0);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let hub = RoomHub::new(8);
        let (a, mut rx) = hub.open();
        hub.join(a.id, "orders");

        assert!(hub.disconnect(a.id));
        assert!(!hub.disconnect(a.id));
        assert!(!hub.room_exists("orders"));
        assert_eq!(hub.connection_count(), 0);
        assert_eq!(rx.recv().await, Some(OutboundMessage::Close));
    }

    #[test]
    fn test_join_after_disconnect_ignored() {
        let hub = RoomHub::new(8);
        let (a, _rx) = hub.open();
        hub.disconnect(a.id);
        hub.join(a.id, "orders");
        assert!(!hub.room_exists("orders"));
    }

    #[test]
    fn test_open_with_uses_given_id() {
        let hub = RoomHub::new(8);
        let id = Uuid::new_v4();
        let (handle, _rx) = hub.open_with(id);
        assert_eq!(handle.id, id);
        assert!(hub.connection(&id).is_some());
    }

    #[test]
    fn test_join_racing_disconnect_leaves_no_room() {
        let hub = Arc::new(RoomHub::new(8));
        for _ in 0..200 {
            let (a, _rx) = hub.open();
            let joiner = {
                let hub = hub.clone();
                let id = a.id;
                std::thread::spawn(move || hub.join(id, "orders"))
            };
            hub.disconnect(a.id);
            joiner.join().unwrap();
            assert!(hub.rooms(a.id).is_empty());
            assert!(!hub.room_exists("orders"));
        }
    }

    #[test]
    fn test_close_all() {
        let hub = RoomHub::new(8);
        let _a = hub.open();
        let _b = hub.open();
        assert_eq!(hub.close_all(), 2);
        assert_eq!(hub.connection_count(), 0);
    }
}
