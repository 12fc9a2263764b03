//! The real-time transport seen by peers and handlers.
//!
//! Peers only ever talk to the transport through [`Transport`]: direct
//! send, room join/leave/broadcast, and disconnect. [`RoomHub`] is the
//! in-process implementation fed by WebSocket connections.

pub mod hub;

use std::collections::HashSet;

use crate::connection::handle::ConnectionId;
use crate::message::types::Frame;

pub use hub::RoomHub;

/// Connection-level primitives the protocol handlers rely on.
pub trait Transport: Send + Sync + std::fmt::Debug + 'static {
    /// Sends a frame to one connection. Returns `false` if it was dropped.
    fn send(&self, conn_id: ConnectionId, frame: Frame) -> bool;

    /// Adds a connection to a room.
    fn join(&self, conn_id: ConnectionId, room: &str);

    /// Removes a connection from a room. Never fails.
    fn leave(&self, conn_id: ConnectionId, room: &str);

    /// Rooms the connection is currently in.
    fn rooms(&self, conn_id: ConnectionId) -> HashSet<String>;

    /// Whether a room currently has members.
    fn room_exists(&self, room: &str) -> bool;

    /// Sends a frame to every member of a room, returning how many
    /// connections accepted it. A missing room delivers to no one.
    fn broadcast(&self, room: &str, frame: &Frame) -> usize;

    /// Closes a connection and vacates its rooms.
    ///
    /// Idempotent: returns `false` if the connection was already gone.
    fn disconnect(&self, conn_id: ConnectionId) -> bool;
}
