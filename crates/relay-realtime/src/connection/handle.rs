//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::message::types::{Frame, OutboundMessage};

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender channel feeding the connection's writer task. Once
/// closed, every further send is dropped.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Sender for outbound messages
    sender: mpsc::Sender<OutboundMessage>,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still open
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle and the receiver its writer drains
    pub fn new(buffer_size: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        Self::with_id(Uuid::new_v4(), buffer_size)
    }

    /// Create a handle under a caller-chosen id
    pub fn with_id(
        id: ConnectionId,
        buffer_size: usize,
    ) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let handle = Self {
            id,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        };
        (handle, receiver)
    }

    /// Queue a frame for this connection
    pub fn send(&self, frame: Frame) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(OutboundMessage::Frame(frame)) {
            Ok(_) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.alive.store(false, Ordering::SeqCst);
                false
            }
        }
    }

    /// Mark the connection closed and ask the writer to close the socket.
    ///
    /// Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return false;
        }
        // A full or closed queue still ends the writer once the reader stops.
        let _ = self.sender.try_send(OutboundMessage::Close);
        true
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}
