//! Frame and reply type definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event name of acknowledgement frames.
pub const ACK_EVENT: &str = "ack";

/// Event name of scoped error replies.
pub const ERROR_EVENT: &str = "error";

/// Event name used by `publish` broadcasts.
pub const MESSAGE_EVENT: &str = "message";

/// Event broadcast to a peer's notify channel when it disconnects.
pub const DISCONNECTED_EVENT: &str = "disconnected";

/// A single JSON text frame, in either direction.
///
/// `ack` on an inbound frame requests an acknowledgement; on an outbound
/// frame with event `ack` it names the request being acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name.
    pub event: String,
    /// Payload.
    #[serde(default)]
    pub data: Value,
    /// Acknowledgement id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
}

impl Frame {
    /// Creates a frame without an ack id.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
            ack: None,
        }
    }

    /// Creates the acknowledgement reply for request `id`.
    pub fn ack(id: u64, data: Value) -> Self {
        Self {
            event: ACK_EVENT.to_string(),
            data,
            ack: Some(id),
        }
    }
}

/// Messages queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// A frame to serialize and send.
    Frame(Frame),
    /// Close the socket.
    Close,
}

/// Reply status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    /// Processed.
    Success,
    /// Rejected.
    Error,
}

/// Error and acknowledgement payload sent to the originating peer only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Outcome.
    pub status: ReplyStatus,
    /// Why the request failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Server time of processing, RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Event the reply refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Client correlation token, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Value>,
}
