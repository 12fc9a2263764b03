//! JSON serialization for wire frames.

use super::types::Frame;

/// Serialize a frame to a JSON text message
pub fn serialize_frame(frame: &Frame) -> Result<String, serde_json::Error> {
    serde_json::to_string(frame)
}

/// Deserialize an inbound frame from JSON
pub fn deserialize_frame(text: &str) -> Result<Frame, serde_json::Error> {
    serde_json::from_str(text)
}
