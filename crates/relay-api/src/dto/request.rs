//! Request DTOs.

use serde::Deserialize;
use serde_json::Value;

use relay_core::error::AppError;
use relay_realtime::message::ChannelSpec;
use relay_realtime::message::types::MESSAGE_EVENT;

/// Body of `POST /broadcast`.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastRequest {
    /// Event name sent to the rooms. Defaults to `message`.
    #[serde(default)]
    pub event: Option<String>,
    /// Tenant whose room namespace the channels belong to.
    #[serde(default)]
    pub tenant: Option<String>,
    /// Target channel(s).
    #[serde(default)]
    pub channel: Option<ChannelSpec>,
    /// Payload sent as-is.
    #[serde(default)]
    pub data: Value,
}

impl BroadcastRequest {
    /// Parses a raw body, rejecting empty or malformed JSON.
    pub fn parse(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::validation("Invalid Json Payload"));
        }
        serde_json::from_slice(body).map_err(|_| AppError::validation("Invalid Json Payload"))
    }

    /// Event name to send.
    pub fn event(&self) -> &str {
        self.event
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(MESSAGE_EVENT)
    }
}
