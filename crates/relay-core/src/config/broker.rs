//! Broker protocol configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Broker (channel event protocol) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Outbound buffer size per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Delay before a non-durable peer is disconnected after publishing.
    #[serde(default = "default_terminate_delay")]
    pub terminate_delay_ms: u64,
    /// Maximum inbound frame size in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Inbound event name carrying the generic-publish envelope.
    #[serde(default = "default_generic_event")]
    pub generic_event: String,
    /// Per-event access settings, keyed by event name.
    #[serde(default)]
    pub events: HashMap<String, EventAccessConfig>,
}

/// Access settings for a single routed event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventAccessConfig {
    /// Peer types allowed to emit the event. Empty allows every known type.
    #[serde(default)]
    pub accessible_by: Vec<String>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            terminate_delay_ms: default_terminate_delay(),
            max_message_size: default_max_message_size(),
            generic_event: default_generic_event(),
            events: HashMap::new(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_terminate_delay() -> u64 {
    1000
}

fn default_max_message_size() -> usize {
    65_536
}

fn default_generic_event() -> String {
    "send".to_string()
}
